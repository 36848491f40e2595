use minicraft::engine_state::game_state::GameState;
use minicraft::engine_state::rendering::backend::HeadlessBackend;
use minicraft::engine_state::voxels::block::{block_type::BlockId, ShaderPass};
use minicraft::{run_headless, EngineConfig, EngineError};

/// Two chunks per axis with a single grass layer at `y = 0`.
fn flat_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.world.world_size = 2;
    config.generation.stone_height = 0.0;
    config.generation.dirt_height = 0.0;
    config.generation.water_height = 0;
    config
}

#[test]
fn headless_run_meshes_a_flat_world() {
    let report = run_headless(flat_config()).unwrap();

    assert_eq!(report.chunks, 8);
    assert_eq!(report.chunks_rebuilt, 8);
    // Only the bottom row of chunks holds blocks.
    assert_eq!(report.opaque.draw_calls, 4);
    assert_eq!(report.transparent.draw_calls, 0);
    // 32x32 top and bottom faces plus the 4x32 faces around the world border.
    assert_eq!(report.faces, 32 * 32 * 2 + 4 * 32);
    assert_eq!(report.vertices, report.faces * 4);
    assert_eq!(report.live_buffers, 8);
}

#[test]
fn headless_runs_are_reproducible() {
    let mut config = EngineConfig::default();
    config.world.world_size = 2;
    config.generation.seed = 1234;

    let first = run_headless(config.clone()).unwrap();
    let second = run_headless(config).unwrap();

    assert_eq!(first, second);
    assert!(first.faces > 0);
}

#[test]
fn editing_across_a_seam_rebuilds_both_chunks() {
    let mut game = GameState::new(flat_config());
    let mut backend = HeadlessBackend::new();
    game.world().rebuild_dirty(&mut backend).unwrap();
    assert_eq!(game.world().dirty_chunk_count(), 0);

    assert!(game.world_mut().set_block(16, 0, 5, BlockId::Empty));
    assert_eq!(game.world().dirty_chunk_count(), 2);

    backend.reset_frame_counters();
    let stats = game
        .world()
        .draw(&mut backend, ShaderPass::Opaque, None)
        .unwrap();

    assert_eq!(stats.draw_calls, 4);
    assert_eq!(game.world().dirty_chunk_count(), 0);
    assert_eq!(game.world().get_chunk(0, 0, 0).unwrap().rebuild_count(), 2);
    assert_eq!(game.world().get_chunk(1, 0, 0).unwrap().rebuild_count(), 2);
    assert_eq!(game.world().get_chunk(0, 0, 1).unwrap().rebuild_count(), 1);
    // The hole exposes four walls but removes a top and a bottom face.
    assert_eq!(backend.indices_drawn / 6, 32 * 32 * 2 + 4 * 32 + 2);
}

#[test]
fn released_meshes_return_every_buffer() {
    let game = GameState::new(flat_config());
    let mut backend = HeadlessBackend::new();
    game.world().rebuild_dirty(&mut backend).unwrap();
    assert!(backend.live_buffers() > 0);

    game.world().release_meshes(&mut backend);

    assert_eq!(backend.live_buffers(), 0);
    assert_eq!(backend.live_bytes(), 0);
    assert_eq!(game.world().dirty_chunk_count(), 8);
}

#[test]
fn partial_config_files_fall_back_to_defaults() {
    let config = EngineConfig::from_json(r#"{ "world": { "world_size": 3 } }"#).unwrap();

    assert_eq!(config.world.world_size, 3);
    assert_eq!(config.generation, EngineConfig::default().generation);
    assert_eq!(config.player, EngineConfig::default().player);
}

#[test]
fn malformed_config_is_an_error() {
    let result = EngineConfig::from_json(r#"{ "world": { "world_size": "big" } }"#);

    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn oversized_worlds_are_rejected_before_allocation() {
    let parsed = EngineConfig::from_json(r#"{ "world": { "world_size": 1300 } }"#);
    assert!(matches!(
        parsed,
        Err(EngineError::WorldSize {
            world_size: 1300,
            ..
        })
    ));

    let mut config = flat_config();
    config.world.world_size = 0;
    assert!(matches!(
        run_headless(config),
        Err(EngineError::WorldSize { world_size: 0, .. })
    ));
}
