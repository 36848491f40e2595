//! # Minicraft Entry Point
//!
//! Runs the windowed game, or with `--headless` generates and meshes the world without a
//! GPU and prints the statistics.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! cargo run --release -- --headless
//! ```

use log::error;
use minicraft::EngineConfig;

fn main() {
    let headless = std::env::args().skip(1).any(|arg| arg == "--headless");

    let result = if headless {
        minicraft::init_logger();
        EngineConfig::load(&EngineConfig::default_path())
            .and_then(minicraft::run_headless)
            .map(|_| ())
    } else {
        minicraft::run()
    };

    if let Err(err) = result {
        error!("{}", err);
        std::process::exit(1);
    }
}
