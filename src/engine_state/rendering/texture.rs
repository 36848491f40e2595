//! Texture handling for the rendering pipeline.
//!
//! This module provides functionality for creating GPU textures: the depth buffer used by
//! both render passes and the block atlas sampled by the fragment shader.

use std::path::Path;

use image::{Rgba, RgbaImage};
use log::{info, warn};

use super::meshing::face::ATLAS_TILES_PER_ROW;
use crate::error::{EngineError, Result};

/// Atlas file looked up relative to the working directory.
pub const ATLAS_PATH: &str = "assets/textures/terrain.png";

/// Side of one tile in the generated fallback atlas, in pixels.
const FALLBACK_TILE_SIZE: u32 = 16;

/// Represents a GPU texture with associated view and sampler.
///
/// This struct wraps a WebGPU texture along with its view and sampler,
/// providing a convenient way to manage texture resources in the rendering pipeline.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// The texture format used for depth buffers.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a new depth texture with the given configuration.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The surface configuration containing dimensions
    /// * `label` - Debug label for the texture
    ///
    /// # Returns
    /// A new `Texture` instance configured as a depth buffer
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads an RGBA image as a nearest-filtered sRGB texture.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Loads the block atlas at `path`.
///
/// A missing file is replaced by [`fallback_atlas`]. An existing file must decode and be a
/// square whose side is divisible by the tile count per row.
pub fn load_atlas_image(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        warn!(
            "Texture atlas {} not found, using generated fallback",
            path.display()
        );
        return Ok(fallback_atlas());
    }

    let atlas = image::open(path)?.to_rgba8();
    validate_atlas(&atlas)?;
    info!(
        "Loaded texture atlas {} ({}x{})",
        path.display(),
        atlas.width(),
        atlas.height()
    );
    Ok(atlas)
}

fn validate_atlas(atlas: &RgbaImage) -> Result<()> {
    let (width, height) = atlas.dimensions();
    if width != height || width == 0 || width % ATLAS_TILES_PER_ROW != 0 {
        return Err(EngineError::AtlasDimensions { width, height });
    }
    Ok(())
}

/// Base colour of a tile in the generated atlas.
fn tile_colour(tile: u32) -> Rgba<u8> {
    match tile {
        0 => Rgba([106, 170, 64, 255]),
        1 => Rgba([125, 125, 125, 255]),
        2 => Rgba([134, 96, 67, 255]),
        3 => Rgba([120, 110, 60, 255]),
        4 => Rgba([180, 144, 90, 255]),
        18 => Rgba([219, 207, 163, 255]),
        20 => Rgba([102, 81, 50, 255]),
        21 => Rgba([160, 130, 80, 255]),
        205 => Rgba([47, 67, 244, 160]),
        _ => Rgba([255, 0, 255, 255]),
    }
}

/// Generates a 16×16-tile atlas with a flat colour per used tile.
///
/// Each tile gets a faint checker so faces stay readable; unused tiles are magenta. The water
/// tile is translucent.
pub fn fallback_atlas() -> RgbaImage {
    let side = FALLBACK_TILE_SIZE * ATLAS_TILES_PER_ROW;

    RgbaImage::from_fn(side, side, |x, y| {
        let tile = (y / FALLBACK_TILE_SIZE) * ATLAS_TILES_PER_ROW + x / FALLBACK_TILE_SIZE;
        let Rgba([r, g, b, a]) = tile_colour(tile);

        let shade = if ((x / 4) + (y / 4)) % 2 == 0 { 0 } else { 12 };
        Rgba([
            r.saturating_sub(shade),
            g.saturating_sub(shade),
            b.saturating_sub(shade),
            a,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_origin(tile: u32) -> (u32, u32) {
        (
            (tile % ATLAS_TILES_PER_ROW) * FALLBACK_TILE_SIZE,
            (tile / ATLAS_TILES_PER_ROW) * FALLBACK_TILE_SIZE,
        )
    }

    #[test]
    fn fallback_atlas_has_valid_dimensions() {
        let atlas = fallback_atlas();

        assert_eq!(atlas.dimensions(), (256, 256));
        assert!(validate_atlas(&atlas).is_ok());
    }

    #[test]
    fn fallback_water_is_translucent_and_stone_is_opaque() {
        let atlas = fallback_atlas();

        let (wx, wy) = tile_origin(205);
        assert!(atlas.get_pixel(wx, wy).0[3] < 255);

        let (sx, sy) = tile_origin(1);
        assert_eq!(atlas.get_pixel(sx, sy).0, [125, 125, 125, 255]);
    }

    #[test]
    fn non_square_atlases_are_rejected() {
        let atlas = RgbaImage::new(256, 128);

        assert!(matches!(
            validate_atlas(&atlas),
            Err(EngineError::AtlasDimensions {
                width: 256,
                height: 128
            })
        ));
        assert!(validate_atlas(&RgbaImage::new(100, 100)).is_err());
    }

    #[test]
    fn missing_atlas_falls_back() {
        let atlas = load_atlas_image(Path::new("does/not/exist/terrain.png")).unwrap();

        assert_eq!(atlas.dimensions(), (256, 256));
    }
}
