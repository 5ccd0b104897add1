use anyhow::{Context, Result};
use log::warn;

/// Decoded RGBA8 image ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Loads the cube texture, substituting a checkerboard when the image is
/// missing or undecodable. The demo keeps running either way; the failure is
/// only logged.
pub fn load_or_fallback(path: &str) -> TextureData {
    match decode(path) {
        Ok(data) => data,
        Err(err) => {
            warn!("failed to load texture {path}: {err:#}; using fallback pattern");
            checkerboard()
        }
    }
}

fn decode(path: &str) -> Result<TextureData> {
    let img = image::open(path).with_context(|| format!("unable to open {path}"))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// 8x8 two-tone checkerboard stand-in texture.
pub(crate) fn checkerboard() -> TextureData {
    const SIZE: u32 = 8;
    let mut pixels = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let value = if (x + y) % 2 == 0 { 0xd0 } else { 0x60 };
            pixels.extend_from_slice(&[value, value, value, 0xff]);
        }
    }
    TextureData {
        width: SIZE,
        height: SIZE,
        pixels,
    }
}

/// GPU texture plus the sampler the cube material expects: nearest-neighbor
/// minification for crisp texel edges, linear magnification.
pub(crate) struct CubeTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl CubeTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> Self {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cube-texture"),
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
            &data.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cube-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self { view, sampler }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_is_a_full_rgba_square() {
        let data = checkerboard();
        assert_eq!(data.width, 8);
        assert_eq!(data.height, 8);
        assert_eq!(data.pixels.len(), 8 * 8 * 4);
        // opaque everywhere
        assert!(data.pixels.chunks(4).all(|px| px[3] == 0xff));
        // two distinct tones
        assert_ne!(data.pixels[0], data.pixels[4]);
    }

    #[test]
    fn missing_file_falls_back_silently() {
        let data = load_or_fallback("does/not/exist.png");
        assert_eq!(data, checkerboard());
    }

    #[test]
    fn garbage_bytes_fall_back_silently() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"definitely not a png").unwrap();
        let data = load_or_fallback(file.path().to_str().unwrap());
        assert_eq!(data, checkerboard());
    }
}
