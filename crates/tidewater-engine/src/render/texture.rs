use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};

/// CPU-side RGBA8 image handed to the renderer at startup.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major sRGB RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn new(name: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> RenderResult<Self> {
        let name = name.into();
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(RenderError::config(format!(
                "texture '{name}': {width}x{height} needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            name,
            width,
            height,
            rgba,
        })
    }
}

/// Texture bind groups indexed by material texture index.
pub(crate) struct TextureTable {
    bind_groups: Vec<wgpu::BindGroup>,
}

impl TextureTable {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        textures: &[TextureData],
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tidewater linear wrap sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_groups = textures
            .iter()
            .map(|t| {
                let texture = device.create_texture_with_data(
                    queue,
                    &wgpu::TextureDescriptor {
                        label: Some(&format!("tidewater {} texture", t.name)),
                        size: wgpu::Extent3d {
                            width: t.width,
                            height: t.height,
                            depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: wgpu::TextureFormat::Rgba8UnormSrgb,
                        usage: wgpu::TextureUsages::TEXTURE_BINDING,
                        view_formats: &[],
                    },
                    wgpu::util::TextureDataOrder::LayerMajor,
                    &t.rgba,
                );
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("tidewater {} texture bg", t.name)),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                })
            })
            .collect();

        Self { bind_groups }
    }

    pub fn get(&self, index: u32) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.bind_groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_byte_length() {
        assert!(TextureData::new("ok", 2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            TextureData::new("short", 2, 2, vec![0; 15]),
            Err(RenderError::Configuration(_))
        ));
        assert!(TextureData::new("empty", 0, 4, vec![]).is_err());
    }
}
