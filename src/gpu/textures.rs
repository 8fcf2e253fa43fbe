use wgpu::{Buffer, BufferUsages, Device, Queue, Texture, TextureView};

use crate::assets::Photo;

/// Per-frame uniform data for the distortion shader (32 bytes).
///
/// `resolution` packs the viewport size in xy and the aspect-correction
/// factors in zw, mirroring how the shader consumes it.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameParams {
    pub resolution: [f32; 4],
    pub time: f32,
    pub displacement_scale: f32,
    pub _padding: [f32; 2],
}

/// Aspect-correction factors `(a1, a2)` that letterbox the photo into the
/// viewport: the UV axis on which the photo overflows is shrunk so the
/// image covers the screen without stretching.
pub fn aspect_factors(viewport_width: f32, viewport_height: f32, image_aspect: f32) -> (f32, f32) {
    let viewport_aspect = viewport_width / viewport_height;
    if viewport_aspect < image_aspect {
        (viewport_aspect / image_aspect, 1.0)
    } else {
        (1.0, image_aspect / viewport_aspect)
    }
}

/// Uniform buffer holding [`FrameParams`].
pub struct FrameUniforms {
    pub buffer: Buffer,
}

impl FrameUniforms {
    pub fn new(device: &Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-params-buffer"),
            size: std::mem::size_of::<FrameParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    /// Upload the current frame parameters.
    pub fn update(
        &self,
        queue: &Queue,
        viewport: (f32, f32),
        image_aspect: f32,
        time: f32,
        displacement_scale: f32,
    ) {
        let (a1, a2) = aspect_factors(viewport.0, viewport.1, image_aspect);
        let params = FrameParams {
            resolution: [viewport.0, viewport.1, a1, a2],
            time,
            displacement_scale,
            _padding: [0.0, 0.0],
        };
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&params));
    }
}

/// GPU texture mirroring the velocity field's flat buffer.
///
/// Rgba32Float, no mip chain, sampled with a non-filtering nearest
/// sampler: the grid is deliberately low resolution and interpolating
/// between cells would blur the blocky influence falloff.
pub struct FieldTexture {
    pub texture: Texture,
    pub view: TextureView,
    width: u32,
    height: u32,
}

impl FieldTexture {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("field-texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Upload the field's channel buffer. `cells` must hold exactly
    /// `4 * width * height` floats, row-major.
    pub fn upload(&self, queue: &Queue, cells: &[f32]) {
        debug_assert_eq!(cells.len(), (4 * self.width * self.height) as usize);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(cells),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(16 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// The displayed photo, uploaded once as an sRGB texture.
pub struct PhotoTexture {
    pub view: TextureView,
    pub aspect: f32,
}

impl PhotoTexture {
    pub fn new(device: &Device, queue: &Queue, photo: &Photo) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("photo-texture"),
            size: wgpu::Extent3d {
                width: photo.width,
                height: photo.height,
                depth_or_array_layers: 1,
            },
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
            &photo.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * photo.width),
                rows_per_image: Some(photo.height),
            },
            wgpu::Extent3d {
                width: photo.width,
                height: photo.height,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            aspect: photo.aspect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_params_size() {
        // Uniform block must stay 16-byte aligned for WGSL.
        assert_eq!(std::mem::size_of::<FrameParams>(), 32);
    }

    #[test]
    fn test_aspect_factors_wide_viewport() {
        // Viewport wider than the image: shrink vertically.
        let (a1, a2) = aspect_factors(1920.0, 600.0, 1.5);
        assert_eq!(a1, 1.0);
        assert!((a2 - 1.5 / 3.2).abs() < 1e-6);
    }

    #[test]
    fn test_aspect_factors_tall_viewport() {
        // Viewport narrower than the image: shrink horizontally.
        let (a1, a2) = aspect_factors(600.0, 1200.0, 1.5);
        assert!((a1 - 0.5 / 1.5).abs() < 1e-6);
        assert_eq!(a2, 1.0);
    }

    #[test]
    fn test_aspect_factors_matching_aspect() {
        let (a1, a2) = aspect_factors(1500.0, 1000.0, 1.5);
        assert_eq!((a1, a2), (1.0, 1.0));
    }
}
