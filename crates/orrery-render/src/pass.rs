//! Pass recording for one frame.
//!
//! Shadow maps are depth-only passes opened with [`begin_depth_pass`]. They
//! are recorded on the frame's encoder ahead of the single colour pass
//! described by [`RenderPassBuilder`], so the queue runs them first.

use crate::depth::DepthBuffer;

/// Background colour of the scene.
pub const SPACE_BLACK: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Load/store ops that clear to `value` and keep the result.
fn cleared<V>(value: V) -> wgpu::Operations<V> {
    wgpu::Operations {
        load: wgpu::LoadOp::Clear(value),
        store: wgpu::StoreOp::Store,
    }
}

/// Colour pass state: clear colour plus an optional depth target.
#[derive(Debug)]
pub struct RenderPassBuilder {
    label: &'static str,
    clear_color: wgpu::Color,
    depth: Option<(wgpu::TextureView, f32)>,
}

impl RenderPassBuilder {
    /// The colour pass every frame starts from: black background and a
    /// reverse-Z depth buffer cleared to [`DepthBuffer::CLEAR_VALUE`].
    /// Nothing from the shadow passes carries over.
    pub fn reset(depth: &DepthBuffer) -> Self {
        Self {
            label: "scene-color-pass",
            clear_color: SPACE_BLACK,
            depth: Some((depth.view.clone(), DepthBuffer::CLEAR_VALUE)),
        }
    }

    /// Open the pass on `color_view`.
    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &'encoder wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        let color = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: cleared(self.clear_color),
            depth_slice: None,
        };
        let depth = self
            .depth
            .as_ref()
            .map(|(view, clear)| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(cleared(*clear)),
                stencil_ops: None,
            });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &[Some(color)],
            depth_stencil_attachment: depth,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Open a depth-only pass on `view`, cleared to `clear_value`.
///
/// The viewport spans the whole attachment.
pub fn begin_depth_pass<'encoder>(
    encoder: &'encoder mut wgpu::CommandEncoder,
    label: &str,
    view: &'encoder wgpu::TextureView,
    clear_value: f32,
) -> wgpu::RenderPass<'encoder> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(cleared(clear_value)),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

/// Encoder for one frame, presenting to the acquired surface texture.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    queue: wgpu::Queue,
    target: wgpu::SurfaceTexture,
    target_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, queue: wgpu::Queue, target: wgpu::SurfaceTexture) -> Self {
        let target_view = target
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        Self {
            encoder,
            queue,
            target,
            target_view,
        }
    }

    /// Encoder for passes that do not draw to the surface (shadow maps).
    pub fn encoder_mut(&mut self) -> &mut wgpu::CommandEncoder {
        &mut self.encoder
    }

    /// Colour pass on the surface texture.
    pub fn begin_render_pass<'a>(
        &'a mut self,
        builder: &'a RenderPassBuilder,
    ) -> wgpu::RenderPass<'a> {
        builder.begin(&mut self.encoder, &self.target_view)
    }

    /// Submit everything recorded and present.
    pub fn submit(self) {
        self.queue.submit([self.encoder.finish()]);
        self.target.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::headless_device;

    #[test]
    fn test_cleared_ops_store_results() {
        let ops = cleared(0.5_f32);
        assert_eq!(ops.load, wgpu::LoadOp::Clear(0.5));
        assert_eq!(ops.store, wgpu::StoreOp::Store);
    }

    #[test]
    fn test_reset_clears_to_black_and_reverse_z() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };
        let depth = DepthBuffer::new(&device, 8, 8);
        let builder = RenderPassBuilder::reset(&depth);
        assert_eq!(builder.clear_color, SPACE_BLACK);
        assert_eq!(builder.label, "scene-color-pass");
        let clear = builder.depth.as_ref().map(|(_, clear)| *clear);
        assert_eq!(clear, Some(0.0));
    }
}
