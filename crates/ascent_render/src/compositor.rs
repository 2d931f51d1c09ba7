//! Post-processing composition.
//!
//! The compositor owns the tier-selected stage list and the render-target
//! size of every stage that follows the viewport. It records the base scene
//! pass; the overlay draws on top of it afterwards.

use ascent_core::handlers::Resizable;
use ascent_core::tier::{PipelinePlan, PostStage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTarget {
    pub stage: PostStage,
    pub size: (u32, u32),
}

pub struct Compositor {
    plan: PipelinePlan,
    targets: Vec<StageTarget>,
    size: (u32, u32),
    depth_of_field_focus: Option<f32>,
}

impl Compositor {
    pub fn new(plan: PipelinePlan, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let targets = plan
            .stages
            .iter()
            .map(|&stage| StageTarget { stage, size })
            .collect();
        let depth_of_field_focus = plan.stages.iter().find_map(|s| match s {
            PostStage::DepthOfField { focus, .. } => Some(*focus),
            _ => None,
        });
        Self {
            plan,
            targets,
            size,
            depth_of_field_focus,
        }
    }

    pub fn plan(&self) -> &PipelinePlan {
        &self.plan
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn targets(&self) -> &[StageTarget] {
        &self.targets
    }

    pub fn stage_size(&self, name: &str) -> Option<(u32, u32)> {
        self.targets
            .iter()
            .find(|t| t.stage.name() == name)
            .map(|t| t.size)
    }

    pub fn depth_of_field_focus(&self) -> Option<f32> {
        self.depth_of_field_focus
    }

    /// Ignored when the plan has no depth-of-field stage.
    pub fn set_depth_of_field_focus(&mut self, focus: f32) {
        if let Some(current) = self.depth_of_field_focus.as_mut() {
            *current = focus;
        }
    }

    /// Base pass colour: deep blue near the ground fading to black at the top.
    /// Bloom lifts it slightly so the lower tiers read darker.
    pub fn background(&self, altitude: f32) -> wgpu::Color {
        let t = f64::from(altitude.clamp(0.0, 1.0));
        let lift = if self
            .plan
            .stages
            .iter()
            .any(|s| matches!(s, PostStage::Bloom { .. }))
        {
            1.1
        } else {
            1.0
        };
        wgpu::Color {
            r: 0.012 * (1.0 - t) * lift,
            g: 0.02 * (1.0 - t) * lift,
            b: (0.09 - 0.07 * t) * lift,
            a: 1.0,
        }
    }

    /// Record the scene pass into `view`.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        altitude: f32,
    ) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.background(altitude)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
    }
}

impl Resizable for Compositor {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        for target in &mut self.targets {
            if target.stage.exposes_resize() {
                target.size = (width, height);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascent_core::tier::DeviceTier;

    #[test]
    fn resize_touches_only_resizable_stages() {
        let mut compositor = Compositor::new(PipelinePlan::compose(DeviceTier::High), 800, 600);
        compositor.resize(1920, 1080);

        assert_eq!(compositor.size(), (1920, 1080));
        assert_eq!(compositor.stage_size("ssaa"), Some((1920, 1080)));
        assert_eq!(compositor.stage_size("bloom"), Some((1920, 1080)));
        assert_eq!(compositor.stage_size("outline"), Some((1920, 1080)));
        assert_eq!(compositor.stage_size("afterimage"), Some((800, 600)));
    }

    #[test]
    fn resize_is_idempotent_and_skips_zero() {
        let mut compositor = Compositor::new(PipelinePlan::compose(DeviceTier::Mid), 800, 600);
        compositor.resize(1024, 768);
        let once = compositor.targets().to_vec();
        compositor.resize(1024, 768);
        compositor.resize(0, 0);
        assert_eq!(compositor.targets(), once.as_slice());
        assert_eq!(compositor.size(), (1024, 768));
    }

    #[test]
    fn focus_only_with_depth_of_field() {
        let mut high = Compositor::new(PipelinePlan::compose(DeviceTier::High), 1, 1);
        assert_eq!(high.depth_of_field_focus(), Some(13.5));
        high.set_depth_of_field_focus(20.0);
        assert_eq!(high.depth_of_field_focus(), Some(20.0));

        let mut low = Compositor::new(PipelinePlan::compose(DeviceTier::Low), 1, 1);
        low.set_depth_of_field_focus(20.0);
        assert_eq!(low.depth_of_field_focus(), None);
    }

    #[test]
    fn background_darkens_with_altitude() {
        let compositor = Compositor::new(PipelinePlan::compose(DeviceTier::Low), 1, 1);
        let bottom = compositor.background(0.0);
        let top = compositor.background(1.0);
        assert!(bottom.b > top.b);
        assert_eq!(top.r, 0.0);
    }
}
