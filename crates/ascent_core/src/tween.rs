//! Eased property interpolation used for camera transitions.
//!
//! A property can carry at most one active tween. `start` refuses a second
//! tween on a busy property instead of cancelling the first; callers poll
//! `is_tweening` before issuing a new transition. Completion is reported
//! through the `tag` of the finished tween so the owner can run its
//! follow-up (the equivalent of a completion callback) on the same frame.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    CameraPosition,
    DepthOfFieldFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Cubic ease-out.
    Power2Out,
    /// Cubic ease-in-out.
    Power2InOut,
    /// Quintic ease-out.
    Power4Out,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power2Out => 1.0 - (1.0 - t).powi(3),
            Self::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::Power4Out => 1.0 - (1.0 - t).powi(5),
        }
    }
}

/// Identifies what a tween was started for, reported back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenTag {
    CameraIntro,
    ReturnToAstronaut,
    DockExhibit(usize),
    Refocus,
}

#[derive(Debug, Clone, Copy)]
pub struct TweenSpec {
    pub property: TweenProperty,
    pub from: Vec3,
    pub to: Vec3,
    pub duration: f32,
    pub ease: Ease,
    pub tag: TweenTag,
}

impl TweenSpec {
    /// Scalar tween stored in the `x` lane.
    pub fn scalar(
        property: TweenProperty,
        from: f32,
        to: f32,
        duration: f32,
        ease: Ease,
        tag: TweenTag,
    ) -> Self {
        Self {
            property,
            from: Vec3::new(from, 0.0, 0.0),
            to: Vec3::new(to, 0.0, 0.0),
            duration,
            ease,
            tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSample {
    pub property: TweenProperty,
    pub value: Vec3,
    pub finished: bool,
    pub tag: TweenTag,
}

#[derive(Debug, Clone)]
struct ActiveTween {
    spec: TweenSpec,
    elapsed: f32,
}

#[derive(Debug, Default)]
pub struct Tweener {
    active: Vec<ActiveTween>,
}

impl Tweener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween unless its property is already animating.
    pub fn start(&mut self, spec: TweenSpec) -> bool {
        if self.is_tweening(spec.property) {
            log::trace!("tween on {:?} refused: property busy", spec.property);
            return false;
        }
        self.active.push(ActiveTween { spec, elapsed: 0.0 });
        true
    }

    pub fn is_tweening(&self, property: TweenProperty) -> bool {
        self.active.iter().any(|t| t.spec.property == property)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Advance every tween by `dt` seconds and return the current values.
    /// Finished tweens are reported once and then dropped.
    pub fn advance(&mut self, dt: f32) -> Vec<TweenSample> {
        let dt = dt.max(0.0);
        let mut samples = Vec::with_capacity(self.active.len());
        for tween in &mut self.active {
            tween.elapsed += dt;
            let spec = &tween.spec;
            let t = if spec.duration <= 0.0 {
                1.0
            } else {
                (tween.elapsed / spec.duration).min(1.0)
            };
            samples.push(TweenSample {
                property: spec.property,
                value: spec.from.lerp(spec.to, spec.ease.apply(t)),
                finished: t >= 1.0,
                tag: spec.tag,
            });
        }
        self.active
            .retain(|t| t.spec.duration > 0.0 && t.elapsed < t.spec.duration);
        samples
    }
}
