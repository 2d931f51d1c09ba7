//! Device capability tier and the post-processing plan it selects.
//!
//! The tier is decided once at startup from the adapter name and never
//! re-evaluated. Unrecognized adapters get the highest tier.

use std::sync::LazyLock;

use regex::Regex;

static LOW_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mali|powervr|intel|hd graphics|radeon\s?(vega|rx)?|adreno\s?[0-5]")
        .expect("low-end adapter pattern")
});
static MID_GTX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)geforce\s?gtx\s?([0-9]+)").expect("gtx adapter pattern"));
static MID_ADRENO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)adreno\s?[6-7]").expect("adreno adapter pattern"));
static HIGH_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)geforce\s?(rtx\s?[0-9]{4}|gtx\s?(1070|1080|16[0-9]{2}|[2-9][0-9]{2,}))")
        .expect("high-end adapter pattern")
});

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceTier {
    Low,
    Mid,
    #[default]
    High,
}

impl DeviceTier {
    /// Classify an adapter name. Checked low, then mid, then high.
    pub fn detect(adapter_name: &str) -> Self {
        let tier = if LOW_END.is_match(adapter_name) {
            Self::Low
        } else if is_mid_range(adapter_name) {
            Self::Mid
        } else {
            // Matched high-end names and unknown adapters both land here.
            if !HIGH_END.is_match(adapter_name) {
                log::debug!("unrecognized adapter {adapter_name:?}, assuming high tier");
            }
            Self::High
        };
        log::info!("adapter {adapter_name:?} classified as {tier}");
        tier
    }

    pub fn level(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Mid => 2,
            Self::High => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Tier 1 (low)",
            Self::Mid => "Tier 2 (mid)",
            Self::High => "Tier 3 (high)",
        }
    }
}

impl std::fmt::Display for DeviceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Three or more GTX model digits not starting with 1070/1080, or Adreno 6xx/7xx.
fn is_mid_range(name: &str) -> bool {
    if MID_ADRENO.is_match(name) {
        return true;
    }
    MID_GTX.captures_iter(name).any(|caps| {
        caps.get(1).is_some_and(|digits| {
            let digits = digits.as_str();
            digits.len() >= 3 && !digits.starts_with("1070") && !digits.starts_with("1080")
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostStage {
    Render,
    Supersample {
        sample_level: u32,
    },
    Bloom {
        strength: f32,
        radius: f32,
        threshold: f32,
    },
    DepthOfField {
        focus: f32,
        aperture: f32,
        max_blur: f32,
    },
    Outline {
        edge_strength: f32,
        edge_thickness: f32,
    },
    Afterimage {
        damp: f32,
    },
    Output,
}

impl PostStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Supersample { .. } => "ssaa",
            Self::Bloom { .. } => "bloom",
            Self::DepthOfField { .. } => "depth-of-field",
            Self::Outline { .. } => "outline",
            Self::Afterimage { .. } => "afterimage",
            Self::Output => "output",
        }
    }

    /// Stages that must be told about viewport size changes.
    pub fn exposes_resize(&self) -> bool {
        matches!(
            self,
            Self::Supersample { .. } | Self::Bloom { .. } | Self::Outline { .. }
        )
    }
}

const SUPERSAMPLE: PostStage = PostStage::Supersample { sample_level: 1 };
const BLOOM: PostStage = PostStage::Bloom {
    strength: 0.35,
    radius: 0.5,
    threshold: 0.4,
};
const DEPTH_OF_FIELD: PostStage = PostStage::DepthOfField {
    focus: 13.5,
    aperture: 1.0e-6,
    max_blur: 0.03,
};
const OUTLINE: PostStage = PostStage::Outline {
    edge_strength: 0.8,
    edge_thickness: 1.0,
};
const AFTERIMAGE: PostStage = PostStage::Afterimage { damp: 0.6 };

/// Ordered post-processing stages for one tier.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePlan {
    pub tier: DeviceTier,
    pub stages: Vec<PostStage>,
}

impl PipelinePlan {
    pub fn compose(tier: DeviceTier) -> Self {
        let middle: &[PostStage] = match tier {
            DeviceTier::High => &[SUPERSAMPLE, BLOOM, DEPTH_OF_FIELD, OUTLINE, AFTERIMAGE],
            DeviceTier::Mid => &[SUPERSAMPLE, BLOOM, OUTLINE],
            DeviceTier::Low => &[BLOOM, OUTLINE],
        };
        let mut stages = Vec::with_capacity(middle.len() + 2);
        stages.push(PostStage::Render);
        stages.extend_from_slice(middle);
        stages.push(PostStage::Output);

        let plan = Self { tier, stages };
        log::info!("post-processing for {tier}: {}", plan.describe());
        plan
    }

    pub fn has_depth_of_field(&self) -> bool {
        self.stages
            .iter()
            .any(|s| matches!(s, PostStage::DepthOfField { .. }))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(PostStage::name).collect()
    }

    pub fn describe(&self) -> String {
        self.stage_names().join(" > ")
    }
}
