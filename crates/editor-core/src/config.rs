use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_FRAME_SECONDS: u8 = 3;
pub const MAX_FRAME_SECONDS: u8 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("frame duration must be between {MIN_FRAME_SECONDS} and {MAX_FRAME_SECONDS} seconds, got {0}")]
pub struct FrameDurationError(pub u8);

/// Per-photo display time in whole seconds, closed range [3, 10].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FrameDuration(u8);

impl FrameDuration {
    pub fn new(seconds: u8) -> Result<Self, FrameDurationError> {
        if (MIN_FRAME_SECONDS..=MAX_FRAME_SECONDS).contains(&seconds) {
            Ok(Self(seconds))
        } else {
            Err(FrameDurationError(seconds))
        }
    }

    pub fn seconds(self) -> u8 {
        self.0
    }
}

impl Default for FrameDuration {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for FrameDuration {
    type Error = FrameDurationError;

    fn try_from(seconds: u8) -> Result<Self, Self::Error> {
        Self::new(seconds)
    }
}

impl From<FrameDuration> for u8 {
    fn from(duration: FrameDuration) -> u8 {
        duration.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStyle {
    #[default]
    Subtle,
    Medium,
    Dynamic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStyle {
    #[default]
    Fade,
    Slide,
    Zoom,
    Dissolve,
}

/// Parameters for one generation request. Any combination is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub frame_duration: FrameDuration,
    pub animation: AnimationStyle,
    pub transition: TransitionStyle,
}

/// Partial update merged into [`GenerationConfig`]; absent fields keep
/// their current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConfigPatch {
    pub frame_duration: Option<FrameDuration>,
    pub animation: Option<AnimationStyle>,
    pub transition: Option<TransitionStyle>,
}

impl GenerationConfig {
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(frame_duration) = patch.frame_duration {
            self.frame_duration = frame_duration;
        }
        if let Some(animation) = patch.animation {
            self.animation = animation;
        }
        if let Some(transition) = patch.transition {
            self.transition = transition;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_duration_enforces_closed_range() {
        assert!(FrameDuration::new(3).is_ok());
        assert!(FrameDuration::new(10).is_ok());
        assert_eq!(FrameDuration::new(2), Err(FrameDurationError(2)));
        assert_eq!(FrameDuration::new(11), Err(FrameDurationError(11)));
    }

    #[test]
    fn frame_duration_rejected_on_deserialize() {
        assert!(serde_json::from_str::<FrameDuration>("5").is_ok());
        assert!(serde_json::from_str::<FrameDuration>("11").is_err());
    }

    #[test]
    fn styles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&AnimationStyle::Dynamic).unwrap(), "\"dynamic\"");
        assert_eq!(serde_json::to_string(&TransitionStyle::Dissolve).unwrap(), "\"dissolve\"");
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut config = GenerationConfig::default();
        config.apply(ConfigPatch {
            frame_duration: None,
            animation: Some(AnimationStyle::Medium),
            transition: None,
        });
        assert_eq!(config.frame_duration, FrameDuration::default());
        assert_eq!(config.animation, AnimationStyle::Medium);
        assert_eq!(config.transition, TransitionStyle::Fade);

        config.apply(ConfigPatch::default());
        assert_eq!(config.animation, AnimationStyle::Medium);
    }
}
