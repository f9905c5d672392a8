use serde::Serialize;
use std::str::FromStr;

use crate::error::SessionError;

/// The movements the tracking backend knows how to count.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum_macros::Display,
    strum_macros::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExerciseKind {
    LeftBicep,
    RightBicep,
    Pushup,
    Squat,
    SunSalutation,
    MountainClimbers,
    JumpRope,
    YogaBlocks,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 8] = [
        ExerciseKind::LeftBicep,
        ExerciseKind::RightBicep,
        ExerciseKind::Pushup,
        ExerciseKind::Squat,
        ExerciseKind::SunSalutation,
        ExerciseKind::MountainClimbers,
        ExerciseKind::JumpRope,
        ExerciseKind::YogaBlocks,
    ];

    /// Stable key used on the wire and on the command line
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Resolve a key from the closed set of supported exercises
    pub fn from_key(key: &str) -> Result<Self, SessionError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| SessionError::UnsupportedExercise(key.to_string()))
    }

    /// Path of the annotated video feed served by the backend
    pub fn feed_path(self) -> &'static str {
        match self {
            ExerciseKind::LeftBicep => "/video_feed_left",
            ExerciseKind::RightBicep => "/video_feed_right",
            ExerciseKind::Pushup => "/video_feed_pushup",
            ExerciseKind::Squat => "/video_feed_squat",
            ExerciseKind::SunSalutation => "/video_feed_sun_salutation",
            ExerciseKind::MountainClimbers => "/video_feed_mountain_climbers",
            ExerciseKind::JumpRope => "/video_feed_jump_rope",
            ExerciseKind::YogaBlocks => "/video_feed_yoga_blocks",
        }
    }

    pub fn feed_url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.feed_path())
    }

    /// Human readable name, e.g. "Mountain Climbers"
    pub fn title(self) -> String {
        self.key()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for ExerciseKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn every_kind_resolves_from_its_own_key() {
        for kind in ExerciseKind::ALL {
            assert_eq!(ExerciseKind::from_key(kind.key()).unwrap(), kind);
            assert_eq!(kind.to_string(), kind.key());
        }
    }

    #[test]
    fn unknown_key_is_not_found() {
        let err = ExerciseKind::from_key("unknown-move").unwrap_err();
        assert_matches!(err, SessionError::UnsupportedExercise(ref key) if key == "unknown-move");
        assert_eq!(err.to_string(), "Exercise not found: unknown-move");
    }

    #[test]
    fn keys_are_case_sensitive() {
        assert!("Squat".parse::<ExerciseKind>().is_err());
        assert_eq!("squat".parse::<ExerciseKind>().unwrap(), ExerciseKind::Squat);
    }

    #[test]
    fn titles_capitalize_each_word() {
        assert_eq!(ExerciseKind::LeftBicep.title(), "Left Bicep");
        assert_eq!(ExerciseKind::Pushup.title(), "Pushup");
        assert_eq!(ExerciseKind::MountainClimbers.title(), "Mountain Climbers");
    }

    #[test]
    fn feed_url_joins_base_and_path() {
        assert_eq!(
            ExerciseKind::SunSalutation.feed_url("http://localhost:5000/"),
            "http://localhost:5000/video_feed_sun_salutation"
        );
        assert_eq!(
            ExerciseKind::LeftBicep.feed_url("http://coach.local"),
            "http://coach.local/video_feed_left"
        );
    }

    #[test]
    fn serializes_as_kebab_key() {
        let json = serde_json::to_string(&ExerciseKind::JumpRope).unwrap();
        assert_eq!(json, "\"jump-rope\"");
    }
}
