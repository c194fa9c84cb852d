//! Reordering policies.
//!
//! Policies form a closed set parsed once from their command-line names
//! (`shuffle`, `sort-popularity`, `sort-audio-feature-tempo`, ...). Each sorting
//! policy owns its comparison, so the reorder engine never looks at names.

use std::{cmp::Ordering, fmt, str::FromStr};

use clap::ValueEnum;

use crate::{
    error::Error,
    types::{AudioFeatures, Track},
};

const AUDIO_FEATURE_PREFIX: &str = "sort-audio-feature-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFeature {
    Acousticness,
    Danceability,
    DurationMs,
    Energy,
    Instrumentalness,
    Key,
    Liveness,
    Loudness,
    Mode,
    Speechiness,
    Tempo,
    TimeSignature,
    Valence,
}

impl AudioFeature {
    pub const ALL: [AudioFeature; 13] = [
        AudioFeature::Acousticness,
        AudioFeature::Danceability,
        AudioFeature::DurationMs,
        AudioFeature::Energy,
        AudioFeature::Instrumentalness,
        AudioFeature::Key,
        AudioFeature::Liveness,
        AudioFeature::Loudness,
        AudioFeature::Mode,
        AudioFeature::Speechiness,
        AudioFeature::Tempo,
        AudioFeature::TimeSignature,
        AudioFeature::Valence,
    ];

    /// Field name as used by the Spotify audio-features object.
    pub fn name(&self) -> &'static str {
        match self {
            AudioFeature::Acousticness => "acousticness",
            AudioFeature::Danceability => "danceability",
            AudioFeature::DurationMs => "duration_ms",
            AudioFeature::Energy => "energy",
            AudioFeature::Instrumentalness => "instrumentalness",
            AudioFeature::Key => "key",
            AudioFeature::Liveness => "liveness",
            AudioFeature::Loudness => "loudness",
            AudioFeature::Mode => "mode",
            AudioFeature::Speechiness => "speechiness",
            AudioFeature::Tempo => "tempo",
            AudioFeature::TimeSignature => "time_signature",
            AudioFeature::Valence => "valence",
        }
    }

    pub fn value(&self, features: &AudioFeatures) -> f64 {
        match self {
            AudioFeature::Acousticness => features.acousticness,
            AudioFeature::Danceability => features.danceability,
            AudioFeature::DurationMs => features.duration_ms,
            AudioFeature::Energy => features.energy,
            AudioFeature::Instrumentalness => features.instrumentalness,
            AudioFeature::Key => features.key,
            AudioFeature::Liveness => features.liveness,
            AudioFeature::Loudness => features.loudness,
            AudioFeature::Mode => features.mode,
            AudioFeature::Speechiness => features.speechiness,
            AudioFeature::Tempo => features.tempo,
            AudioFeature::TimeSignature => features.time_signature,
            AudioFeature::Valence => features.valence,
        }
    }

    /// Sort key of a track; a track without features counts as 0.
    pub fn key_of(&self, track: &Track) -> f64 {
        track
            .audio_features
            .as_ref()
            .map_or(0.0, |features| self.value(features))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Pass-through, exercises the commit path without changing the order.
    Nop,
    Shuffle,
    Popularity,
    Alphabetical,
    AudioFeature(AudioFeature),
}

impl Policy {
    /// Every policy in menu order.
    pub fn all() -> Vec<Policy> {
        let mut policies = vec![
            Policy::Nop,
            Policy::Shuffle,
            Policy::Popularity,
            Policy::Alphabetical,
        ];
        policies.extend(AudioFeature::ALL.iter().copied().map(Policy::AudioFeature));
        policies
    }

    pub fn needs_audio_features(&self) -> bool {
        matches!(self, Policy::AudioFeature(_))
    }

    /// Ascending comparison used by sorting policies, `None` for the others.
    pub fn compare(&self, a: &Track, b: &Track) -> Option<Ordering> {
        match self {
            Policy::Nop | Policy::Shuffle => None,
            Policy::Popularity => Some(a.popularity.cmp(&b.popularity)),
            Policy::Alphabetical => Some(a.name.cmp(&b.name)),
            Policy::AudioFeature(feature) => Some(feature.key_of(a).total_cmp(&feature.key_of(b))),
        }
    }

    /// Human readable verb used in progress messages and unit descriptions.
    pub fn describe(&self) -> String {
        match self {
            Policy::Nop => "left untouched".to_string(),
            Policy::Shuffle => "shuffled".to_string(),
            Policy::Popularity => "sorted by popularity".to_string(),
            Policy::Alphabetical => "sorted alphabetically".to_string(),
            Policy::AudioFeature(feature) => format!("sorted by {}", feature.name()),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Nop => write!(f, "nop"),
            Policy::Shuffle => write!(f, "shuffle"),
            Policy::Popularity => write!(f, "sort-popularity"),
            Policy::Alphabetical => write!(f, "sort-alphabetical"),
            Policy::AudioFeature(feature) => {
                write!(f, "{}{}", AUDIO_FEATURE_PREFIX, feature.name())
            }
        }
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name {
            "nop" => return Ok(Policy::Nop),
            "shuffle" => return Ok(Policy::Shuffle),
            "sort-popularity" => return Ok(Policy::Popularity),
            "sort-alphabetical" => return Ok(Policy::Alphabetical),
            _ => {}
        }

        name.strip_prefix(AUDIO_FEATURE_PREFIX)
            .and_then(|field| AudioFeature::ALL.iter().find(|f| f.name() == field))
            .map(|feature| Policy::AudioFeature(*feature))
            .ok_or_else(|| Error::InvalidPolicy(name.to_string()))
    }
}

/// clap value parser for `--playlist-modification`.
pub fn parse_policy(s: &str) -> Result<Policy, String> {
    s.parse::<Policy>().map_err(|e| {
        let names: Vec<String> = Policy::all().iter().map(|p| p.to_string()).collect();
        format!("{}. Valid values: {}", e, names.join(", "))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortOrder::Asc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}
