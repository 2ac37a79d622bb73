use serde::{Deserialize, Serialize};
use std::fmt;

use super::definitions::MetricDomain;

/// Identifier assigned by the owning store; unique within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(pub u64);

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{:04}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Quantitative,
    Qualitative,
}

/// A quantitative entry, rendered as `key: value unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: MetricId,
    pub domain: MetricDomain,
    pub key: String,
    pub label: String,
    pub value: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MetricKind>,
}

impl Metric {
    pub fn is_timeline(&self) -> bool {
        self.key.starts_with(TIMELINE_PREFIX)
    }
}

pub(crate) const TIMELINE_PREFIX: &str = "timeline_";

/// A user-named factor. `confidence` below 0.5 hurts the odds, above helps;
/// `weight` is how much the factor matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeMetric {
    pub id: MetricId,
    pub tag: String,
    pub confidence: f64,
    pub weight: f64,
}

/// Categorical factors offered as fixed option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalKind {
    Gender,
    SchoolTier,
    EducationLevel,
    RelationshipStatus,
}

impl CategoricalKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Gender,
            Self::SchoolTier,
            Self::EducationLevel,
            Self::RelationshipStatus,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::SchoolTier => "school_tier",
            Self::EducationLevel => "education_level",
            Self::RelationshipStatus => "relationship_status",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::SchoolTier => "School Tier",
            Self::EducationLevel => "Education Level",
            Self::RelationshipStatus => "Relationship Status",
        }
    }

    /// `(value, label)` pairs accepted for this kind.
    pub const fn options(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Gender => &[
                ("male", "Male"),
                ("female", "Female"),
                ("other", "Other"),
                ("not_specified", "Prefer not to say"),
            ],
            Self::SchoolTier => &[
                ("ivy_league", "Ivy League (Harvard, Yale, etc.)"),
                ("top_20", "Top 20 University"),
                ("top_50", "Top 50 University"),
                ("state_university", "State University"),
                ("community_college", "Community College"),
                ("trade_school", "Trade School"),
                ("international", "International University"),
                ("online", "Online University"),
            ],
            Self::EducationLevel => &[
                ("high_school", "High School"),
                ("some_college", "Some College"),
                ("bachelors", "Bachelor's Degree"),
                ("masters", "Master's Degree"),
                ("phd", "PhD/Doctorate"),
                ("professional", "Professional/Trade"),
            ],
            Self::RelationshipStatus => &[
                ("single", "Single"),
                ("dating", "Dating"),
                ("relationship", "In Relationship"),
                ("engaged", "Engaged"),
                ("married", "Married"),
                ("divorced", "Divorced"),
            ],
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ordered().into_iter().find(|kind| kind.key() == key)
    }
}

/// At most one entry per [`CategoricalKind`] lives in a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalMetric {
    pub id: MetricId,
    pub kind: CategoricalKind,
    pub value: String,
    pub label: String,
}

/// How a qualitative factor's effect is entered.
///
/// Both modes produce the same single `confidence` scalar on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMode {
    /// Confidence is entered directly on a 0..=1 slider, 0.5 being neutral.
    #[default]
    Scalar,
    /// A helps/hurts choice plus a 0..=1 strength.
    Directional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Helps,
    Hurts,
}

/// Effect input as captured from the user, before it becomes a confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectInput {
    Scalar(f64),
    Directional { direction: Direction, strength: f64 },
}

impl EffectInput {
    pub const fn mode(self) -> EffectMode {
        match self {
            Self::Scalar(_) => EffectMode::Scalar,
            Self::Directional { .. } => EffectMode::Directional,
        }
    }

    /// Map to the `[0, 1]` confidence scalar. Directional strength moves the
    /// value away from 0.5 by up to half the range.
    pub fn confidence(self) -> f64 {
        match self {
            Self::Scalar(value) => clamp_unit(value),
            Self::Directional {
                direction,
                strength,
            } => {
                let offset = clamp_unit(strength) / 2.0;
                match direction {
                    Direction::Helps => 0.5 + offset,
                    Direction::Hurts => 0.5 - offset,
                }
            }
        }
    }
}

impl QualitativeMetric {
    pub fn direction(&self) -> Option<Direction> {
        if self.confidence > 0.5 {
            Some(Direction::Helps)
        } else if self.confidence < 0.5 {
            Some(Direction::Hurts)
        } else {
            None
        }
    }

    /// Distance from neutral, rescaled to `[0, 1]`.
    pub fn strength(&self) -> f64 {
        ((self.confidence - 0.5).abs() * 2.0).min(1.0)
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Lowercase, drop everything outside `[a-z0-9\s]`, and join words with `_`.
pub fn sanitize_tag(raw: &str) -> String {
    let mut tag = String::new();
    let mut in_space = false;
    for c in raw.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                tag.push('_');
            }
            in_space = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            tag.push(c);
            in_space = false;
        }
    }
    tag
}

/// Rejected metric mutations. None of these change the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("no metric definition named '{0}'")]
    UnknownDefinition(String),
    #[error("a value is required")]
    EmptyValue,
    #[error("tag '{0}' has no letters or digits")]
    EmptyTag(String),
    #[error("'{value}' is not an option for {kind}")]
    UnknownOption { kind: &'static str, value: String },
    #[error("unit '{unit}' is not offered for {key}")]
    UnsupportedUnit { key: String, unit: String },
    #[error("no metric with id {0}")]
    NotFound(MetricId),
    #[error("{0} input is disabled for this screen")]
    GroupDisabled(&'static str),
    #[error("{0} effect entry is disabled for this screen")]
    EffectModeDisabled(&'static str),
}
