use serde::{Deserialize, Serialize};

use crate::metrics::{EffectMode, MetricCapabilities, MetricGroup};
use crate::prediction::Domain;

/// What one screen configuration offers: metric groups, the domain picker,
/// and how qualitative effects are entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub metrics: MetricCapabilities,
    pub domains: Vec<Domain>,
}

impl Capabilities {
    /// Free-text entry with suggestions, nothing else.
    pub fn simple() -> Self {
        Self {
            metrics: MetricCapabilities {
                groups: vec![MetricGroup::FreeText, MetricGroup::Quantitative],
                effect_mode: EffectMode::Scalar,
            },
            domains: vec![Domain::Auto],
        }
    }

    /// Free text that falls back to qualitative factors.
    pub fn smart() -> Self {
        Self {
            metrics: MetricCapabilities {
                groups: vec![
                    MetricGroup::FreeText,
                    MetricGroup::Quantitative,
                    MetricGroup::Qualitative,
                ],
                effect_mode: EffectMode::Scalar,
            },
            domains: Domain::ordered().to_vec(),
        }
    }

    /// Domain-grouped pickers with a confidence slider.
    pub fn organized() -> Self {
        Self {
            metrics: MetricCapabilities {
                groups: vec![
                    MetricGroup::Quantitative,
                    MetricGroup::Qualitative,
                    MetricGroup::Categorical,
                    MetricGroup::Timeline,
                ],
                effect_mode: EffectMode::Scalar,
            },
            domains: Domain::ordered().to_vec(),
        }
    }

    /// Single picker with helps/hurts effects.
    pub fn flat() -> Self {
        Self {
            metrics: MetricCapabilities {
                groups: vec![
                    MetricGroup::Quantitative,
                    MetricGroup::Qualitative,
                    MetricGroup::Categorical,
                    MetricGroup::Timeline,
                ],
                effect_mode: EffectMode::Directional,
            },
            domains: Domain::ordered().to_vec(),
        }
    }

    pub fn allows_domain(&self, domain: Domain) -> bool {
        self.domains.contains(&domain)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::organized()
    }
}

/// Named presets, selectable from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Simple,
    Smart,
    #[default]
    Organized,
    Flat,
}

impl Profile {
    pub const fn ordered() -> [Self; 4] {
        [Self::Simple, Self::Smart, Self::Organized, Self::Flat]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Smart => "smart",
            Self::Organized => "organized",
            Self::Flat => "flat",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ordered().into_iter().find(|profile| profile.key() == key)
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Simple => Capabilities::simple(),
            Self::Smart => Capabilities::smart(),
            Self::Organized => Capabilities::organized(),
            Self::Flat => Capabilities::flat(),
        }
    }
}
