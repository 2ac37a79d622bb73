use serde::{Deserialize, Serialize};

/// Domain hint sent with a prediction. `Auto` lets the service decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    Auto,
    Finance,
    Career,
    Dating,
    Academic,
    Fitness,
    Travel,
}

impl Domain {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Auto,
            Self::Finance,
            Self::Career,
            Self::Dating,
            Self::Academic,
            Self::Fitness,
            Self::Travel,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Finance => "finance",
            Self::Career => "career",
            Self::Dating => "dating",
            Self::Academic => "academic",
            Self::Fitness => "fitness",
            Self::Travel => "travel",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto-detect",
            Self::Finance => "Finance",
            Self::Career => "Career",
            Self::Dating => "Dating",
            Self::Academic => "Academic",
            Self::Fitness => "Fitness",
            Self::Travel => "Travel",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ordered().into_iter().find(|domain| domain.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    #[default]
    Standard,
    High,
    Conservative,
}

impl ConfidenceLevel {
    pub const fn ordered() -> [Self; 3] {
        [Self::Standard, Self::High, Self::Conservative]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::High => "high",
            Self::Conservative => "conservative",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ordered().into_iter().find(|level| level.key() == key)
    }
}

/// Knobs forwarded verbatim to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionOptions {
    pub domain: Domain,
    pub confidence_level: ConfidenceLevel,
    pub enhanced_grounding: bool,
    pub llm_domain_detection: bool,
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self {
            domain: Domain::Auto,
            confidence_level: ConfidenceLevel::Standard,
            enhanced_grounding: true,
            llm_domain_detection: true,
        }
    }
}

/// Payload of `POST /predict`, wrapped in `prediction_data` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub goal: String,
    pub context: String,
    pub domain: Domain,
    pub confidence_level: ConfidenceLevel,
    pub enhanced_grounding: bool,
    pub use_llm_domain_detection: bool,
}

impl PredictionRequest {
    pub fn new(goal: &str, context: &str, options: PredictionOptions) -> Self {
        Self {
            goal: goal.trim().to_string(),
            context: context.trim().to_string(),
            domain: options.domain,
            confidence_level: options.confidence_level,
            enhanced_grounding: options.enhanced_grounding,
            use_llm_domain_detection: options.llm_domain_detection,
        }
    }
}

/// Payload of `POST /shareable-odds`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRequest {
    pub goal: String,
    pub context: String,
    pub user_name: String,
}

impl ShareRequest {
    pub fn new(goal: &str, context: &str, user_name: &str) -> Self {
        Self {
            goal: goal.trim().to_string(),
            context: context.trim().to_string(),
            user_name: user_name.to_string(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct Envelope<'a, T> {
    pub(crate) prediction_data: &'a T,
}
