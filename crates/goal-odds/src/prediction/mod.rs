//! Calls to the remote prediction service and mapping of its responses.

pub mod auth;
pub mod client;
pub mod request;
pub mod result;
pub mod share;

pub use auth::AuthSession;
pub use client::{ApiError, HttpPredictionClient, PredictionApi};
pub use request::{ConfidenceLevel, Domain, PredictionOptions, PredictionRequest, ShareRequest};
pub use result::{ChainOfThought, FactorContribution, MathBreakdown, PredictionResult};
pub use share::{ShareError, ShareMessage, ShareableOdds};

/// Alert shown for any failed prediction call.
pub const PREDICTION_FAILED_ALERT: &str =
    "Prediction failed. Please check your connection and try again.";
