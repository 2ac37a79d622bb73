use serde::Serialize;
use serde_json::Value;

use super::client::ApiError;

pub const SHARE_TITLE: &str = "My Prediction";
const SHARE_FOOTER: &str = "Predicted with Goal Odds - goal achievement analysis";

/// `sharing_data` block of a shareable-odds response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareableOdds {
    pub short: Option<String>,
    pub medium: Option<String>,
    pub long: Option<String>,
}

impl ShareableOdds {
    /// `None` when the response carries no `sharing_data`.
    pub fn from_value(data: &Value) -> Option<Self> {
        let sharing = data.get("sharing_data").filter(|value| !value.is_null())?;
        let text = |length: &str| {
            sharing
                .get("sharing_text")
                .and_then(|texts| texts.get(length))
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
                .map(str::to_string)
        };
        Some(Self {
            short: text("short"),
            medium: text("medium"),
            long: text("long"),
        })
    }
}

/// Title and body handed to the platform share target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareMessage {
    pub title: String,
    pub message: String,
}

impl ShareMessage {
    pub fn compose(odds: &ShareableOdds, probability_percent: i64) -> Self {
        let text = odds.medium.clone().unwrap_or_else(|| {
            format!("My prediction: {probability_percent}% success probability for my goal!")
        });
        Self {
            title: SHARE_TITLE.to_string(),
            message: format!("{text}\n\n{SHARE_FOOTER}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("There is no prediction to share yet")]
    NoResult,
    #[error("Could not generate shareable content")]
    Unavailable {
        #[source]
        source: ApiError,
    },
    #[error("Could not share prediction")]
    Failed {
        #[source]
        source: ApiError,
    },
}

impl From<ApiError> for ShareError {
    fn from(source: ApiError) -> Self {
        match source {
            ApiError::Status { .. } | ApiError::MissingField { .. } => Self::Unavailable { source },
            ApiError::Client(_) | ApiError::Transport { .. } | ApiError::MalformedBody { .. } => {
                Self::Failed { source }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn medium_text_is_used_when_present() {
        let odds = ShareableOdds::from_value(&json!({
            "sharing_data": { "sharing_text": { "medium": "72% to run a marathon" } }
        }))
        .expect("sharing data present");
        let message = ShareMessage::compose(&odds, 72);

        assert_eq!(message.title, "My Prediction");
        assert!(message.message.starts_with("72% to run a marathon\n\n"));
    }

    #[test]
    fn missing_text_falls_back_to_probability() {
        let odds = ShareableOdds::from_value(&json!({ "sharing_data": {} })).expect("present");
        let message = ShareMessage::compose(&odds, 41);

        assert!(message
            .message
            .starts_with("My prediction: 41% success probability for my goal!"));
    }

    #[test]
    fn absent_sharing_data_is_none() {
        assert_eq!(ShareableOdds::from_value(&json!({ "ok": true })), None);
    }

    #[test]
    fn status_errors_mean_content_unavailable() {
        let err = ShareError::from(ApiError::Status {
            endpoint: "http://localhost/shareable-odds".to_string(),
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "Could not generate shareable content");
    }
}
