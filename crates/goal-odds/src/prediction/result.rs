use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

const DEFAULT_PROBABILITY: f64 = 0.5;
const DEFAULT_NARRATIVE: &str = "Prediction completed successfully.";
const DEFAULT_DOMAIN: &str = "general";
const DEFAULT_CONFIDENCE_LEVEL: &str = "standard";

/// Display-ready view of a prediction response. Every field of the response is
/// optional; missing ones take the fallbacks below.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub narrative: String,
    pub chain_of_thought: Option<ChainOfThought>,
    pub math_breakdown: Option<MathBreakdown>,
    pub factors: Vec<String>,
    pub risks: Vec<String>,
    pub key_success_factors: Vec<String>,
    pub domain: String,
    pub confidence_level: String,
    pub outcome_category: Option<String>,
    pub confidence_interval: Option<(f64, f64)>,
    pub probability_comparison: Option<ProbabilityComparison>,
    pub si_factors_extracted: Vec<(String, Value)>,
    pub statistical_analysis: Option<Value>,
    pub grounding_data: Option<Value>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainOfThought {
    pub reasoning_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MathBreakdown {
    pub base_probability: Option<f64>,
    pub logit_score: Option<f64>,
    pub final_probability: Option<f64>,
    pub positive_factors: Vec<FactorContribution>,
    pub negative_factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub name: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityComparison {
    pub baseline: Option<f64>,
    pub improvement_factor: Option<f64>,
}

impl ProbabilityComparison {
    /// "2.0x better" or "1.5x harder" relative to the baseline.
    pub fn advantage(&self) -> Option<String> {
        let factor = self.improvement_factor.filter(|factor| *factor > 0.0)?;
        Some(if factor > 1.0 {
            format!("{factor:.1}x better")
        } else {
            format!("{:.1}x harder", 1.0 / factor)
        })
    }
}

impl PredictionResult {
    pub fn from_value(data: &Value) -> Self {
        let probability = data
            .get("probability")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_PROBABILITY);

        let narrative = non_empty_str(data.get("narrative"))
            .or_else(|| non_empty_str(data.get("explanation")))
            .unwrap_or(DEFAULT_NARRATIVE)
            .to_string();

        Self {
            probability,
            narrative,
            chain_of_thought: data.get("chain_of_thought").and_then(chain_of_thought),
            math_breakdown: data.get("math_breakdown").and_then(math_breakdown),
            factors: text_list(first_present(data, &["factors", "top_factors"])),
            risks: text_list(first_present(data, &["risks", "risk_factors"])),
            key_success_factors: text_list(data.get("key_success_factors")),
            domain: non_empty_str(data.get("domain"))
                .unwrap_or(DEFAULT_DOMAIN)
                .to_string(),
            confidence_level: non_empty_str(data.get("confidence_level"))
                .unwrap_or(DEFAULT_CONFIDENCE_LEVEL)
                .to_string(),
            outcome_category: non_empty_str(data.get("outcome_category")).map(str::to_string),
            confidence_interval: data.get("confidence_interval").and_then(interval),
            probability_comparison: data
                .get("probability_comparison")
                .and_then(Value::as_object)
                .map(|comparison| ProbabilityComparison {
                    baseline: comparison.get("baseline").and_then(Value::as_f64),
                    improvement_factor: comparison
                        .get("improvement_factor")
                        .and_then(Value::as_f64),
                }),
            si_factors_extracted: data
                .get("si_factors_extracted")
                .and_then(Value::as_object)
                .map(|factors| {
                    factors
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            statistical_analysis: present(data.get("statistical_analysis")),
            grounding_data: present(data.get("grounding_data")),
            received_at: Utc::now(),
        }
    }

    pub fn probability_percent(&self) -> i64 {
        (self.probability * 100.0).round() as i64
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|value| !value.is_null()).cloned()
}

fn first_present<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|value| !value.is_null())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(describe).collect(),
        Some(Value::String(text)) if !text.trim().is_empty() => vec![text.clone()],
        _ => Vec::new(),
    }
}

fn describe(item: &Value) -> Option<String> {
    match item {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => Some(
            named(fields)
                .map(str::to_string)
                .unwrap_or_else(|| item.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

fn named(fields: &Map<String, Value>) -> Option<&str> {
    ["name", "factor", "description", "text"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
}

fn chain_of_thought(value: &Value) -> Option<ChainOfThought> {
    if value.is_null() {
        return None;
    }
    Some(ChainOfThought {
        reasoning_steps: text_list(value.get("reasoning_steps")),
    })
}

fn math_breakdown(value: &Value) -> Option<MathBreakdown> {
    let fields = value.as_object()?;
    Some(MathBreakdown {
        base_probability: fields.get("base_probability").and_then(Value::as_f64),
        logit_score: fields.get("logit_score").and_then(Value::as_f64),
        final_probability: fields.get("final_probability").and_then(Value::as_f64),
        positive_factors: contributions(fields.get("positive_factors")),
        negative_factors: contributions(fields.get("negative_factors")),
    })
}

fn contributions(value: Option<&Value>) -> Vec<FactorContribution> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let fields = item.as_object()?;
                    Some(FactorContribution {
                        name: named(fields)?.to_string(),
                        contribution: fields
                            .get("contribution")
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn interval(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [low, high] => Some((low.as_f64()?, high.as_f64()?)),
        _ => None,
    }
}
