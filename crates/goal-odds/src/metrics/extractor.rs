use regex::Captures;
use serde::Serialize;
use tracing::debug;

use super::catalog::{CatalogError, CategoryRules, MetricCategory, PatternCatalog};

/// A category recognised in free text together with the value pulled from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub category: MetricCategory,
    pub value: f64,
    pub unit: &'static str,
    pub matched: String,
}

/// First-match metric extractor over an ordered [`PatternCatalog`].
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    catalog: &'a PatternCatalog,
}

impl Extractor<'static> {
    /// Extractor over the built-in catalog.
    pub fn standard() -> Result<Self, CatalogError> {
        PatternCatalog::standard().map(Self::new)
    }
}

impl<'a> Extractor<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Classify `text`: the first category, first rule and first digit-bearing
    /// capture group that produce a number win.
    pub fn detect(&self, text: &str) -> Option<Detection> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let detection = self.catalog.entries().iter().find_map(|entry| {
            entry
                .rules
                .iter()
                .find_map(|rule| detection_for(entry, &rule.captures(text)?))
        })?;
        debug!(category = ?detection.category, value = detection.value, "metric detected");
        Some(detection)
    }

    /// Scan a whole paragraph, keeping at most one detection per category.
    pub fn detect_all(&self, text: &str) -> Vec<Detection> {
        self.catalog
            .entries()
            .iter()
            .filter_map(|entry| {
                entry
                    .rules
                    .iter()
                    .find_map(|rule| detection_for(entry, &rule.captures(text)?))
            })
            .collect()
    }
}

fn detection_for(entry: &CategoryRules, captures: &Captures<'_>) -> Option<Detection> {
    let value = extract_value(captures)?;
    Some(Detection {
        category: entry.spec.category,
        value,
        unit: captured_unit(entry, captures).unwrap_or(entry.spec.default_unit),
        matched: captures[0].to_string(),
    })
}

/// A unit spelled out in the matched text, when it is one of the category's
/// candidates. `in 2 years` keeps `years` instead of the default.
fn captured_unit(entry: &CategoryRules, captures: &Captures<'_>) -> Option<&'static str> {
    captures
        .iter()
        .skip(1)
        .flatten()
        .filter(|group| !group.as_str().chars().any(|c| c.is_ascii_digit()))
        .filter_map(|group| canonical_unit(group.as_str()))
        .find_map(|unit| {
            entry
                .spec
                .units
                .iter()
                .copied()
                .find(|candidate| *candidate == unit)
        })
}

fn canonical_unit(raw: &str) -> Option<&'static str> {
    let unit = match raw.trim().to_ascii_lowercase().as_str() {
        "day" | "days" => "days",
        "week" | "weeks" | "wk" | "wks" => "weeks",
        "month" | "months" | "mo" | "mos" => "months",
        "year" | "years" | "yr" | "yrs" => "years",
        _ => return None,
    };
    Some(unit)
}

fn extract_value(captures: &Captures<'_>) -> Option<f64> {
    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|group| group.as_str())
        .filter(|group| group.chars().any(|c| c.is_ascii_digit()))
        .find_map(scaled_value)
}

/// Parse a captured fragment such as `5k`, `2.5m` or `130,000`.
///
/// `k` multiplies by a thousand and `m` (but not `million`) by a million. A
/// trailing `000` is read as a thousands marker: it is removed before the
/// thousand multiplier is applied, so the digits are never counted twice.
pub fn scaled_value(fragment: &str) -> Option<f64> {
    let lowered = fragment.to_ascii_lowercase();
    let numeric: String = lowered
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let base = leading_float(&numeric)?;

    if lowered.contains('k') {
        return Some(base * 1_000.0);
    }
    if lowered.contains('m') && !lowered.contains("million") {
        return Some(base * 1_000_000.0);
    }
    if let Some(head) = thousands_head(&numeric) {
        return Some(head * 1_000.0);
    }
    Some(base)
}

fn leading_float(numeric: &str) -> Option<f64> {
    let mut seen_dot = false;
    let end = numeric
        .char_indices()
        .find(|(_, c)| {
            if *c != '.' {
                return false;
            }
            if seen_dot {
                return true;
            }
            seen_dot = true;
            false
        })
        .map(|(index, _)| index)
        .unwrap_or(numeric.len());
    numeric[..end].parse::<f64>().ok()
}

fn thousands_head(numeric: &str) -> Option<f64> {
    if numeric.contains('.') {
        return None;
    }
    let head = numeric.strip_suffix("000")?;
    if head.is_empty() {
        return None;
    }
    head.parse::<f64>().ok()
}

/// Categories worth prompting for, based on keywords in the goal text.
///
/// Suggestions are deduplicated, skip anything in `present`, and are capped at
/// five.
pub fn suggest_categories(goal: &str, present: &[MetricCategory]) -> Vec<MetricCategory> {
    const KEYWORD_GROUPS: &[(&[&str], &[MetricCategory])] = &[
        (
            &["job", "career", "work"],
            &[
                MetricCategory::Experience,
                MetricCategory::Salary,
                MetricCategory::Gpa,
                MetricCategory::Age,
            ],
        ),
        (
            &["weight", "fitness", "workout"],
            &[
                MetricCategory::Weight,
                MetricCategory::Height,
                MetricCategory::WorkoutFrequency,
                MetricCategory::Age,
            ],
        ),
        (
            &["business", "startup", "company"],
            &[
                MetricCategory::Revenue,
                MetricCategory::Employees,
                MetricCategory::Experience,
                MetricCategory::Savings,
            ],
        ),
        (
            &["school", "college", "university"],
            &[
                MetricCategory::Gpa,
                MetricCategory::TestScore,
                MetricCategory::Age,
            ],
        ),
        (
            &["house", "buy", "mortgage"],
            &[
                MetricCategory::Savings,
                MetricCategory::Salary,
                MetricCategory::CreditScore,
                MetricCategory::Age,
            ],
        ),
    ];

    let lowered = goal.to_lowercase();
    let mut suggestions: Vec<MetricCategory> = Vec::new();
    for (keywords, categories) in KEYWORD_GROUPS {
        if !keywords.iter().any(|keyword| lowered.contains(keyword)) {
            continue;
        }
        for category in *categories {
            if !suggestions.contains(category) && !present.contains(category) {
                suggestions.push(*category);
            }
        }
    }
    suggestions.truncate(5);
    suggestions
}
