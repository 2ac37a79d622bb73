use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Metric categories the free-text extractor can recognise.
///
/// Variant order mirrors catalog order, which decides ties: text that matches
/// rules from several categories is attributed to the earliest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Height,
    Weight,
    WorkoutFrequency,
    Gpa,
    TestScore,
    Experience,
    Salary,
    Management,
    Savings,
    CreditScore,
    Revenue,
    Employees,
    Age,
    Timeline,
}

impl MetricCategory {
    pub const fn ordered() -> [Self; 14] {
        [
            Self::Height,
            Self::Weight,
            Self::WorkoutFrequency,
            Self::Gpa,
            Self::TestScore,
            Self::Experience,
            Self::Salary,
            Self::Management,
            Self::Savings,
            Self::CreditScore,
            Self::Revenue,
            Self::Employees,
            Self::Age,
            Self::Timeline,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Weight => "weight",
            Self::WorkoutFrequency => "workout_frequency",
            Self::Gpa => "gpa",
            Self::TestScore => "test_score",
            Self::Experience => "experience",
            Self::Salary => "salary",
            Self::Management => "management",
            Self::Savings => "savings",
            Self::CreditScore => "credit_score",
            Self::Revenue => "revenue",
            Self::Employees => "employees",
            Self::Age => "age",
            Self::Timeline => "timeline",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::WorkoutFrequency => "Workout Frequency",
            Self::Gpa => "GPA",
            Self::TestScore => "Test Score",
            Self::Experience => "Experience",
            Self::Salary => "Salary",
            Self::Management => "Team Size",
            Self::Savings => "Savings",
            Self::CreditScore => "Credit Score",
            Self::Revenue => "Revenue",
            Self::Employees => "Employees",
            Self::Age => "Age",
            Self::Timeline => "Timeline",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|category| category.key() == key)
    }
}

/// Static description of one catalog row before its rules are compiled.
#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub category: MetricCategory,
    pub patterns: &'static [&'static str],
    pub units: &'static [&'static str],
    pub default_unit: &'static str,
    pub description: &'static str,
}

/// A catalog row with compiled rules.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    pub spec: CategorySpec,
    pub rules: Vec<Regex>,
}

impl CategorySpec {
    pub fn accepts_unit(&self, unit: &str) -> bool {
        self.units.iter().any(|candidate| *candidate == unit)
    }
}

impl CategoryRules {
    pub fn accepts_unit(&self, unit: &str) -> bool {
        self.spec.accepts_unit(unit)
    }
}

/// Uncompiled row of the built-in catalog, for unit lookups that need no regex.
pub fn standard_spec(category: MetricCategory) -> Option<&'static CategorySpec> {
    STANDARD_SPECS.iter().find(|spec| spec.category == category)
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("pattern {index} for {category:?} does not compile: {source}")]
    InvalidPattern {
        category: MetricCategory,
        index: usize,
        #[source]
        source: regex::Error,
    },
    #[error("{0:?} has no rules")]
    EmptyCategory(MetricCategory),
}

/// Ordered table of categories and their matching rules.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<CategoryRules>,
}

impl PatternCatalog {
    pub fn compile(specs: &[CategorySpec]) -> Result<Self, CatalogError> {
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.patterns.is_empty() {
                return Err(CatalogError::EmptyCategory(spec.category));
            }
            let rules = spec
                .patterns
                .iter()
                .enumerate()
                .map(|(index, pattern)| {
                    Regex::new(pattern).map_err(|source| CatalogError::InvalidPattern {
                        category: spec.category,
                        index,
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            entries.push(CategoryRules { spec: *spec, rules });
        }
        Ok(Self { entries })
    }

    /// The built-in catalog, compiled once per process. A compile failure is
    /// cached and returned to every caller.
    pub fn standard() -> Result<&'static PatternCatalog, CatalogError> {
        static CATALOG: OnceLock<Result<PatternCatalog, CatalogError>> = OnceLock::new();
        CATALOG
            .get_or_init(|| PatternCatalog::compile(STANDARD_SPECS))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn entries(&self) -> &[CategoryRules] {
        &self.entries
    }

    pub fn get(&self, category: MetricCategory) -> Option<&CategoryRules> {
        self.entries
            .iter()
            .find(|entry| entry.spec.category == category)
    }
}

// Catalog order is significant: the first category with a matching rule wins.
// Money suffixes must sit right against the digits so "$20 monthly" is not
// read as twenty million.
const STANDARD_SPECS: &[CategorySpec] = &[
    CategorySpec {
        category: MetricCategory::Height,
        patterns: &[
            r"(?i)(\d+(?:\.\d+)?)\s*(?:feet|ft|foot|')\s*(\d+(?:\.\d+)?)?",
            r#"(?i)(\d+(?:\.\d+)?)\s*(?:inches|inch|in\b|")"#,
            r"(?i)(\d+(?:\.\d+)?)\s*(?:cm\b|centimeters?)",
            r"(?i)(height|tall|how tall).*?(\d+(?:\.\d+)?)",
            r#"(\d+)'\s*(\d+)""#,
        ],
        units: &["feet/inches", "inches", "cm", "meters"],
        default_unit: "feet/inches",
        description: "Physical height",
    },
    CategorySpec {
        category: MetricCategory::Weight,
        patterns: &[
            r"(?i)(\d+(?:\.\d+)?)\s*(?:lbs?|pounds?)\b",
            r"(?i)(\d+(?:\.\d+)?)\s*(?:kg|kilograms?)\b",
            r"(?i)(weigh|weight).*?(\d+(?:\.\d+)?)",
            r"(?i)scale.*?(\d+(?:\.\d+)?)",
        ],
        units: &["lbs", "kg"],
        default_unit: "lbs",
        description: "Body weight",
    },
    CategorySpec {
        category: MetricCategory::WorkoutFrequency,
        patterns: &[
            r"(?i)(workout|exercise|train|gym).*?(\d+(?:\.\d+)?)\s*(?:times?.*?week|days?.*?week)",
            r"(?i)(\d+(?:\.\d+)?)\s*(?:times?.*?week).*?(workout|exercise|train|gym)",
            r"(?i)gym\s*(\d+)",
        ],
        units: &["times per week", "days per week"],
        default_unit: "times per week",
        description: "Weekly workout frequency",
    },
    CategorySpec {
        category: MetricCategory::Gpa,
        patterns: &[
            r"(?i)(gpa|grade\s*point).*?(\d+(?:\.\d+)?)",
            r"(?i)(\d+(?:\.\d+)?)\s*gpa",
            r"(?i)grades?.*?(\d+(?:\.\d+)?)",
            r"(?i)academic.*?(\d+(?:\.\d+)?)",
        ],
        units: &["4.0 scale", "100 scale"],
        default_unit: "4.0 scale",
        description: "Grade Point Average",
    },
    CategorySpec {
        category: MetricCategory::TestScore,
        patterns: &[
            r"(?i)\b(gmat)\b.*?(\d+)",
            r"(?i)(\d+).*?\b(gmat)\b",
            r"(?i)\b(gre)\b.*?(\d+)",
            r"(?i)(\d+).*?\b(gre)\b",
            r"(?i)\b(lsat)\b.*?(\d+)",
            r"(?i)\b(mcat)\b.*?(\d+)",
            r"(?i)\b(sat)\b.*?(\d+)",
            r"(?i)\b(act)\b.*?(\d+)",
            r"(?i)scored?\s*(\d+).*?\b(gmat|gre|lsat|mcat|sat|act)\b",
        ],
        units: &["raw score"],
        default_unit: "raw score",
        description: "Standardized test score",
    },
    CategorySpec {
        category: MetricCategory::Experience,
        patterns: &[
            r"(?i)(\d+(?:\.\d+)?)\s*years?.*?(experience|exp|work)",
            r"(?i)(experience|exp|work).*?(\d+(?:\.\d+)?)\s*years?",
            r"(?i)(worked|been working).*?(\d+(?:\.\d+)?)\s*years?",
            r"(?i)career.*?(\d+(?:\.\d+)?)\s*years?",
        ],
        units: &["years", "months"],
        default_unit: "years",
        description: "Work experience",
    },
    CategorySpec {
        category: MetricCategory::Salary,
        patterns: &[
            r"(?i)\$(\d+(?:,\d{3})*(?:\.\d+)?(?:k\b|m\b|000)?)",
            r"(?i)(salary|income|earn|paid|make).*?\$?(\d+(?:,\d{3})*(?:\.\d+)?(?:k\b|m\b|000)?)",
            r"^\s*\$?(\d{1,3}(?:,\d{3})+|\d{5,})\s*$",
        ],
        units: &["annual", "monthly", "hourly"],
        default_unit: "annual",
        description: "Salary/income",
    },
    CategorySpec {
        category: MetricCategory::Management,
        patterns: &[
            r"(?i)(manage|lead|supervise|oversee).*?(\d+)",
            r"(?i)(team\s*size|team).*?(\d+)",
            r"(?i)(\d+)\s*(?:direct\s*)?reports?\b",
            r"(?i)(\d+)\s*(people|employees|staff|members)",
        ],
        units: &["people"],
        default_unit: "people",
        description: "Team management",
    },
    CategorySpec {
        category: MetricCategory::Savings,
        patterns: &[
            r"(?i)(saved|savings|cash).*?\$?(\d+(?:,\d{3})*(?:k\b|000)?)",
            r"(?i)\$(\d+(?:,\d{3})*(?:k\b|000)?).*?(saved|savings|cash)",
            r"(?i)(emergency\s*fund|rainy\s*day).*?\$?(\d+(?:,\d{3})*(?:k\b|000)?)",
        ],
        units: &["dollars"],
        default_unit: "dollars",
        description: "Savings amount",
    },
    CategorySpec {
        category: MetricCategory::CreditScore,
        patterns: &[
            r"(?i)(credit\s*score|fico).*?(\d+)",
            r"(?i)(\d+).*?(credit\s*score|fico)",
        ],
        units: &["FICO score"],
        default_unit: "FICO score",
        description: "Credit rating",
    },
    CategorySpec {
        category: MetricCategory::Revenue,
        patterns: &[
            r"(?i)(revenue|sales).*?\$?(\d+(?:\.\d+)?(?:,\d{3})*(?:k\b|m\b|000|\s*million)?)",
            r"(?i)\$(\d+(?:\.\d+)?(?:,\d{3})*(?:k\b|m\b|000|\s*million)?).*?(revenue|sales)",
            r"(?i)(mrr|monthly\s*recurring\s*revenue).*?\$?(\d+(?:\.\d+)?(?:,\d{3})*(?:k\b|000)?)",
        ],
        units: &["annual", "monthly"],
        default_unit: "annual",
        description: "Business revenue",
    },
    CategorySpec {
        category: MetricCategory::Employees,
        patterns: &[
            r"(?i)(employees|staff|headcount|team\s*size).*?(\d+)",
            r"(?i)(\d+)\s*(employees|staff|people|members)",
            r"(?i)workforce.*?(\d+)",
        ],
        units: &["people"],
        default_unit: "people",
        description: "Number of employees",
    },
    CategorySpec {
        category: MetricCategory::Age,
        patterns: &[
            r"(?i)(i\s*am|age|aged)\s*(\d+)",
            r"(?i)(\d+)\s*(years?\s*old|yo\b|yrs?\s*old)",
            r"(?i)age.*?(\d+)",
        ],
        units: &["years"],
        default_unit: "years",
        description: "Age",
    },
    CategorySpec {
        category: MetricCategory::Timeline,
        patterns: &[
            r"(?i)\b(in|within|over)\s*(\d+(?:\.\d+)?)\s*(months?|mos?)\b",
            r"(?i)\b(in|within|over)\s*(\d+(?:\.\d+)?)\s*(years?|yrs?)\b",
            r"(?i)\b(in|within|over)\s*(\d+(?:\.\d+)?)\s*(weeks?|wks?)\b",
            r"(?i)\b(in|within|over)\s*(\d+(?:\.\d+)?)\s*(days?)\b",
        ],
        units: &["months", "years", "weeks", "days"],
        default_unit: "months",
        description: "Timeline/deadline",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_follows_category_order() {
        let catalog = PatternCatalog::standard().expect("built-in patterns compile");
        let order: Vec<_> = catalog
            .entries()
            .iter()
            .map(|entry| entry.spec.category)
            .collect();
        assert_eq!(order, MetricCategory::ordered().to_vec());
        assert!(catalog.entries().iter().all(|entry| !entry.rules.is_empty()));
    }

    #[test]
    fn default_unit_is_one_of_the_candidates() {
        let catalog = PatternCatalog::standard().expect("built-in patterns compile");
        for entry in catalog.entries() {
            assert!(
                entry.accepts_unit(entry.spec.default_unit),
                "{:?} default unit missing from candidates",
                entry.spec.category
            );
        }
    }

    #[test]
    fn compile_reports_the_offending_pattern() {
        let specs = [CategorySpec {
            category: MetricCategory::Age,
            patterns: &[r"(\d+)", r"(unclosed"],
            units: &["years"],
            default_unit: "years",
            description: "Age",
        }];
        let err = PatternCatalog::compile(&specs).expect_err("second pattern is invalid");
        assert!(matches!(
            err,
            CatalogError::InvalidPattern {
                category: MetricCategory::Age,
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn category_keys_round_trip() {
        for category in MetricCategory::ordered() {
            assert_eq!(MetricCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(MetricCategory::from_key("unknown"), None);
    }
}
