use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDomain {
    Personal,
    Fitness,
    Academic,
    Finance,
    Career,
    Business,
    Cooking,
    Travel,
    Health,
    Dating,
    Timeline,
    /// Metrics captured from free text rather than picked from a definition.
    Detected,
}

impl MetricDomain {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Personal,
            Self::Fitness,
            Self::Academic,
            Self::Finance,
            Self::Career,
            Self::Business,
            Self::Cooking,
            Self::Travel,
            Self::Health,
            Self::Dating,
            Self::Timeline,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Fitness => "fitness",
            Self::Academic => "academic",
            Self::Finance => "finance",
            Self::Career => "career",
            Self::Business => "business",
            Self::Cooking => "cooking",
            Self::Travel => "travel",
            Self::Health => "health",
            Self::Dating => "dating",
            Self::Timeline => "timeline",
            Self::Detected => "detected",
        }
    }

    /// Parse a pickable domain. `detected` is not offered.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ordered().into_iter().find(|domain| domain.key() == key)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Fitness => "Fitness",
            Self::Academic => "Academic",
            Self::Finance => "Finance",
            Self::Career => "Career",
            Self::Business => "Business",
            Self::Cooking => "Cooking",
            Self::Travel => "Travel",
            Self::Health => "Health",
            Self::Dating => "Dating",
            Self::Timeline => "Timeline",
            Self::Detected => "Detected",
        }
    }
}

/// A metric the user can pick from a list. Compiled in, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub placeholder: &'static str,
    pub domain: MetricDomain,
}

const fn def(
    domain: MetricDomain,
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    placeholder: &'static str,
) -> MetricDefinition {
    MetricDefinition {
        key,
        label,
        unit,
        placeholder,
        domain,
    }
}

use MetricDomain::{
    Academic, Business, Career, Cooking, Dating, Finance, Fitness, Health, Personal, Timeline,
    Travel,
};

const DEFINITIONS: &[MetricDefinition] = &[
    def(Personal, "age", "Age", "years", "25"),
    def(Personal, "height_inches", "Height", "inches", "70"),
    def(Personal, "weight_current_lbs", "Current Weight", "lbs", "150"),
    def(Personal, "weight_target_lbs", "Target Weight", "lbs", "140"),
    def(Fitness, "workouts_per_week", "Workouts Per Week", "times", "4"),
    def(Fitness, "bench_press_lbs", "Bench Press Max", "lbs", "185"),
    def(Fitness, "deadlift_lbs", "Deadlift Max", "lbs", "275"),
    def(Fitness, "squat_lbs", "Squat Max", "lbs", "225"),
    def(Fitness, "marathon_time_minutes", "Marathon Time", "minutes", "240"),
    def(Fitness, "miles_per_week", "Running Miles Per Week", "miles", "20"),
    def(Fitness, "body_fat_percent", "Body Fat Percentage", "percent", "15"),
    def(Academic, "gpa_current", "Current GPA", "4.0 scale", "3.5"),
    def(Academic, "gpa_target", "Target GPA", "4.0 scale", "3.8"),
    def(Academic, "gmat_score", "GMAT Score", "points", "650"),
    def(Academic, "gre_score", "GRE Score", "points", "320"),
    def(Academic, "lsat_score", "LSAT Score", "points", "165"),
    def(Academic, "mcat_score", "MCAT Score", "points", "515"),
    def(Academic, "sat_score", "SAT Score", "points", "1400"),
    def(Academic, "study_hours_per_week", "Study Hours Per Week", "hours", "20"),
    def(Academic, "class_credits", "Credit Hours", "credits", "15"),
    def(Finance, "current_salary", "Current Salary", "annual", "75000"),
    def(Finance, "target_salary", "Target Salary", "annual", "100000"),
    def(Finance, "net_worth_current", "Current Net Worth", "dollars", "50000"),
    def(Finance, "monthly_savings", "Monthly Savings", "dollars", "2000"),
    def(Finance, "credit_score", "Credit Score", "score", "750"),
    def(Finance, "debt_total", "Total Debt", "dollars", "25000"),
    def(Finance, "investment_portfolio", "Investment Portfolio", "dollars", "15000"),
    def(Finance, "apr_rate", "APR Rate", "percent", "4.5"),
    def(Finance, "down_payment", "Down Payment Available", "dollars", "50000"),
    def(Career, "experience_years", "Years Experience", "years", "5"),
    def(Career, "projects_completed", "Projects Completed", "count", "12"),
    def(Career, "team_size_managed", "Team Size Managed", "people", "8"),
    def(Career, "certifications_count", "Professional Certifications", "count", "3"),
    def(Career, "work_hours_per_week", "Work Hours Per Week", "hours", "45"),
    def(Career, "companies_worked", "Companies Worked At", "count", "3"),
    def(Business, "startup_funding", "Startup Funding Needed", "dollars", "100000"),
    def(Business, "current_revenue", "Current Monthly Revenue", "dollars", "5000"),
    def(Business, "target_revenue", "Target Monthly Revenue", "dollars", "50000"),
    def(Business, "current_employees", "Current Employees", "people", "5"),
    def(Business, "target_employees", "Target Employees", "people", "25"),
    def(Business, "burn_rate_monthly", "Monthly Burn Rate", "dollars", "10000"),
    def(Business, "customer_acquisition_cost", "Customer Acquisition Cost", "dollars", "50"),
    def(Business, "lifetime_value", "Customer Lifetime Value", "dollars", "500"),
    def(Business, "conversion_rate", "Conversion Rate", "percent", "2.5"),
    def(Cooking, "cooking_temp_fahrenheit", "Cooking Temperature", "fahrenheit", "375"),
    def(Cooking, "cooking_time_minutes", "Cooking Time", "minutes", "45"),
    def(Cooking, "recipe_servings", "Recipe Servings", "servings", "6"),
    def(Cooking, "prep_time_minutes", "Prep Time", "minutes", "30"),
    def(Cooking, "ingredient_cost", "Ingredient Cost", "dollars", "25"),
    def(Cooking, "calories_per_serving", "Calories Per Serving", "calories", "350"),
    def(Travel, "travel_budget", "Travel Budget", "dollars", "3000"),
    def(Travel, "trip_duration_days", "Trip Duration", "days", "10"),
    def(Travel, "flight_cost", "Flight Cost", "dollars", "800"),
    def(Travel, "hotel_cost_per_night", "Hotel Cost Per Night", "dollars", "150"),
    def(Travel, "countries_visited", "Countries Visited", "count", "12"),
    def(Travel, "miles_traveled", "Miles to Travel", "miles", "5000"),
    def(Health, "blood_pressure_systolic", "Blood Pressure (Systolic)", "mmHg", "120"),
    def(Health, "blood_pressure_diastolic", "Blood Pressure (Diastolic)", "mmHg", "80"),
    def(Health, "heart_rate_resting", "Resting Heart Rate", "bpm", "65"),
    def(Health, "cholesterol_total", "Total Cholesterol", "mg/dL", "180"),
    def(Health, "sleep_hours_per_night", "Sleep Hours Per Night", "hours", "7.5"),
    def(Health, "water_intake_ounces", "Daily Water Intake", "ounces", "64"),
    def(Health, "steps_per_day", "Steps Per Day", "steps", "8000"),
    def(Dating, "dates_per_month", "Dates Per Month", "dates", "4"),
    def(Dating, "dating_app_matches", "Dating App Matches", "matches", "10"),
    def(Dating, "relationship_length_months", "Longest Relationship", "months", "18"),
    def(Dating, "social_events_per_week", "Social Events Per Week", "events", "3"),
    def(Dating, "dating_budget_monthly", "Monthly Dating Budget", "dollars", "400"),
    def(Timeline, "milestone_frequency_weeks", "Milestone Check-in", "weeks", "4"),
];

/// Keys offered by the single flat picker.
const FLAT_KEYS: &[&str] = &[
    "age",
    "height_inches",
    "weight_current_lbs",
    "workouts_per_week",
    "bench_press_lbs",
    "marathon_time_minutes",
    "gpa_current",
    "gmat_score",
    "gre_score",
    "current_salary",
    "net_worth_current",
    "credit_score",
    "experience_years",
    "projects_completed",
    "current_revenue",
    "current_employees",
];

/// Units the timeline slot accepts, in picker order.
pub const TIMELINE_UNITS: &[&str] = &["days", "weeks", "months", "years"];

pub fn all() -> &'static [MetricDefinition] {
    DEFINITIONS
}

pub fn by_domain(domain: MetricDomain) -> impl Iterator<Item = &'static MetricDefinition> {
    DEFINITIONS
        .iter()
        .filter(move |definition| definition.domain == domain)
}

pub fn flat() -> impl Iterator<Item = &'static MetricDefinition> {
    FLAT_KEYS.iter().filter_map(|key| find(key))
}

pub fn find(key: &str) -> Option<&'static MetricDefinition> {
    DEFINITIONS.iter().find(|definition| definition.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let mut seen = HashSet::new();
        for definition in all() {
            assert!(seen.insert(definition.key), "duplicate key {}", definition.key);
        }
    }

    #[test]
    fn flat_picker_resolves_every_key() {
        assert_eq!(flat().count(), FLAT_KEYS.len());
    }

    #[test]
    fn every_listed_domain_has_definitions() {
        for domain in MetricDomain::ordered() {
            assert!(by_domain(domain).next().is_some(), "{domain:?} is empty");
        }
    }

    #[test]
    fn domain_keys_round_trip_except_detected() {
        for domain in MetricDomain::ordered() {
            assert_eq!(MetricDomain::from_key(domain.key()), Some(domain));
        }
        assert_eq!(MetricDomain::from_key("detected"), None);
    }

    #[test]
    fn timeline_keys_stay_out_of_the_definition_table() {
        assert!(all()
            .iter()
            .all(|definition| !definition.key.starts_with("timeline_")));
    }
}
