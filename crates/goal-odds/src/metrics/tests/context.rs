use crate::metrics::context::{self, render_full, ContextError};
use crate::metrics::domain::{CategoricalKind, MetricId, QualitativeMetric};
use crate::metrics::store::MetricStore;

#[test]
fn empty_store_serializes_to_nothing() {
    assert_eq!(context::serialize(&MetricStore::new()), "");
}

#[test]
fn quantitative_and_qualitative_groups_render_in_order() {
    let mut store = MetricStore::new();
    store.add_qualitative("motivation", 0.8, 0.6).expect("factor");
    store.add_metric("age", "25").expect("metric");

    assert_eq!(
        context::serialize(&store),
        "age: 25 years, motivation_ratio: 0.80, motivation_weight: 0.60"
    );
}

#[test]
fn categorical_entries_come_last() {
    let mut store = MetricStore::new();
    store
        .select_categorical(CategoricalKind::Gender, "female")
        .expect("valid option");
    store.add_metric("gpa_current", "3.6").expect("metric");

    assert_eq!(
        context::serialize(&store),
        "gpa_current: 3.6 4.0 scale, gender: female"
    );
}

#[test]
fn timeline_renders_as_a_quantitative_metric() {
    let mut store = MetricStore::new();
    store.set_timeline("6");
    store.set_timeline_unit("weeks").expect("supported unit");

    assert_eq!(context::serialize(&store), "timeline_weeks: 6 weeks");
}

#[test]
fn unrenderable_factor_falls_back_to_quantitative_only() {
    let mut store = MetricStore::new();
    store.add_metric("age", "41").expect("metric");
    store.push_raw_qualitative(QualitativeMetric {
        id: MetricId(500),
        tag: "luck".to_string(),
        confidence: f64::NAN,
        weight: 0.5,
    });

    assert!(matches!(
        render_full(&store),
        Err(ContextError::NonFinite { field: "confidence", .. })
    ));
    assert_eq!(context::serialize(&store), "age: 41 years");
}

#[test]
fn emit_hands_the_context_to_closures() {
    let mut store = MetricStore::new();
    store.add_metric("credit_score", "710").expect("metric");

    let mut seen = Vec::new();
    let mut listener = |context: &str| seen.push(context.to_string());
    context::emit(&store, &mut listener);

    assert_eq!(seen, vec!["credit_score: 710 score".to_string()]);
}
