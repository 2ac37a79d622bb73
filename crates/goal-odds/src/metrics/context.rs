//! Flattening of a [`MetricStore`] into the context string sent with a
//! prediction request.
//!
//! Groups render in a fixed order (quantitative, qualitative, categorical),
//! each in insertion order, and empty groups are skipped:
//!
//! ```text
//! age: 25 years, motivation_ratio: 0.80, motivation_weight: 0.60, gender: female
//! ```

use tracing::warn;

use super::store::MetricStore;

const SEPARATOR: &str = ", ";

/// Receives the serialized context after every accepted mutation.
pub trait ContextListener {
    fn context_changed(&mut self, context: &str);
}

impl<F> ContextListener for F
where
    F: FnMut(&str),
{
    fn context_changed(&mut self, context: &str) {
        self(context)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    #[error("qualitative factor '{tag}' has a non-finite {field}")]
    NonFinite { tag: String, field: &'static str },
    #[error("qualitative factor with an empty tag")]
    EmptyTag,
    #[error("categorical {kind} has an empty value")]
    EmptyCategorical { kind: &'static str },
}

/// Render every group. Fails when a qualitative or categorical entry cannot be
/// represented.
pub fn render_full(store: &MetricStore) -> Result<String, ContextError> {
    let quantitative = render_quantitative(store);

    let mut qualitative = Vec::with_capacity(store.qualitative().len());
    for factor in store.qualitative() {
        if factor.tag.is_empty() {
            return Err(ContextError::EmptyTag);
        }
        for (field, value) in [("confidence", factor.confidence), ("weight", factor.weight)] {
            if !value.is_finite() {
                return Err(ContextError::NonFinite {
                    tag: factor.tag.clone(),
                    field,
                });
            }
        }
        qualitative.push(format!(
            "{tag}_ratio: {:.2}, {tag}_weight: {:.2}",
            factor.confidence,
            factor.weight,
            tag = factor.tag
        ));
    }

    let mut categorical = Vec::with_capacity(store.categorical().len());
    for entry in store.categorical() {
        if entry.value.is_empty() {
            return Err(ContextError::EmptyCategorical {
                kind: entry.kind.key(),
            });
        }
        categorical.push(format!("{}: {}", entry.kind.key(), entry.value));
    }

    let groups = [
        quantitative,
        qualitative.join(SEPARATOR),
        categorical.join(SEPARATOR),
    ];
    Ok(groups
        .iter()
        .filter(|group| !group.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(SEPARATOR))
}

/// Quantitative metrics only, as `key: value unit`.
pub fn render_quantitative(store: &MetricStore) -> String {
    store
        .metrics()
        .iter()
        .map(|metric| format!("{}: {} {}", metric.key, metric.value, metric.unit))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Serialize the store, degrading to quantitative-only output when the full
/// rendering fails. Never blocks the caller.
pub fn serialize(store: &MetricStore) -> String {
    match render_full(store) {
        Ok(context) => context,
        Err(err) => {
            warn!(error = %err, "falling back to quantitative-only context");
            render_quantitative(store)
        }
    }
}

/// Serialize and hand the result to `listener`.
pub fn emit<L>(store: &MetricStore, listener: &mut L)
where
    L: ContextListener + ?Sized,
{
    let context = serialize(store);
    listener.context_changed(&context);
}
