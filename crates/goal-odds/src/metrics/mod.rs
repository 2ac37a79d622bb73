//! Metric capture: free-text extraction, the session metric store, and the
//! context string built from it.

pub mod catalog;
pub mod context;
pub mod definitions;
pub mod domain;
pub mod extractor;
pub mod input;
pub mod store;

pub use catalog::{CatalogError, MetricCategory, PatternCatalog};
pub use context::{ContextError, ContextListener};
pub use definitions::{MetricDefinition, MetricDomain};
pub use domain::{
    CategoricalKind, CategoricalMetric, Direction, EffectInput, EffectMode, InputError, Metric,
    MetricId, QualitativeMetric,
};
pub use extractor::{Detection, Extractor};
pub use input::{MetricCapabilities, MetricGroup, MetricInput, TextEntry};
pub use store::MetricStore;

#[cfg(test)]
mod tests;
