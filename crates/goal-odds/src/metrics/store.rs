use serde::Serialize;

use super::catalog::{standard_spec, MetricCategory};
use super::definitions::{self, MetricDomain, TIMELINE_UNITS};
use super::domain::{
    clamp_unit, sanitize_tag, CategoricalKind, CategoricalMetric, InputError, Metric, MetricId,
    MetricKind, QualitativeMetric, TIMELINE_PREFIX,
};
use super::extractor::Detection;

/// Session-scoped, insertion-ordered metric lists.
#[derive(Debug, Clone, Serialize)]
pub struct MetricStore {
    metrics: Vec<Metric>,
    qualitative: Vec<QualitativeMetric>,
    categorical: Vec<CategoricalMetric>,
    timeline_value: String,
    timeline_unit: String,
    #[serde(skip)]
    next_id: u64,
}

impl Default for MetricStore {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            qualitative: Vec::new(),
            categorical: Vec::new(),
            timeline_value: String::new(),
            timeline_unit: "months".to_string(),
            next_id: 1,
        }
    }
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn qualitative(&self) -> &[QualitativeMetric] {
        &self.qualitative
    }

    pub fn categorical(&self) -> &[CategoricalMetric] {
        &self.categorical
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.qualitative.is_empty() && self.categorical.is_empty()
    }

    pub fn timeline(&self) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.is_timeline())
    }

    pub fn timeline_unit(&self) -> &str {
        &self.timeline_unit
    }

    fn allocate_id(&mut self) -> MetricId {
        let id = MetricId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a quantitative metric for a known definition.
    pub fn add_metric(&mut self, key: &str, value: &str) -> Result<MetricId, InputError> {
        let definition =
            definitions::find(key).ok_or_else(|| InputError::UnknownDefinition(key.to_string()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(InputError::EmptyValue);
        }

        let id = self.allocate_id();
        self.metrics.push(Metric {
            id,
            domain: definition.domain,
            key: definition.key.to_string(),
            label: definition.label.to_string(),
            value: value.to_string(),
            unit: definition.unit.to_string(),
            kind: Some(MetricKind::Quantitative),
        });
        Ok(id)
    }

    /// Store a metric recognised by the extractor with the unit it was detected
    /// in. A timeline detection fills the timeline slot, replacing any earlier
    /// timeline entry.
    pub fn add_detected(&mut self, detection: &Detection) -> MetricId {
        if detection.category == MetricCategory::Timeline {
            if TIMELINE_UNITS.contains(&detection.unit) {
                self.timeline_unit = detection.unit.to_string();
            }
            self.timeline_value = detection.value.to_string();
            return self.push_timeline();
        }

        let id = self.allocate_id();
        self.metrics.push(Metric {
            id,
            domain: MetricDomain::Detected,
            key: detection.category.key().to_string(),
            label: detection.category.label().to_string(),
            value: detection.value.to_string(),
            unit: detection.unit.to_string(),
            kind: Some(MetricKind::Quantitative),
        });
        id
    }

    pub fn remove_metric(&mut self, id: MetricId) -> Result<Metric, InputError> {
        let index = self
            .metrics
            .iter()
            .position(|metric| metric.id == id)
            .ok_or(InputError::NotFound(id))?;
        let removed = self.metrics.remove(index);
        if removed.is_timeline() {
            self.timeline_value.clear();
        }
        Ok(removed)
    }

    /// Change the unit of a metric. Detected metrics accept their category's
    /// candidate units; picked metrics keep their definition's unit.
    pub fn update_unit(&mut self, id: MetricId, unit: &str) -> Result<(), InputError> {
        let metric = self
            .metrics
            .iter()
            .find(|metric| metric.id == id)
            .ok_or(InputError::NotFound(id))?;

        if metric.is_timeline() {
            return self.set_timeline_unit(unit);
        }

        let allowed = match metric.domain {
            MetricDomain::Detected => MetricCategory::from_key(&metric.key)
                .and_then(standard_spec)
                .map(|spec| spec.accepts_unit(unit))
                .unwrap_or(false),
            _ => metric.unit == unit,
        };
        if !allowed {
            return Err(InputError::UnsupportedUnit {
                key: metric.key.clone(),
                unit: unit.to_string(),
            });
        }

        if let Some(metric) = self.metrics.iter_mut().find(|metric| metric.id == id) {
            metric.unit = unit.to_string();
        }
        Ok(())
    }

    /// Add a qualitative factor. Both scalars are clamped into `[0, 1]`.
    pub fn add_qualitative(
        &mut self,
        raw_tag: &str,
        confidence: f64,
        weight: f64,
    ) -> Result<MetricId, InputError> {
        let tag = sanitize_tag(raw_tag);
        if tag.is_empty() {
            return Err(InputError::EmptyTag(raw_tag.to_string()));
        }

        let id = self.allocate_id();
        self.qualitative.push(QualitativeMetric {
            id,
            tag,
            confidence: clamp_unit(confidence),
            weight: clamp_unit(weight),
        });
        Ok(id)
    }

    pub fn remove_qualitative(&mut self, id: MetricId) -> Result<QualitativeMetric, InputError> {
        let index = self
            .qualitative
            .iter()
            .position(|metric| metric.id == id)
            .ok_or(InputError::NotFound(id))?;
        Ok(self.qualitative.remove(index))
    }

    /// Select a value for a categorical kind, replacing any earlier choice. An
    /// empty value clears the kind and returns `None`.
    pub fn select_categorical(
        &mut self,
        kind: CategoricalKind,
        value: &str,
    ) -> Result<Option<MetricId>, InputError> {
        let value = value.trim();
        if value.is_empty() {
            self.categorical.retain(|entry| entry.kind != kind);
            return Ok(None);
        }
        if !kind.options().iter().any(|(option, _)| *option == value) {
            return Err(InputError::UnknownOption {
                kind: kind.key(),
                value: value.to_string(),
            });
        }

        self.categorical.retain(|entry| entry.kind != kind);
        let id = self.allocate_id();
        self.categorical.push(CategoricalMetric {
            id,
            kind,
            value: value.to_string(),
            label: kind.label().to_string(),
        });
        Ok(Some(id))
    }

    pub fn remove_categorical(&mut self, id: MetricId) -> Result<CategoricalMetric, InputError> {
        let index = self
            .categorical
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(InputError::NotFound(id))?;
        Ok(self.categorical.remove(index))
    }

    /// Set the timeline value. An empty value removes the timeline entry.
    pub fn set_timeline(&mut self, value: &str) -> Option<MetricId> {
        self.timeline_value = value.trim().to_string();
        self.rebuild_timeline()
    }

    /// Change the timeline unit. With no value set the unit is remembered for
    /// the next [`MetricStore::set_timeline`].
    pub fn set_timeline_unit(&mut self, unit: &str) -> Result<(), InputError> {
        if !TIMELINE_UNITS.contains(&unit) {
            return Err(InputError::UnsupportedUnit {
                key: "timeline".to_string(),
                unit: unit.to_string(),
            });
        }
        self.timeline_unit = unit.to_string();
        if !self.timeline_value.is_empty() {
            self.rebuild_timeline();
        }
        Ok(())
    }

    fn rebuild_timeline(&mut self) -> Option<MetricId> {
        if self.timeline_value.is_empty() {
            self.metrics.retain(|metric| !metric.is_timeline());
            return None;
        }
        Some(self.push_timeline())
    }

    fn push_timeline(&mut self) -> MetricId {
        self.metrics.retain(|metric| !metric.is_timeline());
        let id = self.allocate_id();
        self.metrics.push(Metric {
            id,
            domain: MetricDomain::Timeline,
            key: format!("{TIMELINE_PREFIX}{}", self.timeline_unit),
            label: "Timeline".to_string(),
            value: self.timeline_value.clone(),
            unit: self.timeline_unit.clone(),
            kind: Some(MetricKind::Quantitative),
        });
        id
    }

    #[cfg(test)]
    pub(crate) fn push_raw_qualitative(&mut self, metric: QualitativeMetric) {
        self.qualitative.push(metric);
    }
}
