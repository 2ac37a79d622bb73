use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{CatalogError, MetricCategory};
use super::context::{self, ContextListener};
use super::domain::{CategoricalKind, EffectInput, EffectMode, InputError, MetricId};
use super::extractor::{suggest_categories, Detection, Extractor};
use super::store::MetricStore;

/// Input groups a screen can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricGroup {
    FreeText,
    Quantitative,
    Qualitative,
    Categorical,
    Timeline,
}

impl MetricGroup {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FreeText => "free-text",
            Self::Quantitative => "quantitative",
            Self::Qualitative => "qualitative",
            Self::Categorical => "categorical",
            Self::Timeline => "timeline",
        }
    }
}

/// Which groups are enabled and how qualitative effects are entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCapabilities {
    pub groups: Vec<MetricGroup>,
    pub effect_mode: EffectMode,
}

impl MetricCapabilities {
    pub fn all(effect_mode: EffectMode) -> Self {
        Self {
            groups: vec![
                MetricGroup::FreeText,
                MetricGroup::Quantitative,
                MetricGroup::Qualitative,
                MetricGroup::Categorical,
                MetricGroup::Timeline,
            ],
            effect_mode,
        }
    }

    pub fn allows(&self, group: MetricGroup) -> bool {
        self.groups.contains(&group)
    }
}

/// What a free-text entry turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEntry {
    Detected { id: MetricId, detection: Detection },
    Qualitative { id: MetricId },
}

/// Screen-level metric component: a [`MetricStore`] gated by capabilities that
/// reports the serialized context to its listener after each accepted change.
///
/// Rejected input leaves the store untouched and the listener uncalled.
pub struct MetricInput<L> {
    store: MetricStore,
    capabilities: MetricCapabilities,
    extractor: Extractor<'static>,
    listener: L,
}

impl<L> std::fmt::Debug for MetricInput<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricInput")
            .field("store", &self.store)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl<L> MetricInput<L>
where
    L: ContextListener,
{
    /// Fails only when the built-in pattern catalog does not compile.
    pub fn new(capabilities: MetricCapabilities, listener: L) -> Result<Self, CatalogError> {
        Ok(Self {
            store: MetricStore::new(),
            capabilities,
            extractor: Extractor::standard()?,
            listener,
        })
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    pub fn capabilities(&self) -> &MetricCapabilities {
        &self.capabilities
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn context(&self) -> String {
        context::serialize(&self.store)
    }

    fn require(&self, group: MetricGroup) -> Result<(), InputError> {
        if self.capabilities.allows(group) {
            Ok(())
        } else {
            Err(InputError::GroupDisabled(group.label()))
        }
    }

    fn notify(&mut self) {
        context::emit(&self.store, &mut self.listener);
    }

    pub fn add_metric(&mut self, key: &str, value: &str) -> Result<MetricId, InputError> {
        self.require(MetricGroup::Quantitative)?;
        let id = self.store.add_metric(key, value)?;
        self.notify();
        Ok(id)
    }

    /// Run free text through the extractor. A recognised metric is stored with
    /// the unit it was written in (timeline phrases fill the timeline slot);
    /// anything else becomes a neutral qualitative factor named after the text.
    pub fn add_text(&mut self, text: &str) -> Result<TextEntry, InputError> {
        self.require(MetricGroup::FreeText)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(InputError::EmptyValue);
        }

        let entry = match self.extractor.detect(text) {
            Some(detection) => {
                let id = self.store.add_detected(&detection);
                TextEntry::Detected { id, detection }
            }
            None => {
                debug!(text, "no metric pattern matched; storing as qualitative factor");
                let id = self.store.add_qualitative(text, 0.5, 0.5)?;
                TextEntry::Qualitative { id }
            }
        };
        self.notify();
        Ok(entry)
    }

    /// Seed the store from an existing context paragraph, one metric per
    /// recognised category.
    pub fn seed_from_context(&mut self, text: &str) -> Result<Vec<MetricId>, InputError> {
        self.require(MetricGroup::FreeText)?;
        let ids: Vec<MetricId> = self
            .extractor
            .detect_all(text)
            .iter()
            .map(|detection| self.store.add_detected(detection))
            .collect();
        if !ids.is_empty() {
            self.notify();
        }
        Ok(ids)
    }

    pub fn add_qualitative(
        &mut self,
        tag: &str,
        effect: EffectInput,
        weight: f64,
    ) -> Result<MetricId, InputError> {
        self.require(MetricGroup::Qualitative)?;
        if effect.mode() != self.capabilities.effect_mode {
            return Err(InputError::EffectModeDisabled(match effect.mode() {
                EffectMode::Scalar => "scalar",
                EffectMode::Directional => "directional",
            }));
        }
        let id = self.store.add_qualitative(tag, effect.confidence(), weight)?;
        self.notify();
        Ok(id)
    }

    pub fn select_categorical(
        &mut self,
        kind: CategoricalKind,
        value: &str,
    ) -> Result<Option<MetricId>, InputError> {
        self.require(MetricGroup::Categorical)?;
        let id = self.store.select_categorical(kind, value)?;
        self.notify();
        Ok(id)
    }

    pub fn set_timeline(&mut self, value: &str) -> Result<Option<MetricId>, InputError> {
        self.require(MetricGroup::Timeline)?;
        let id = self.store.set_timeline(value);
        self.notify();
        Ok(id)
    }

    pub fn set_timeline_unit(&mut self, unit: &str) -> Result<(), InputError> {
        self.require(MetricGroup::Timeline)?;
        self.store.set_timeline_unit(unit)?;
        self.notify();
        Ok(())
    }

    pub fn update_unit(&mut self, id: MetricId, unit: &str) -> Result<(), InputError> {
        self.store.update_unit(id, unit)?;
        self.notify();
        Ok(())
    }

    /// Remove an entry from whichever group holds `id`.
    pub fn remove(&mut self, id: MetricId) -> Result<(), InputError> {
        let removed = self.store.remove_metric(id).is_ok()
            || self.store.remove_qualitative(id).is_ok()
            || self.store.remove_categorical(id).is_ok();
        if !removed {
            return Err(InputError::NotFound(id));
        }
        self.notify();
        Ok(())
    }

    /// Categories worth prompting for given the goal, skipping ones already
    /// captured.
    pub fn suggestions(&self, goal: &str) -> Vec<MetricCategory> {
        if !self.capabilities.allows(MetricGroup::FreeText) {
            return Vec::new();
        }
        let present: Vec<MetricCategory> = self
            .store
            .metrics()
            .iter()
            .filter_map(|metric| MetricCategory::from_key(&metric.key))
            .collect();
        suggest_categories(goal, &present)
    }
}
