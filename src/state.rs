use tracing::{info, warn};

use crate::record::{EmissionsRecord, FieldUpdateSet};

/// Session-owned emissions state. All writes go through [`EmissionsState::merge`].
#[derive(Debug, Clone)]
pub struct EmissionsState {
    record: EmissionsRecord,
    revision: u64,
}

impl EmissionsState {
    pub fn new(initial: EmissionsRecord) -> Self {
        Self {
            record: initial,
            revision: 0,
        }
    }

    pub fn read(&self) -> EmissionsRecord {
        self.record
    }

    /// Number of merges applied since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Overwrite every field present in `update`, keep the rest, return the full record.
    ///
    /// Any `f64` is accepted. Negative or non-finite values are logged, not refused.
    pub fn merge(&mut self, update: &FieldUpdateSet) -> EmissionsRecord {
        for (category, value) in update.present() {
            if !value.is_finite() || value < 0.0 {
                warn!(
                    category = category.key(),
                    value, "merging suspicious emissions value"
                );
            }
            self.record.set(category, value);
        }
        self.revision += 1;
        info!(
            revision = self.revision,
            total = self.record.total(),
            "emissions state merged"
        );
        self.record
    }
}

impl Default for EmissionsState {
    fn default() -> Self {
        Self::new(EmissionsRecord::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;

    #[test]
    fn test_read_has_no_side_effects() {
        let state = EmissionsState::default();
        assert_eq!(state.read(), EmissionsRecord::DEFAULT);
        assert_eq!(state.read(), EmissionsRecord::DEFAULT);
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_merge_overwrites_present_fields_only() {
        let mut state = EmissionsState::default();
        let merged = state.merge(&FieldUpdateSet::new().energy(2.0));
        assert_eq!(merged.energy, 2.0);
        assert_eq!(merged.procurement, 1.0);
        assert_eq!(merged.waste, 0.7);
        assert_eq!(merged.transport, 0.4);
        assert_eq!(state.read(), merged);
        assert_eq!(state.revision(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let update = FieldUpdateSet::new().waste(0.9).transport(0.45);
        let mut once = EmissionsState::default();
        once.merge(&update);
        let mut twice = EmissionsState::default();
        twice.merge(&update);
        twice.merge(&update);
        assert_eq!(once.read(), twice.read());
    }

    #[test]
    fn test_merge_accepts_negative_and_nan() {
        let mut state = EmissionsState::default();
        let r = state.merge(
            &FieldUpdateSet::new()
                .with(Category::Waste, f64::NAN)
                .procurement(-1.0),
        );
        assert!(r.waste.is_nan());
        assert_eq!(r.procurement, -1.0);
        assert!(r.total().is_nan());
    }

    #[test]
    fn test_empty_update_keeps_record() {
        let mut state = EmissionsState::default();
        let r = state.merge(&FieldUpdateSet::new());
        assert_eq!(r, EmissionsRecord::DEFAULT);
        assert_eq!(state.revision(), 1);
    }
}
