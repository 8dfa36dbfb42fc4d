#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four emission categories, in dashboard display order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Energy,
    Procurement,
    Waste,
    Transport,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Energy,
        Category::Procurement,
        Category::Waste,
        Category::Transport,
    ];

    /// Field name as it appears in config and JSON output.
    pub fn key(self) -> &'static str {
        match self {
            Category::Energy => "energy",
            Category::Procurement => "procurement",
            Category::Waste => "waste",
            Category::Transport => "transport",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Point-in-time emissions snapshot, all values in tCO2e.
///
/// The total is never stored; it is recomputed from the four fields on every read.
/// Non-negativity is not enforced here; the derivation layer decides what reaches a record.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsRecord {
    pub energy: f64,
    pub procurement: f64,
    pub waste: f64,
    pub transport: f64,
}

impl EmissionsRecord {
    /// Session start values: 1.4 + 1.0 + 0.7 + 0.4 = 3.5 tCO2e.
    pub const DEFAULT: EmissionsRecord = EmissionsRecord {
        energy: 1.4,
        procurement: 1.0,
        waste: 0.7,
        transport: 0.4,
    };

    pub fn total(&self) -> f64 {
        self.energy + self.procurement + self.waste + self.transport
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Energy => self.energy,
            Category::Procurement => self.procurement,
            Category::Waste => self.waste,
            Category::Transport => self.transport,
        }
    }

    pub fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Energy => self.energy = value,
            Category::Procurement => self.procurement = value,
            Category::Waste => self.waste = value,
            Category::Transport => self.transport = value,
        }
    }

    /// True when no field is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_finite())
    }

    /// `(category, value)` pairs in display order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

impl Default for EmissionsRecord {
    fn default() -> Self {
        EmissionsRecord::DEFAULT
    }
}

/// Partial update with explicit per-field presence.
/// Absent fields leave the stored value untouched on merge.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdateSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procurement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<f64>,
}

impl FieldUpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field present, as produced by one data-entry submission.
    pub fn from_record(record: &EmissionsRecord) -> Self {
        FieldUpdateSet {
            energy: Some(record.energy),
            procurement: Some(record.procurement),
            waste: Some(record.waste),
            transport: Some(record.transport),
        }
    }

    pub fn energy(mut self, value: f64) -> Self {
        self.energy = Some(value);
        self
    }

    pub fn procurement(mut self, value: f64) -> Self {
        self.procurement = Some(value);
        self
    }

    pub fn waste(mut self, value: f64) -> Self {
        self.waste = Some(value);
        self
    }

    pub fn transport(mut self, value: f64) -> Self {
        self.transport = Some(value);
        self
    }

    pub fn with(mut self, category: Category, value: f64) -> Self {
        *self.slot_mut(category) = Some(value);
        self
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        match category {
            Category::Energy => self.energy,
            Category::Procurement => self.procurement,
            Category::Waste => self.waste,
            Category::Transport => self.transport,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_none())
    }

    /// Present fields only, in display order.
    pub fn present(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL
            .iter()
            .filter_map(move |c| self.get(*c).map(|v| (*c, v)))
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<f64> {
        match category {
            Category::Energy => &mut self.energy,
            Category::Procurement => &mut self.procurement,
            Category::Waste => &mut self.waste,
            Category::Transport => &mut self.transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_and_total() {
        let r = EmissionsRecord::default();
        assert_eq!(r.energy, 1.4);
        assert_eq!(r.procurement, 1.0);
        assert_eq!(r.waste, 0.7);
        assert_eq!(r.transport, 0.4);
        assert_eq!(r.total(), 1.4 + 1.0 + 0.7 + 0.4);
        assert!((r.total() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_get_set_by_category() {
        let mut r = EmissionsRecord::DEFAULT;
        r.set(Category::Waste, 2.25);
        assert_eq!(r.get(Category::Waste), 2.25);
        assert_eq!(r.get(Category::Energy), 1.4);

        let keys: Vec<&str> = r.entries().map(|(c, _)| c.key()).collect();
        assert_eq!(keys, vec!["energy", "procurement", "waste", "transport"]);
    }

    #[test]
    fn test_non_finite_detection() {
        let mut r = EmissionsRecord::DEFAULT;
        assert!(r.is_finite());
        r.transport = f64::NAN;
        assert!(!r.is_finite());
        assert!(r.total().is_nan());
    }

    #[test]
    fn test_update_set_presence() {
        let u = FieldUpdateSet::new();
        assert!(u.is_empty());

        let u = FieldUpdateSet::new().energy(1.6).with(Category::Transport, 0.5);
        assert!(!u.is_empty());
        assert_eq!(u.get(Category::Procurement), None);
        let present: Vec<(Category, f64)> = u.present().collect();
        assert_eq!(
            present,
            vec![(Category::Energy, 1.6), (Category::Transport, 0.5)]
        );

        let full = FieldUpdateSet::from_record(&EmissionsRecord::DEFAULT);
        assert_eq!(full.present().count(), 4);
    }

    #[test]
    fn test_update_set_json_omits_absent_fields() {
        let u = FieldUpdateSet::new().waste(0.8);
        let json = serde_json::to_string(&u).unwrap();
        assert_eq!(json, r#"{"waste":0.8}"#);

        let back: FieldUpdateSet = serde_json::from_str(r#"{"energy":1.6}"#).unwrap();
        assert_eq!(back, FieldUpdateSet::new().energy(1.6));
    }
}
