#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::intake::EvidenceFile;
use crate::record::{Category, EmissionsRecord};

/// Raw evidence from one data-entry submission. Never stored.
#[derive(Debug, Clone, Default)]
pub struct DerivationInput {
    pub energy_bill: Option<EvidenceFile>,
    pub invoice: Option<EvidenceFile>,
    /// Waste weight in kilograms, as typed.
    pub waste_kg: String,
    /// Delivery mileage in miles, as typed.
    pub mileage: String,
}

/// Fixed coefficients of the derivation rules, in tCO2e.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionFactors {
    pub energy_with_bill: f64,
    pub energy_baseline: f64,
    pub procurement_with_invoice: f64,
    pub procurement_baseline: f64,
    /// tCO2e per kg of waste.
    pub waste_per_kg: f64,
    pub waste_baseline: f64,
    /// tCO2e per delivery mile.
    pub transport_per_mile: f64,
    pub transport_baseline: f64,
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self {
            energy_with_bill: 1.6,
            energy_baseline: 1.4,
            procurement_with_invoice: 1.2,
            procurement_baseline: 1.0,
            waste_per_kg: 0.001,
            waste_baseline: 0.7,
            transport_per_mile: 0.0002,
            transport_baseline: 0.4,
        }
    }
}

/// What to do with numeric text that is not a usable quantity.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Unparseable text becomes NaN and flows into the category and the total.
    Propagate,
    /// Unparseable, non-finite or negative text fails the submission.
    #[default]
    Reject,
    /// Unparseable or non-finite text counts as zero; negatives clamp to zero.
    Clamp,
}

#[derive(Debug, Error, PartialEq)]
pub enum DerivationError {
    #[error("{field}: not a number: {text:?}")]
    InvalidNumber { field: Category, text: String },
    #[error("{field}: quantity must not be negative (got {value})")]
    Negative { field: Category, value: f64 },
}

/// Decimal text to f64. NaN when the trimmed text is not a number.
pub fn parse_quantity(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Applies the derivation rules to one submission.
#[derive(Debug, Clone, Default)]
pub struct Deriver {
    pub factors: EmissionFactors,
    pub policy: NumericPolicy,
}

impl Deriver {
    pub fn new(factors: EmissionFactors, policy: NumericPolicy) -> Self {
        Self { factors, policy }
    }

    /// Full record for a submission; every category is always filled.
    pub fn derive(&self, input: &DerivationInput) -> Result<EmissionsRecord, DerivationError> {
        let f = &self.factors;
        let energy = if input.energy_bill.is_some() {
            f.energy_with_bill
        } else {
            f.energy_baseline
        };
        let procurement = if input.invoice.is_some() {
            f.procurement_with_invoice
        } else {
            f.procurement_baseline
        };
        let waste = match self.quantity(Category::Waste, &input.waste_kg)? {
            Some(kg) => kg * f.waste_per_kg + f.waste_baseline,
            None => f.waste_baseline,
        };
        let transport = match self.quantity(Category::Transport, &input.mileage)? {
            Some(miles) => miles * f.transport_per_mile + f.transport_baseline,
            None => f.transport_baseline,
        };

        let record = EmissionsRecord {
            energy,
            procurement,
            waste,
            transport,
        };
        debug!(
            energy_bill = input.energy_bill.as_ref().map(|b| b.display_name()),
            invoice = input.invoice.as_ref().map(|i| i.display_name()),
            total = record.total(),
            "derived emissions record"
        );
        Ok(record)
    }

    /// `None` when the field was left empty.
    fn quantity(&self, field: Category, text: &str) -> Result<Option<f64>, DerivationError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let value = parse_quantity(text);
        match self.policy {
            NumericPolicy::Propagate => Ok(Some(value)),
            NumericPolicy::Reject => {
                if !value.is_finite() {
                    Err(DerivationError::InvalidNumber {
                        field,
                        text: text.to_string(),
                    })
                } else if value < 0.0 {
                    Err(DerivationError::Negative { field, value })
                } else {
                    Ok(Some(value))
                }
            }
            NumericPolicy::Clamp => {
                if value.is_finite() {
                    Ok(Some(value.max(0.0)))
                } else {
                    Ok(Some(0.0))
                }
            }
        }
    }
}
