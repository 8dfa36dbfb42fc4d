#![forbid(unsafe_code)]

//! Carbon footprint core for small-business operational data.
//!
//! Evidence (energy bills, supplier invoices, waste weight, delivery mileage) is
//! turned into four category values in tCO2e by fixed linear rules, merged into a
//! session-owned record, and read back as a dashboard breakdown or a quarterly report.

pub mod config;
pub mod derive;
pub mod error;
pub mod export;
pub mod intake;
pub mod navigation;
pub mod process;
pub mod record;
pub mod session;
pub mod state;
pub mod view;

pub use config::{DelayConfig, FootprintConfig};
pub use derive::{DerivationInput, Deriver, EmissionFactors, NumericPolicy};
pub use error::FootprintError;
pub use export::{ExportedDocument, JsonReportExporter, ReportExporter};
pub use intake::EvidenceFile;
pub use navigation::View;
pub use process::{DelayedTask, ProcessPhase};
pub use record::{Category, EmissionsRecord, FieldUpdateSet};
pub use session::{ExportStatus, Session, SubmissionOutcome};
pub use state::EmissionsState;
pub use view::{percentage, DashboardView, QuarterlyReport};
