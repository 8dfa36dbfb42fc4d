use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::record::EmissionsRecord;
use crate::view::QuarterlyReport;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("refusing to export a report with non-finite values (total {total})")]
    NonFinite { total: f64 },
}

/// A generated report document, ready to hand to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedDocument {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub file_name: String,
    pub content_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Produces a downloadable document from the current emissions record.
#[async_trait]
pub trait ReportExporter: Send + Sync {
    async fn export(
        &self,
        record: &EmissionsRecord,
        today: NaiveDate,
    ) -> Result<ExportedDocument, ExportError>;

    fn exporter_type(&self) -> &'static str;
}

/// Writes the quarterly report as pretty-printed JSON. Placeholder for the PDF generator.
#[derive(Debug, Clone, Default)]
pub struct JsonReportExporter;

#[async_trait]
impl ReportExporter for JsonReportExporter {
    async fn export(
        &self,
        record: &EmissionsRecord,
        today: NaiveDate,
    ) -> Result<ExportedDocument, ExportError> {
        if !record.is_finite() {
            return Err(ExportError::NonFinite {
                total: record.total(),
            });
        }
        let report = QuarterlyReport::build(record, today);
        let bytes = serde_json::to_vec_pretty(&report)?;
        let doc = ExportedDocument {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            file_name: format!(
                "emissions-report-{}-Q{}.json",
                report.period.year(),
                report.period.quarter()
            ),
            content_type: "application/json",
            bytes,
        };
        info!(
            id = %doc.id,
            file = %doc.file_name,
            size = doc.bytes.len(),
            "report exported"
        );
        Ok(doc)
    }

    fn exporter_type(&self) -> &'static str {
        "JsonReportExporter"
    }
}
