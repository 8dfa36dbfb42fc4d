#![forbid(unsafe_code)]

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::info;

use crate::config::FootprintConfig;
use crate::derive::{DerivationInput, Deriver};
use crate::error::FootprintError;
use crate::export::{ExportedDocument, JsonReportExporter, ReportExporter};
use crate::navigation::View;
use crate::process::{DelayedTask, ProcessPhase, TransientFlag};
use crate::record::{EmissionsRecord, FieldUpdateSet};
use crate::state::EmissionsState;
use crate::view::{DashboardView, QuarterlyReport};

/// Result of a successful data-entry submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub record: EmissionsRecord,
    pub next_view: View,
    #[serde(skip)]
    pub redirect_after: Duration,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Idle,
    Generating,
    Downloaded,
}

impl From<ProcessPhase> for ExportStatus {
    fn from(phase: ProcessPhase) -> Self {
        match phase {
            ProcessPhase::Idle => ExportStatus::Idle,
            ProcessPhase::Running => ExportStatus::Generating,
            ProcessPhase::Done => ExportStatus::Downloaded,
        }
    }
}

/// One user session: owns the emissions state and every path that reads or writes it.
pub struct Session<E: ReportExporter = JsonReportExporter> {
    state: EmissionsState,
    deriver: Deriver,
    config: FootprintConfig,
    processing: DelayedTask,
    exporting: DelayedTask,
    downloaded: TransientFlag,
    exporter: E,
    view: View,
}

impl Session<JsonReportExporter> {
    pub fn new(config: FootprintConfig) -> Self {
        Self::with_exporter(config, JsonReportExporter)
    }
}

impl<E: ReportExporter> Session<E> {
    pub fn with_exporter(config: FootprintConfig, exporter: E) -> Self {
        info!(
            exporter = exporter.exporter_type(),
            policy = ?config.numeric_policy,
            "starting footprint session"
        );
        Self {
            state: EmissionsState::new(config.defaults),
            deriver: Deriver::new(config.factors.clone(), config.numeric_policy),
            processing: DelayedTask::new(config.delays.processing()),
            exporting: DelayedTask::new(config.delays.export()),
            downloaded: TransientFlag::default(),
            exporter,
            view: View::Welcome,
            config,
        }
    }

    pub fn config(&self) -> &FootprintConfig {
        &self.config
    }

    pub fn record(&self) -> EmissionsRecord {
        self.state.read()
    }

    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    pub fn current_view(&self) -> View {
        self.view
    }

    pub fn navigate(&mut self, view: View) {
        self.view = view;
    }

    pub fn submission_phase(&self) -> ProcessPhase {
        self.processing.phase()
    }

    /// Derive a full record from the evidence and merge it, after the processing delay.
    /// A rejected submission leaves the state untouched.
    pub async fn submit(
        &mut self,
        input: &DerivationInput,
    ) -> Result<SubmissionOutcome, FootprintError> {
        let deriver = &self.deriver;
        let state = &mut self.state;
        let record = self
            .processing
            .try_run(async move {
                let derived = deriver.derive(input)?;
                Ok::<_, FootprintError>(state.merge(&FieldUpdateSet::from_record(&derived)))
            })
            .await?;

        Ok(SubmissionOutcome {
            record,
            next_view: View::Dashboard,
            redirect_after: self.config.delays.redirect(),
        })
    }

    /// Wait out the post-submit pause, then switch views.
    pub async fn follow(&mut self, outcome: &SubmissionOutcome) {
        sleep(outcome.redirect_after).await;
        self.processing.reset();
        self.navigate(outcome.next_view);
    }

    /// Direct partial update, bypassing the derivation rules.
    pub fn apply(&mut self, update: &FieldUpdateSet) -> EmissionsRecord {
        self.state.merge(update)
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::from_record(&self.state.read())
    }

    pub fn report(&self, today: NaiveDate) -> QuarterlyReport {
        QuarterlyReport::build(&self.state.read(), today)
    }

    /// Phase stream of the submission task, for a "Processing..." indicator.
    pub fn submission_progress(&self) -> watch::Receiver<ProcessPhase> {
        self.processing.subscribe()
    }

    /// Phase stream of the export task; map through `ExportStatus::from`.
    pub fn export_progress(&self) -> watch::Receiver<ProcessPhase> {
        self.exporting.subscribe()
    }

    pub fn export_status(&self) -> ExportStatus {
        match self.exporting.phase() {
            ProcessPhase::Running => ExportStatus::Generating,
            _ if self.downloaded.is_set() => ExportStatus::Downloaded,
            _ => ExportStatus::Idle,
        }
    }

    pub async fn export(&mut self, today: NaiveDate) -> Result<ExportedDocument, FootprintError> {
        let record = self.state.read();
        let exporter = &self.exporter;
        let doc = self
            .exporting
            .try_run(async move { exporter.export(&record, today).await })
            .await?;
        self.exporting.reset();
        self.downloaded
            .raise_for(self.config.delays.downloaded_flag());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelayConfig;
    use crate::derive::NumericPolicy;
    use crate::intake::EvidenceFile;
    use tokio::time::Instant;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_waits_and_merges() {
        let mut session = Session::new(FootprintConfig::default());
        let input = DerivationInput {
            energy_bill: Some(EvidenceFile::from_name("bill.jpg").unwrap()),
            waste_kg: "100".into(),
            ..Default::default()
        };
        let started = Instant::now();
        let outcome = session.submit(&input).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert_eq!(outcome.next_view, View::Dashboard);
        assert_eq!(outcome.redirect_after, Duration::from_millis(2000));
        assert_eq!(session.record(), outcome.record);
        assert_eq!(session.submission_phase(), ProcessPhase::Done);
        assert!((session.dashboard().total - 3.8).abs() < 1e-9);

        session.follow(&outcome).await;
        assert_eq!(session.current_view(), View::Dashboard);
        assert_eq!(session.submission_phase(), ProcessPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submit_keeps_state() {
        let mut session = Session::new(FootprintConfig::default());
        session.apply(&FieldUpdateSet::new().energy(2.5));
        let input = DerivationInput {
            mileage: "lots".into(),
            ..Default::default()
        };
        let err = session.submit(&input).await.unwrap_err();
        assert!(matches!(err, FootprintError::Derivation(_)));
        assert_eq!(session.submission_phase(), ProcessPhase::Idle);
        assert_eq!(session.record().energy, 2.5);
        assert_eq!(session.revision(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generating_visible_during_export_delay() {
        let mut session = Session::new(FootprintConfig::default());
        let mut progress = session.export_progress();
        {
            let export = session.export(today());
            tokio::pin!(export);

            tokio::select! {
                _ = &mut export => panic!("export finished before its delay"),
                _ = progress.changed() => {}
            }
            assert_eq!(ExportStatus::from(*progress.borrow()), ExportStatus::Generating);
            export.await.unwrap();
        }
        assert_eq!(session.export_status(), ExportStatus::Downloaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_propagate_policy_keeps_nan() {
        let config = FootprintConfig {
            numeric_policy: NumericPolicy::Propagate,
            delays: DelayConfig::immediate(),
            ..FootprintConfig::default()
        };
        let mut session = Session::new(config);
        let outcome = session
            .submit(&DerivationInput {
                waste_kg: "abc".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(outcome.record.waste.is_nan());
        assert!(session.dashboard().total.is_nan());
        assert!(session.export(today()).await.is_err());
        assert_eq!(session.export_status(), ExportStatus::Idle);
        assert_eq!(*session.export_progress().borrow(), ProcessPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_status_cycle() {
        let mut session = Session::new(FootprintConfig::default());
        assert_eq!(session.export_status(), ExportStatus::Idle);

        let doc = session.export(today()).await.unwrap();
        assert_eq!(doc.file_name, "emissions-report-2026-Q1.json");
        assert_eq!(session.export_status(), ExportStatus::Downloaded);

        tokio::time::advance(Duration::from_millis(3000)).await;
        assert_eq!(session.export_status(), ExportStatus::Idle);
    }
}
