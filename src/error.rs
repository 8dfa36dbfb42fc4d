use thiserror::Error;

use crate::config::ConfigError;
use crate::derive::DerivationError;
use crate::export::ExportError;
use crate::intake::IntakeError;
use crate::navigation::UnknownView;

/// Top-level error for session and CLI callers.
#[derive(Debug, Error)]
pub enum FootprintError {
    #[error("invalid submission: {0}")]
    Derivation(#[from] DerivationError),
    #[error("evidence rejected: {0}")]
    Intake(#[from] IntakeError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error(transparent)]
    Navigation(#[from] UnknownView),
}
