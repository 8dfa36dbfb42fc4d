use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown view: {0}")]
pub struct UnknownView(pub String);

/// The four addressable views.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Welcome,
    Dashboard,
    AddData,
    Report,
}

impl View {
    pub const ALL: [View; 4] = [View::Welcome, View::Dashboard, View::AddData, View::Report];

    pub fn name(self) -> &'static str {
        match self {
            View::Welcome => "welcome",
            View::Dashboard => "dashboard",
            View::AddData => "add-data",
            View::Report => "report",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            View::Welcome => "/",
            View::Dashboard => "/dashboard",
            View::AddData => "/add-data",
            View::Report => "/report",
        }
    }

    /// Whether the view is handed the current emissions record.
    pub fn needs_record(self) -> bool {
        !matches!(self, View::Welcome)
    }
}

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|v| v.name() == s || v.path() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_name_or_path() {
        assert_eq!("add-data".parse::<View>().unwrap(), View::AddData);
        assert_eq!("/report".parse::<View>().unwrap(), View::Report);
        assert_eq!("/".parse::<View>().unwrap(), View::Welcome);
        assert!("settings".parse::<View>().is_err());
    }

    #[test]
    fn test_record_requirements() {
        assert!(!View::Welcome.needs_record());
        assert!(View::AddData.needs_record());
        assert!(View::Report.needs_record());
        assert!(View::Dashboard.needs_record());
    }
}
