use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::record::{Category, EmissionsRecord};

pub const UNIT: &str = "tCO2e";

// ---- Static lookup tables -------------------------------------------------

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Energy => "Energy",
            Category::Procurement => "Procurement",
            Category::Waste => "Waste",
            Category::Transport => "Transport",
        }
    }

    /// Label used by the quarterly report, which names procurement by what is bought.
    pub fn report_label(self) -> &'static str {
        match self {
            Category::Procurement => "Food Procurement",
            other => other.label(),
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Energy => "#3BAA67",
            Category::Procurement => "#4ECDC4",
            Category::Waste => "#FFD166",
            Category::Transport => "#FF6B6B",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Energy => "zap",
            Category::Procurement => "shopping-bag",
            Category::Waste => "trash-2",
            Category::Transport => "truck",
        }
    }
}

// ---- Derivations ----------------------------------------------------------

/// Whole-number share of `total`, `round(value / total * 100)`.
///
/// A zero or non-finite total reports 0. A NaN value over a usable total stays NaN.
pub fn percentage(value: f64, total: f64) -> f64 {
    if total == 0.0 || !total.is_finite() {
        return 0.0;
    }
    (value / total * 100.0).round()
}

pub fn format_tonnes(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$} {UNIT}")
}

/// One slice of the breakdown, ready for a chart or a list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
    pub icon: &'static str,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub total: f64,
    pub shares: Vec<CategoryShare>,
}

impl DashboardView {
    pub fn from_record(record: &EmissionsRecord) -> Self {
        let total = record.total();
        let shares = record
            .entries()
            .map(|(category, value)| CategoryShare {
                category,
                label: category.label(),
                value,
                color: category.color(),
                icon: category.icon(),
                percent: percentage(value, total),
            })
            .collect();
        Self { total, shares }
    }

    pub fn render_text(&self) -> String {
        let mut out = format!(
            "Your Carbon Footprint This Month: {}\n",
            format_tonnes(self.total, 1)
        );
        for s in &self.shares {
            out.push_str(&format!(
                "  {:<12} {:>14} {:>4}%  {}\n",
                s.label,
                format_tonnes(s.value, 2),
                s.percent,
                s.color
            ));
        }
        out
    }
}

// ---- Quarterly report -----------------------------------------------------

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: &'static str,
    pub savings: f64,
    pub impact: Impact,
}

pub fn recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            title: "Switch to LED lighting",
            savings: 0.2,
            impact: Impact::High,
        },
        Recommendation {
            title: "Reduce food waste by 15%",
            savings: 0.1,
            impact: Impact::Medium,
        },
        Recommendation {
            title: "Optimize delivery routes",
            savings: 0.08,
            impact: Impact::Medium,
        },
    ]
}

/// Calendar quarter a report covers. `quarter` is always in 1..=4.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct ReportPeriod {
    year: i32,
    quarter: u32,
}

impl ReportPeriod {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: date.month0() / 3 + 1,
        }
    }

    /// `None` unless `quarter` is 1 to 4.
    pub fn new(year: i32, quarter: u32) -> Option<Self> {
        (1..=4)
            .contains(&quarter)
            .then_some(Self { year, quarter })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u32 {
        self.quarter
    }

    /// e.g. `Q1 2026 (Jan - Mar)`.
    pub fn label(&self) -> String {
        let first = (self.quarter - 1) * 3 + 1;
        let month = |m: u32| {
            NaiveDate::from_ymd_opt(self.year, m, 1)
                .map(|d| d.format("%b").to_string())
                .unwrap_or_default()
        };
        format!(
            "Q{} {} ({} - {})",
            self.quarter,
            self.year,
            month(first),
            month(first + 2)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub category: Category,
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterlyReport {
    pub period: ReportPeriod,
    pub period_label: String,
    pub rows: Vec<ReportRow>,
    pub total: f64,
    pub recommendations: Vec<Recommendation>,
}

impl QuarterlyReport {
    pub fn build(record: &EmissionsRecord, today: NaiveDate) -> Self {
        let period = ReportPeriod::containing(today);
        let rows = record
            .entries()
            .map(|(category, value)| ReportRow {
                category,
                label: category.report_label(),
                value,
                color: category.color(),
            })
            .collect();
        Self {
            period,
            period_label: period.label(),
            rows,
            total: record.total(),
            recommendations: recommendations(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = format!("Quarterly Emissions Report\n{}\n\n", self.period_label);
        for row in &self.rows {
            out.push_str(&format!(
                "  {:<18} {:>14}\n",
                row.label,
                format_tonnes(row.value, 2)
            ));
        }
        out.push_str(&format!("  {:<18} {:>14}\n\n", "Total", format_tonnes(self.total, 1)));
        out.push_str("Recommendations to Reduce Emissions\n");
        for rec in &self.recommendations {
            let impact = match rec.impact {
                Impact::High => "high",
                Impact::Medium => "medium",
            };
            out.push_str(&format!(
                "  - {} (save {}, impact: {})\n",
                rec.title,
                format_tonnes(rec.savings, 2),
                impact
            ));
        }
        out
    }
}
