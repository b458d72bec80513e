//! Batch RUL analysis report and CSV export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::source::EngineStatus;

/// Default file name for exported reports.
pub const DEFAULT_REPORT_FILE: &str = "rul_analysis_report.csv";

/// Fixed CSV header, one column per report field.
pub const CSV_HEADER: [&str; 7] = [
    "Engine ID",
    "Current Cycle",
    "Predicted RUL",
    "Est. Failure Cycle",
    "Status",
    "Failure Reason",
    "Confidence %",
];

/// One analyzed engine from an uploaded test file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub engine_id: u32,
    pub current_cycle: u64,
    #[serde(rename = "predicted_RUL")]
    pub predicted_rul: f64,
    pub estimated_failure_cycle: u64,
    pub status: EngineStatus,
    pub failure_reason: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Aggregate counts over a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportStats {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub healthy: usize,
    /// Mean predicted RUL, rounded to whole cycles.
    pub average_rul: f64,
}

/// Rows returned by the backend, in the order it sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Summary counts, or `None` for an empty report.
    pub fn stats(&self) -> Option<ReportStats> {
        if self.rows.is_empty() {
            return None;
        }

        let count = |status| self.rows.iter().filter(|r| r.status == status).count();
        let total_rul: f64 = self.rows.iter().map(|r| r.predicted_rul).sum();

        Some(ReportStats {
            total: self.rows.len(),
            critical: count(EngineStatus::Critical),
            warning: count(EngineStatus::Warning),
            healthy: count(EngineStatus::Healthy),
            average_rul: (total_rul / self.rows.len() as f64).round(),
        })
    }

    /// Write the report as CSV with the fixed 7-column header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for row in &self.rows {
            csv.write_record([
                row.engine_id.to_string(),
                row.current_cycle.to_string(),
                row.predicted_rul.to_string(),
                row.estimated_failure_cycle.to_string(),
                row.status.label().to_string(),
                row.failure_reason.clone(),
                row.confidence.to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Export the report to a CSV file.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_csv(file)?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "Exported report");
        Ok(())
    }
}
