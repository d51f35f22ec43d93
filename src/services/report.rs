//! Import summary presented to the operator once a run is done

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Final tally of one import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub run_id: Uuid,
    pub total_rows: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// `Row {k}: {reason}` per failed row, in row order
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failure_count == 0
    }

    /// Plain-text summary; every row error is listed
    pub fn render(&self, filename: Option<&str>) -> String {
        let mut report = match filename {
            Some(name) => format!("Lead import from '{}'\n", name),
            None => "Lead import\n".to_string(),
        };
        report.push_str(&format!("Total rows: {}\n", self.total_rows));
        report.push_str(&format!("Imported: {}\n", self.success_count));
        report.push_str(&format!("Failed: {}\n", self.failure_count));
        report.push_str(&format!("Duration: {} ms\n", self.duration_ms));

        if !self.errors.is_empty() {
            report.push_str("\nErrors:\n");
            for (i, err) in self.errors.iter().enumerate() {
                report.push_str(&format!("{}. {}\n", i + 1, err));
            }
        }

        report
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize import report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write import report to {}", path.display()))
    }
}
