//! Batch lead import executor
//!
//! Walks the parsed rows strictly in file order, one at a time: builds a lead
//! from the current mapping, rejects rows missing required values, and hands
//! the rest to the [`RecordCreator`]. A failing row is recorded and skipped;
//! it never stops the run.
//!
//! ## States
//! `Idle` → `Running` (mapping accepted) → `Done` (after the last row).
//! There is no cancel transition.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::defaults::{DEFAULT_SCORE, DEFAULT_SOURCE, DEFAULT_STATUS, PROGRESS_EVERY_ROWS};
use crate::error::{MappingIncomplete, RowError, RowValidationError};
use crate::services::csv_parser::{ParsedTable, Row};
use crate::services::field_mapper::FieldMapping;
use crate::services::record_creator::RecordCreator;
use crate::services::report::ImportReport;
use crate::services::session::SessionProvider;
use crate::types::{
    AssignTo, CreateLeadRequest, FieldDef, ImportPolicy, ImportProgress, ImportState, LEAD_FIELDS,
};

/// Callback receiving progress snapshots during a run
pub type ProgressObserver = Box<dyn Fn(ImportProgress) + Send + Sync>;

// =============================================================================
// IMPORT RUN
// =============================================================================

/// Tally of the run in progress; owned by the executor until it finishes
#[derive(Debug)]
pub struct ImportRun {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    clock: Instant,
    total_rows: usize,
    success_count: usize,
    failure_count: usize,
    errors: Vec<String>,
}

impl ImportRun {
    fn start(total_rows: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            clock: Instant::now(),
            total_rows,
            success_count: 0,
            failure_count: 0,
            errors: Vec::new(),
        }
    }

    fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// `row_number` is the 1-based position of the row in the file's data rows
    fn record_failure(&mut self, row_number: usize, error: &RowError) {
        self.failure_count += 1;
        self.errors.push(format!("Row {}: {}", row_number, error));
    }

    fn progress(&self, processed: usize) -> ImportProgress {
        ImportProgress {
            processed,
            total: self.total_rows,
            succeeded: self.success_count,
            failed: self.failure_count,
        }
    }

    fn finish(self) -> ImportReport {
        ImportReport {
            run_id: self.run_id,
            total_rows: self.total_rows,
            success_count: self.success_count,
            failure_count: self.failure_count,
            errors: self.errors,
            started_at: self.started_at,
            completed_at: Utc::now(),
            duration_ms: self.clock.elapsed().as_millis() as u64,
        }
    }
}

// =============================================================================
// EXECUTOR
// =============================================================================

pub struct ImportExecutor {
    creator: Arc<dyn RecordCreator>,
    session: Arc<dyn SessionProvider>,
    state: ImportState,
    on_progress: Option<ProgressObserver>,
}

impl ImportExecutor {
    pub fn new(creator: Arc<dyn RecordCreator>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            creator,
            session,
            state: ImportState::Idle,
            on_progress: None,
        }
    }

    /// Receive a snapshot every few rows and after the last row
    pub fn with_progress(mut self, observer: impl Fn(ImportProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Import every row of `table`.
    ///
    /// Fails only when a required field is unmapped, before any row is
    /// touched. Otherwise always reaches `Done` with every row counted once.
    pub async fn run(
        &mut self,
        table: &ParsedTable,
        mapping: &FieldMapping,
        policy: ImportPolicy,
    ) -> Result<ImportReport, MappingIncomplete> {
        mapping.require_complete(LEAD_FIELDS)?;

        self.state = ImportState::Running;
        let mut run = ImportRun::start(table.len());
        let assigned_to = self.resolve_assignee(policy.assign_to);

        info!(
            run_id = %run.run_id,
            rows = table.len(),
            creator = self.creator.name(),
            duplicate_action = %policy.duplicate_action,
            assign_to = %policy.assign_to,
            "Starting lead import"
        );

        for (idx, row) in table.rows().enumerate() {
            let row_number = idx + 1;

            match self.import_row(row, mapping, policy, assigned_to).await {
                Ok(()) => run.record_success(),
                Err(e) => {
                    debug!("Row {} rejected: {}", row_number, e);
                    run.record_failure(row_number, &e);
                }
            }

            if row_number % PROGRESS_EVERY_ROWS == 0 || row_number == run.total_rows {
                let progress = run.progress(row_number);
                debug!(
                    "Import progress: {}/{} ({} ok, {} failed)",
                    progress.processed, progress.total, progress.succeeded, progress.failed
                );
                if let Some(observer) = &self.on_progress {
                    observer(progress);
                }
            }
        }

        let report = run.finish();
        self.state = ImportState::Done;

        info!(
            run_id = %report.run_id,
            "Lead import completed in {}ms: {}/{} imported, {} failed",
            report.duration_ms,
            report.success_count,
            report.total_rows,
            report.failure_count
        );

        Ok(report)
    }

    async fn import_row(
        &self,
        row: Row<'_>,
        mapping: &FieldMapping,
        policy: ImportPolicy,
        assigned_to: Option<i64>,
    ) -> Result<(), RowError> {
        let lead = build_lead(row, mapping, assigned_to);
        validate_required(&lead, LEAD_FIELDS)?;
        self.creator
            .create_record(&lead, policy.duplicate_action)
            .await?;
        Ok(())
    }

    fn resolve_assignee(&self, assign_to: AssignTo) -> Option<i64> {
        match assign_to {
            AssignTo::CurrentUser => {
                let user = self.session.current_user();
                if user.is_none() {
                    warn!("No current user in session, imported leads will be unassigned");
                }
                user.map(|u| u.id)
            }
            AssignTo::Unassigned => None,
            AssignTo::User(id) => Some(id),
        }
    }
}

/// Candidate lead for one row, cells sent as written; unmapped fields take
/// their defaults
pub fn build_lead(row: Row<'_>, mapping: &FieldMapping, assigned_to: Option<i64>) -> CreateLeadRequest {
    let cell = |field: &str| {
        mapping
            .header_for(field)
            .map(|header| row.get(header).to_string())
    };

    CreateLeadRequest {
        first_name: cell("firstName").unwrap_or_default(),
        last_name: cell("lastName").unwrap_or_default(),
        email: cell("email").unwrap_or_default(),
        phone: cell("phone").unwrap_or_default(),
        company: cell("company").unwrap_or_default(),
        source: cell("source").unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        status: cell("status").unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        score: DEFAULT_SCORE,
        assigned_to,
    }
}

/// Every required field must carry a value that is not just whitespace
pub fn validate_required(lead: &CreateLeadRequest, fields: &[FieldDef]) -> Result<(), RowValidationError> {
    let labels: Vec<String> = fields
        .iter()
        .filter(|f| f.required && lead.field(f.key).map_or(true, |v| v.trim().is_empty()))
        .map(|f| f.label.to_string())
        .collect();

    if labels.is_empty() {
        Ok(())
    } else {
        Err(RowValidationError { labels })
    }
}
