//! Four-step import wizard: Upload → MapFields → Policy → Summary
//!
//! Owns the uploaded table, the working mapping and the chosen policy, and
//! refuses operations that do not belong to the current step.

use tracing::{debug, info};

use crate::error::{ParseError, WizardError};
use crate::services::csv_parser::{CsvParser, ParsedTable};
use crate::services::executor::ImportExecutor;
use crate::services::field_mapper::{self, FieldMapping};
use crate::services::report::ImportReport;
use crate::types::{find_field, FieldDef, ImportPolicy, LEAD_FIELDS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    Upload,
    MapFields,
    Policy,
    Summary,
}

impl WizardStep {
    /// 1-based position shown in the step indicator
    pub fn number(self) -> u8 {
        match self {
            Self::Upload => 1,
            Self::MapFields => 2,
            Self::Policy => 3,
            Self::Summary => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::MapFields => "Map Fields",
            Self::Policy => "Import Options",
            Self::Summary => "Summary",
        }
    }
}

pub struct ImportWizard {
    step: WizardStep,
    parser: CsvParser,
    filename: Option<String>,
    table: Option<ParsedTable>,
    mapping: FieldMapping,
    policy: ImportPolicy,
    report: Option<ImportReport>,
}

impl ImportWizard {
    pub fn new(parser: CsvParser) -> Self {
        Self {
            step: WizardStep::Upload,
            parser,
            filename: None,
            table: None,
            mapping: FieldMapping::new(),
            policy: ImportPolicy::default(),
            report: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn table(&self) -> Option<&ParsedTable> {
        self.table.as_ref()
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn report(&self) -> Option<&ImportReport> {
        self.report.as_ref()
    }

    fn ensure_step(&self, expected: WizardStep, operation: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                operation,
                step: self.step.title(),
            })
        }
    }

    /// Parse the chosen file and seed the mapping from its headers.
    ///
    /// Any previous file and mapping are discarded first, so a parse failure
    /// leaves the wizard on the upload step with nothing loaded.
    pub fn upload(&mut self, filename: &str, bytes: &[u8]) -> Result<&ParsedTable, WizardError> {
        self.ensure_step(WizardStep::Upload, "upload")?;

        self.table = None;
        self.filename = None;
        self.mapping.reset();

        let table = self.parser.parse(bytes).map_err(|e: ParseError| {
            debug!("Upload of '{}' rejected: {}", filename, e);
            WizardError::Parse(e)
        })?;

        info!(
            "Uploaded '{}': {} rows, {} columns",
            filename,
            table.len(),
            table.headers().len()
        );

        self.mapping = field_mapper::auto_map(table.headers(), LEAD_FIELDS);
        self.filename = Some(filename.to_string());
        self.step = WizardStep::MapFields;
        Ok(&*self.table.insert(table))
    }

    /// Bind `field` to a column, or unbind it with `None`
    pub fn set_mapping(&mut self, field: &str, header: Option<&str>) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::MapFields, "set_mapping")?;

        let def = find_field(LEAD_FIELDS, field).ok_or_else(|| WizardError::UnknownField(field.to_string()))?;
        if let Some(h) = header.filter(|h| !h.is_empty()) {
            let known = self.table.as_ref().is_some_and(|t| t.has_header(h));
            if !known {
                return Err(WizardError::UnknownHeader(h.to_string()));
            }
        }

        self.mapping.set(def.key, header.map(str::to_string));
        Ok(())
    }

    /// Forget manual choices and re-run the header heuristic
    pub fn reset_mapping(&mut self) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::MapFields, "reset_mapping")?;

        self.mapping.reset();
        if let Some(table) = &self.table {
            self.mapping.apply_auto_map(table.headers(), LEAD_FIELDS);
        }
        Ok(())
    }

    pub fn missing_required(&self) -> Vec<&'static FieldDef> {
        self.mapping.missing_required(LEAD_FIELDS)
    }

    /// Mapped values of the first data row
    pub fn preview(&self) -> Vec<(&'static str, String)> {
        match &self.table {
            Some(table) => field_mapper::preview(table, &self.mapping, LEAD_FIELDS),
            None => Vec::new(),
        }
    }

    /// Advance one step. Leaving the mapping step requires every required
    /// field to be mapped; the policy step is left only via `start_import`.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::Upload if self.table.is_some() => {
                self.step = WizardStep::MapFields;
            }
            WizardStep::MapFields => {
                self.mapping.require_complete(LEAD_FIELDS)?;
                self.step = WizardStep::Policy;
            }
            _ => {
                return Err(WizardError::WrongStep {
                    operation: "next",
                    step: self.step.title(),
                })
            }
        }
        Ok(self.step)
    }

    /// Step back without losing the uploaded table or mapping
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.step = match self.step {
            WizardStep::MapFields => WizardStep::Upload,
            WizardStep::Policy => WizardStep::MapFields,
            step => {
                return Err(WizardError::WrongStep {
                    operation: "back",
                    step: step.title(),
                })
            }
        };
        Ok(self.step)
    }

    pub fn set_policy(&mut self, policy: ImportPolicy) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::Policy, "set_policy")?;
        self.policy = policy;
        Ok(())
    }

    /// Run the import and move to the summary. There is no way back from
    /// the summary; a new import needs a new wizard.
    pub async fn start_import(&mut self, executor: &mut ImportExecutor) -> Result<&ImportReport, WizardError> {
        self.ensure_step(WizardStep::Policy, "start_import")?;

        let table = self.table.as_ref().ok_or(WizardError::WrongStep {
            operation: "start_import",
            step: self.step.title(),
        })?;
        let report = executor.run(table, &self.mapping, self.policy).await?;

        self.step = WizardStep::Summary;
        Ok(&*self.report.insert(report))
    }

    /// Text summary once the import has run
    pub fn summary(&self) -> Option<String> {
        self.report.as_ref().map(|r| r.render(self.filename()))
    }
}
