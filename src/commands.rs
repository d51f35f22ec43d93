//! Subcommand implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use lead_importer::config::Config;
use lead_importer::services::csv_parser::CsvParser;
use lead_importer::services::executor::ImportExecutor;
use lead_importer::services::field_mapper;
use lead_importer::services::record_creator::{HttpRecordCreator, LogRecordCreator, RecordCreator};
use lead_importer::services::session::{SessionFile, SessionProvider, StaticSession};
use lead_importer::services::wizard::ImportWizard;
use lead_importer::types::{AssignTo, DuplicateAction, ImportPolicy, LEAD_FIELDS};

use crate::cli::MappingOverride;

/// Options of the `run` subcommand
pub struct RunOptions {
    pub delimiter: Option<u8>,
    pub mappings: Vec<MappingOverride>,
    pub duplicate_action: DuplicateAction,
    pub assign: AssignTo,
    pub dry_run: bool,
    pub report: Option<std::path::PathBuf>,
}

fn parser_for(delimiter: Option<u8>) -> CsvParser {
    match delimiter {
        Some(d) => CsvParser::with_delimiter(d),
        None => CsvParser::new(),
    }
}

fn read_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, bytes))
}

/// Lead fields and duplicate actions, as listed by `fields`
pub fn field_listing() -> String {
    let mut out = format!("{:<12} {:<12} Required\n", "Field", "Label");
    for field in LEAD_FIELDS {
        out.push_str(&format!(
            "{:<12} {:<12} {}\n",
            field.key,
            field.label,
            if field.required { "yes" } else { "no" }
        ));
    }

    out.push_str("\nDuplicate actions (--duplicate-action):\n");
    for action in DuplicateAction::ALL {
        out.push_str(&format!(
            "  {:<8} {}\n",
            action.as_str().to_lowercase(),
            action.description()
        ));
    }
    out
}

pub fn fields() {
    print!("{}", field_listing());
}

pub fn inspect(path: &Path, delimiter: Option<u8>) -> Result<()> {
    let (name, bytes) = read_file(path)?;
    let table = parser_for(delimiter)
        .parse(&bytes)
        .with_context(|| format!("Failed to parse {}", name))?;

    println!("File: {}", name);
    println!("Delimiter: {:?}", table.delimiter());
    println!("Columns: {}", table.headers().join(", "));
    if table.is_empty() {
        println!("Rows: 0 (header only)");
    } else {
        println!("Rows: {}", table.len());
    }
    if !table.ragged_rows().is_empty() {
        let rows: Vec<String> = table.ragged_rows().iter().map(|r| r.to_string()).collect();
        println!("Rows with a different column count: {}", rows.join(", "));
    }

    let mapping = field_mapper::auto_map(table.headers(), LEAD_FIELDS);
    println!("\nSuggested mapping:");
    for field in LEAD_FIELDS {
        let marker = if field.required { "*" } else { " " };
        println!(
            "  {}{:<12} <- {}",
            marker,
            field.label,
            mapping.header_for(field.key).unwrap_or("(not mapped)")
        );
    }

    if !field_mapper::validate(&mapping, LEAD_FIELDS) {
        let labels: Vec<&str> = mapping.missing_required(LEAD_FIELDS).iter().map(|f| f.label).collect();
        println!("\nRequired fields without a column: {}", labels.join(", "));
    }

    println!("\nPreview (first row):");
    for (label, value) in field_mapper::preview(&table, &mapping, LEAD_FIELDS) {
        println!("  {:<12} {}", label, value);
    }

    Ok(())
}

/// Session provider and the token it carries, if any
fn load_session(config: &Config) -> Result<(Arc<dyn SessionProvider>, Option<String>)> {
    if let Some(id) = config.current_user_id {
        info!("Using CURRENT_USER_ID={} as the current user", id);
        return Ok((Arc::new(StaticSession::with_id(id)), None));
    }

    match &config.session_file {
        Some(path) => {
            let session = SessionFile::load(path)?;
            info!("Using session from {}", session.path().display());
            let token = session.token().map(str::to_string);
            Ok((Arc::new(session), token))
        }
        None => Ok((Arc::new(StaticSession::anonymous()), None)),
    }
}

pub async fn run(config: &Config, path: &Path, options: RunOptions) -> Result<()> {
    let (name, bytes) = read_file(path)?;

    let mut wizard = ImportWizard::new(parser_for(options.delimiter));
    wizard
        .upload(&name, &bytes)
        .with_context(|| format!("Failed to parse {}", name))?;

    for (label, value) in wizard.preview() {
        debug!("Preview {}: {}", label, value);
    }

    for o in &options.mappings {
        wizard
            .set_mapping(&o.field, o.header.as_deref())
            .with_context(|| format!("Invalid mapping {}={}", o.field, o.header.as_deref().unwrap_or("")))?;
    }
    for (field, header) in wizard.mapping().iter() {
        let origin = if wizard.mapping().is_manual(field) { "manual" } else { "auto" };
        debug!("Mapping {} <- {} ({})", field, header, origin);
    }

    let missing = wizard.missing_required();
    if !missing.is_empty() {
        let labels: Vec<&str> = missing.iter().map(|f| f.label).collect();
        anyhow::bail!(
            "No column mapped to required field(s) {}; use --map field=Header",
            labels.join(", ")
        );
    }
    let step = wizard.next().context("Cannot start the import")?;
    debug!("Step {} of 4: {}", step.number(), step.title());

    wizard.set_policy(ImportPolicy {
        duplicate_action: options.duplicate_action,
        assign_to: options.assign,
    })?;

    let (session, session_token) = load_session(config)?;
    let creator: Arc<dyn RecordCreator> = if options.dry_run {
        Arc::new(LogRecordCreator)
    } else {
        let token = config.lead_api_token.clone().or(session_token);
        if token.is_none() {
            warn!("No API token configured, sending unauthenticated requests");
        }
        Arc::new(HttpRecordCreator::new(&config.lead_api_url, token, config.request_timeout)?)
    };

    let mut executor = ImportExecutor::new(creator, session).with_progress(|p| {
        info!("Processed {}/{} ({} imported, {} failed)", p.processed, p.total, p.succeeded, p.failed);
    });

    let report = wizard.start_import(&mut executor).await?.clone();

    if !report.is_clean() {
        warn!("{} of {} rows were not imported", report.failure_count, report.total_rows);
    }
    if let Some(summary) = wizard.summary() {
        print!("{}", summary);
    }
    if let Some(report_path) = &options.report {
        report.write_json(report_path)?;
        info!("Report written to {}", report_path.display());
    }

    Ok(())
}
