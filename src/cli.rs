//! CLI argument parsing for the lead-importer binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lead_importer::types::{AssignTo, DuplicateAction};

#[derive(Parser)]
#[command(name = "lead-importer", about = "Bulk lead import from CSV files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a file and show its columns, the suggested mapping and a preview
    Inspect {
        file: PathBuf,

        /// Column delimiter (detected when omitted)
        #[arg(long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,
    },
    /// Import every row of a file into the lead service
    Run {
        file: PathBuf,

        /// Column delimiter (detected when omitted)
        #[arg(long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,

        /// Override the suggested mapping, e.g. `--map email="E-mail"`; an
        /// empty header ignores the field
        #[arg(long = "map", value_parser = parse_mapping)]
        mappings: Vec<MappingOverride>,

        /// What the lead service should do with duplicates
        #[arg(long, default_value_t = DuplicateAction::Skip)]
        duplicate_action: DuplicateAction,

        /// current-user, unassigned or a user id
        #[arg(long, default_value_t = AssignTo::CurrentUser)]
        assign: AssignTo,

        /// Log the leads instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Also write the report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List the lead fields a column can be mapped to
    Fields,
}

/// `field=Header` from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOverride {
    pub field: String,
    pub header: Option<String>,
}

fn parse_mapping(s: &str) -> Result<MappingOverride, String> {
    let (field, header) = s
        .split_once('=')
        .ok_or_else(|| format!("expected field=Header, got '{}'", s))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }
    let header = header.trim();
    Ok(MappingOverride {
        field: field.to_string(),
        header: (!header.is_empty()).then(|| header.to_string()),
    })
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() && *b != b'"' => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got '{}'", s)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_fields_command_parses() {
        let cli = Cli::parse_from(["lead-importer", "fields"]);
        assert!(matches!(cli.command, Command::Fields));
    }

    #[test]
    fn test_cli_inspect_with_delimiter() {
        let cli = Cli::parse_from(["lead-importer", "inspect", "leads.csv", "--delimiter", ";"]);
        match cli.command {
            Command::Inspect { file, delimiter } => {
                assert_eq!(file, PathBuf::from("leads.csv"));
                assert_eq!(delimiter, Some(b';'));
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_cli_run_defaults() {
        let cli = Cli::parse_from(["lead-importer", "run", "leads.csv"]);
        match cli.command {
            Command::Run {
                mappings,
                duplicate_action,
                assign,
                dry_run,
                report,
                ..
            } => {
                assert!(mappings.is_empty());
                assert_eq!(duplicate_action, DuplicateAction::Skip);
                assert_eq!(assign, AssignTo::CurrentUser);
                assert!(!dry_run);
                assert!(report.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_run_with_options() {
        let cli = Cli::parse_from([
            "lead-importer",
            "run",
            "leads.csv",
            "--map",
            "email=E-mail",
            "--map",
            "phone=",
            "--duplicate-action",
            "update",
            "--assign",
            "17",
            "--dry-run",
        ]);
        match cli.command {
            Command::Run {
                mappings,
                duplicate_action,
                assign,
                dry_run,
                ..
            } => {
                assert_eq!(
                    mappings,
                    vec![
                        MappingOverride { field: "email".into(), header: Some("E-mail".into()) },
                        MappingOverride { field: "phone".into(), header: None },
                    ]
                );
                assert_eq!(duplicate_action, DuplicateAction::Update);
                assert_eq!(assign, AssignTo::User(17));
                assert!(dry_run);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["lead-importer", "run", "a.csv", "--map", "email"]).is_err());
        assert!(Cli::try_parse_from(["lead-importer", "run", "a.csv", "--duplicate-action", "merge"]).is_err());
        assert!(Cli::try_parse_from(["lead-importer", "inspect", "a.csv", "--delimiter", ";;"]).is_err());
    }

    #[test]
    fn test_parse_delimiter_accepts_tab_spellings() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
    }
}
