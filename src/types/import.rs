//! Import policy and progress types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the lead service should do when a lead already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicateAction {
    /// Do not import records whose email already exists
    #[default]
    Skip,
    /// Overwrite existing records with the imported data
    Update,
    /// Create new records even if they already exist
    Allow,
}

impl DuplicateAction {
    pub const ALL: [DuplicateAction; 3] = [DuplicateAction::Skip, DuplicateAction::Update, DuplicateAction::Allow];

    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateAction::Skip => "SKIP",
            DuplicateAction::Update => "UPDATE",
            DuplicateAction::Allow => "ALLOW",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DuplicateAction::Skip => "Skip duplicates",
            DuplicateAction::Update => "Update existing records",
            DuplicateAction::Allow => "Allow duplicates",
        }
    }
}

impl fmt::Display for DuplicateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicateAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(DuplicateAction::Skip),
            "update" => Ok(DuplicateAction::Update),
            "allow" => Ok(DuplicateAction::Allow),
            other => Err(format!(
                "unknown duplicate action '{}' (expected skip, update or allow)",
                other
            )),
        }
    }
}

/// Who imported leads are assigned to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignTo {
    /// The operator running the import
    #[default]
    CurrentUser,
    Unassigned,
    /// A specific user id
    User(i64),
}

impl fmt::Display for AssignTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignTo::CurrentUser => f.write_str("CURRENT_USER"),
            AssignTo::Unassigned => f.write_str("UNASSIGNED"),
            AssignTo::User(id) => write!(f, "user {}", id),
        }
    }
}

impl FromStr for AssignTo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "current-user" | "current_user" | "me" => Ok(AssignTo::CurrentUser),
            "unassigned" | "none" => Ok(AssignTo::Unassigned),
            _ => value.parse::<i64>().map(AssignTo::User).map_err(|_| {
                format!(
                    "invalid assignee '{}' (expected current-user, unassigned or a user id)",
                    s
                )
            }),
        }
    }
}

/// Operator choices for one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPolicy {
    pub duplicate_action: DuplicateAction,
    pub assign_to: AssignTo,
}

/// Lifecycle of the batch import executor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportState {
    #[default]
    Idle,
    Running,
    Done,
}

/// Snapshot published while a run is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults_to_skip_and_current_user() {
        let policy = ImportPolicy::default();
        assert_eq!(policy.duplicate_action, DuplicateAction::Skip);
        assert_eq!(policy.assign_to, AssignTo::CurrentUser);
    }

    #[test]
    fn test_duplicate_action_parses_case_insensitively() {
        assert_eq!("UPDATE".parse::<DuplicateAction>(), Ok(DuplicateAction::Update));
        assert_eq!(" allow ".parse::<DuplicateAction>(), Ok(DuplicateAction::Allow));
        assert!("merge".parse::<DuplicateAction>().is_err());
    }

    #[test]
    fn test_every_duplicate_action_has_a_description() {
        let described: Vec<&str> = DuplicateAction::ALL.iter().map(|a| a.description()).collect();
        assert_eq!(described, vec!["Skip duplicates", "Update existing records", "Allow duplicates"]);
    }

    #[test]
    fn test_duplicate_action_serializes_upper_case() {
        let json = serde_json::to_string(&DuplicateAction::Skip).unwrap();
        assert_eq!(json, "\"SKIP\"");
    }

    #[test]
    fn test_assign_to_parses_keywords_and_ids() {
        assert_eq!("current-user".parse::<AssignTo>(), Ok(AssignTo::CurrentUser));
        assert_eq!("Unassigned".parse::<AssignTo>(), Ok(AssignTo::Unassigned));
        assert_eq!("17".parse::<AssignTo>(), Ok(AssignTo::User(17)));
        assert!("someone".parse::<AssignTo>().is_err());
    }

    #[test]
    fn test_import_progress_serializes_to_camel_case() {
        let progress = ImportProgress { processed: 10, total: 20, succeeded: 9, failed: 1 };
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"processed\":10"));
        assert!(json.contains("\"succeeded\":9"));
    }
}
