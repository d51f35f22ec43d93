/// Lead `source` when no column is mapped to it
pub const DEFAULT_SOURCE: &str = "IMPORT";

/// Lead `status` when no column is mapped to it
pub const DEFAULT_STATUS: &str = "NEW";

pub const DEFAULT_SCORE: i32 = 0;

/// Shown in the mapping preview for cells that resolve to nothing
pub const EMPTY_PREVIEW: &str = "(empty)";

/// How often (in rows) the executor reports progress
pub const PROGRESS_EVERY_ROWS: usize = 10;
