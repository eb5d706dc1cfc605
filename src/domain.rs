use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use std::io::Error;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("field \"{field}\" is not declared in the schema")]
    UnknownField { field: String },
    #[error("field \"{field}\" is declared more than once")]
    DuplicateField { field: String },
    #[error("column \"{key}\" does not refer to a schema field")]
    UnknownColumn { key: String },
    #[error("rating value {0} is outside 1..=5")]
    InvalidRating(i64),
    #[error("rating \"{0}\" is not a whole number")]
    MalformedRating(String),
    #[error("required column \"{column}\" is missing")]
    MissingColumn { column: String },
    #[error("cannot parse date \"{0}\"")]
    InvalidDate(String),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type")]
    UnknownFileType,
}

/// Operator intents produced by the controller and consumed by `Model::update`.
#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    NextTab,
    PreviousTab,
    Search,
    FieldSearch(usize),
    CycleFilter,
    ClearFilter,
    ClearFilters,
    Sort,
    View,
    Edit,
    Delete,
    Rate,
    Star(u8),
    Enter,
    Exit,
    Help,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmdMode {
    Search,
    /// Index into the table's designated field searches
    FieldSearch(usize),
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct AppConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub recent_reviews: usize,
    #[setters(strip_option)]
    pub data_dir: Option<PathBuf>,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            recent_reviews: 3,
            data_dir: None,
            log_file: PathBuf::from("storerate.log"),
        }
    }
}

pub const HELP_TEXT: &str = "\
Tab / Shift-Tab  switch table
Arrows           move selection
PgUp / PgDown    move one page
Home / End       first / last row
/                search all columns
n / a            search store name / filter by address
c                clear all filters
f / F            cycle / clear category filter
s                sort by selected column (toggles direction)
v / e / d        view / edit / delete selected row
r                rate selected store
1-5              choose stars while rating
Enter            submit rating
Esc              cancel / close
?                this help
q                quit";
