use thiserror::Error;

/// Result type alias for analytics operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by the analytics engine
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Requested team id has no stored record
    #[error("team {0} not found")]
    TeamNotFound(i64),

    /// No category has a single decided outcome in the league
    #[error("no threshold data available; need at least one completed week")]
    InsufficientData,

    /// The outcome store failed to answer a query
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
