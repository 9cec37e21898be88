//! Error types for snapshot construction and parsing.

/// Errors raised while building or loading schema snapshots.
///
/// Diffing itself never fails; these only surface at the input boundary.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A foreign key was declared without any columns.
    #[error("Foreign key declares no columns")]
    EmptyColumns,

    /// The local and referred column lists have different lengths.
    #[error(
        "Foreign key pairs {constrained} constrained column(s) with {referred} referred column(s)"
    )]
    ColumnCountMismatch {
        /// Number of local columns.
        constrained: usize,
        /// Number of referred columns.
        referred: usize,
    },

    /// A reference is not of the form `table.column`.
    #[error("Malformed reference '{0}', expected 'table.column'")]
    MalformedReference(String),

    /// References of a single constraint point at different tables.
    #[error("Foreign key refers to both '{first}' and '{other}'")]
    MixedReferredTables {
        /// Table named by the first reference.
        first: String,
        /// Conflicting table named by a later reference.
        other: String,
    },

    /// The same table name appears twice in one snapshot.
    #[error("Table '{0}' is declared more than once")]
    DuplicateTable(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
