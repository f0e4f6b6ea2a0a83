//! Behavior switches for the writer and reader.

/// What [`Scanner::scan`](crate::Scanner::scan) does when several targets
/// map the same result column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateColumns {
    /// The first target claiming the column receives it.
    #[default]
    FirstWins,
    /// The last target claiming the column receives it.
    LastWins,
    /// Fail with [`CrudError::DuplicateColumn`](crate::CrudError::DuplicateColumn).
    Error,
}

/// Configuration shared by [`Writer`](crate::Writer) and [`Scanner`](crate::Scanner).
///
/// By default mismatches between result columns and mapped fields are
/// skipped silently.
#[derive(Debug, Clone)]
pub struct CrudConfig {
    /// Fail instead of skipping unmapped columns / unmatched fields.
    pub strict: bool,
    /// Policy for a column mapped by more than one scan target.
    pub duplicate_columns: DuplicateColumns,
    /// Truncate SQL in log events (in bytes). `None` means no truncation.
    pub max_sql_log_length: Option<usize>,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            strict: false,
            duplicate_columns: DuplicateColumns::default(),
            max_sql_log_length: Some(200),
        }
    }
}

impl CrudConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict column matching when scanning.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Set the duplicate column policy.
    pub fn with_duplicate_columns(mut self, policy: DuplicateColumns) -> Self {
        self.duplicate_columns = policy;
        self
    }

    /// Set maximum SQL length to log.
    pub fn with_max_sql_log_length(mut self, len: usize) -> Self {
        self.max_sql_log_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_log_length = None;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_log_length {
            Some(max) if sql.len() > max => {
                let mut end = max;
                while !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end]).into()
            }
            _ => sql.into(),
        }
    }
}
