use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("unparseable timestamp `{value}`")]
    Parse { value: String },
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl ListingError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Store(_) => "store",
        }
    }

    /// Message safe to show to the person who submitted the request. Store
    /// failures never leak driver details.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse { .. } | Self::Validation { .. } => self.to_string(),
            Self::NotFound { kind, .. } => format!("That {kind} does not exist."),
            Self::Store(_) => "The listing was unsuccessful. Please try again.".to_string(),
        }
    }
}
