use thiserror::Error;

/// Central error type for the Pokédex client
#[derive(Error, Debug)]
pub enum PokedexError {
    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Failed to save to storage: {0}")]
    StorageSaveFailed(String),

    #[error("Failed to load from storage: {0}")]
    StorageLoadFailed(String),

    // ============================================================================
    // Remote Service Errors
    // ============================================================================
    /// The service answered with a non-success status. `message` is the
    /// `error` field of the response payload when one was sent.
    #[error("Remote service error ({status}): {}", .message.as_deref().unwrap_or("no error payload"))]
    Remote {
        status: u16,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response from remote service: {0}")]
    InvalidResponse(String),

    // ============================================================================
    // Catalog Errors
    // ============================================================================
    #[error("Pokémon not found: #{0}")]
    PokemonNotFound(u32),

    #[error("A selection change for Pokémon #{0} is already in flight")]
    MutationInFlight(u32),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Builder pattern validation error
    #[error("Builder error: {0}")]
    BuilderError(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mutex lock error")]
    LockError,

    #[error("{0}")]
    GenericError(String),
}

impl PokedexError {
    /// Message to show the user for a failed read.
    ///
    /// Remote failures that carried an `error` payload show that payload
    /// verbatim; everything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PokedexError::Remote {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

// Implement conversion from PoisonError for Mutex locks
impl<T> From<std::sync::PoisonError<T>> for PokedexError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        PokedexError::LockError
    }
}

// Transport and decode failures from the HTTP client
impl From<reqwest::Error> for PokedexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PokedexError::InvalidResponse(err.to_string())
        } else {
            PokedexError::NetworkError(err.to_string())
        }
    }
}

impl From<url::ParseError> for PokedexError {
    fn from(err: url::ParseError) -> Self {
        PokedexError::ConfigError(format!("Invalid URL: {}", err))
    }
}

// Implement conversion to String for the command surface
impl From<PokedexError> for String {
    fn from(error: PokedexError) -> Self {
        error.to_string()
    }
}

impl From<String> for PokedexError {
    fn from(err: String) -> Self {
        PokedexError::GenericError(err)
    }
}

impl From<&str> for PokedexError {
    fn from(err: &str) -> Self {
        PokedexError::GenericError(err.to_string())
    }
}

// Helper type alias for Results
pub type PokedexResult<T> = Result<T, PokedexError>;
