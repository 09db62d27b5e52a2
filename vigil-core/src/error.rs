use thiserror::Error;

pub type VigilResult<T> = Result<T, VigilError>;

#[derive(Error, Debug)]
pub enum VigilError {
    /// The component/vulnerability/project/policy-violation a request refers
    /// to does not exist. Raised by resource layers before invoking the
    /// engine; the engine itself assumes a valid subject handle.
    #[error("{what} could not be found")]
    SubjectNotResolvable { what: String },

    #[error("Audit store failure: {0}")]
    StoreFailure(String),

    /// Reserved for structural transition constraints. No transition is
    /// rejected today; any decision state may follow any other.
    #[error("Invalid decision transition: {from} → {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl VigilError {
    pub fn subject(what: impl Into<String>) -> Self {
        Self::SubjectNotResolvable { what: what.into() }
    }
}
