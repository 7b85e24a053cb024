use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to decode content: {0}")]
    Decode(String),

    #[error("No releases published for {0}")]
    NoReleases(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("Malformed manifest: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("Manifest {id} declares version {declared} but release {tag} provides {expected}")]
    VersionMismatch {
        id: String,
        declared: String,
        expected: String,
        tag: String,
    },

    #[error("Manifest id {id} is already provided by {owner}")]
    DuplicateId { id: String, owner: String },
}

/// Failure of a single project during aggregation
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

impl ProjectError {
    /// Short category name used in logs and reload reports
    pub fn kind(&self) -> &'static str {
        match self {
            ProjectError::Fetch(_) => "fetch",
            ProjectError::Template(_) => "template",
            ProjectError::Integrity(_) => "integrity",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render index: {0}")]
    Render(String),
}
