use thiserror::Error;

#[derive(Error, Debug)]
pub enum StepperError {
    #[error("`{command}` failed: {output}")]
    ExternalTool { command: String, output: String },

    #[error("Failed to execute `{command}`: {reason}")]
    ProcessSpawn { command: String, reason: String },

    #[error("invalid package: {0}: should contain at least 3 parts separated by '/' character")]
    InvalidPackage(String),

    #[error("multiple root packages detected: {0}, {1}")]
    MultipleRootPackages(String, String),

    #[error("unknown category for dep: {0}")]
    UnknownCategory(String),

    #[error("{0}")]
    MissingPrecondition(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid git URL '{url}': {reason}")]
    InvalidGitUrl { url: String, reason: String },

    #[error("no version found for: {0}")]
    MissingVersion(String),

    #[error("Version resolution failed: {0}")]
    VersionResolution(String),

    #[error("Release fetch failed: {0}")]
    ReleaseFetch(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Invalid date '{input}': {reason}")]
    DateParse { input: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StepperError>;
