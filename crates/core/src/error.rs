/// Errors raised while resolving configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not found. Set it in the environment or a .env file")]
    MissingApiKey,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised while loading a drug catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize YAML catalog: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("catalog must contain at least one drug")]
    Empty,
    #[error("catalog entry {index} has an empty {field}")]
    BlankField { index: usize, field: &'static str },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
