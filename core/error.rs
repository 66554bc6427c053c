use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("YAML Parsing Error: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: Path '{path}', Error: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Root Directory Not Accessible: Path '{path}', Error: {source}")]
    RootNotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse Error: {0}")]
    Parse(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Publish Error: {0}")]
    Publish(String),

    #[error("Generation cancelled")]
    Cancelled,
}
