use miette::Diagnostic;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum HarvestError {
    #[error("Could not read {path}: {source}")]
    #[diagnostic(code(apiharvest::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog {path}: {message}")]
    #[diagnostic(code(apiharvest::catalog))]
    Catalog { path: PathBuf, message: String },

    #[error("Compilation failed: {message}\n{diagnostics}")]
    #[diagnostic(code(apiharvest::compile))]
    Compile {
        message: String,
        diagnostics: String,
    },

    #[error("Compiler did not finish within {}s", .timeout.as_secs())]
    #[diagnostic(code(apiharvest::timeout))]
    Timeout { timeout: Duration },

    #[error("No physical file matches logical path {logical}")]
    #[diagnostic(code(apiharvest::not_found))]
    NotFound { logical: String },

    #[error("Could not write {path}: {source}")]
    #[diagnostic(code(apiharvest::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(apiharvest::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(apiharvest::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(apiharvest::git))]
    Git(#[from] git2::Error),

    #[error(transparent)]
    #[diagnostic(code(apiharvest::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    #[diagnostic(code(apiharvest::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(apiharvest::glob))]
    Glob(#[from] globset::Error),
}

impl HarvestError {
    pub fn compile(message: impl Into<String>) -> Self {
        HarvestError::Compile {
            message: message.into(),
            diagnostics: String::new(),
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
