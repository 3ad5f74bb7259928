use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a print run. All variants are fatal: the run
/// either produces every session's document or stops at the first failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("required config key `{0}` not found, check the file at ROSTERPRINT_CONFIG")]
    MissingConfigKey(&'static str),

    #[error("could not read config file `{path}`: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file `{path}`: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no spreadsheet matching `{pattern}` found in `{dir}`")]
    SourceNotFound { dir: PathBuf, pattern: String },

    #[error("file type not supported: `{path}` (extension `{extension}`)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("roster `{0}` contains no data rows")]
    EmptyRoster(PathBuf),

    #[error("new column name `{0}` already exists in roster")]
    DuplicateColumn(String),

    #[error("column `{0}` not found in roster")]
    MissingColumn(String),

    #[error("session `{0}` has no rows to print")]
    EmptySession(String),

    #[error("no columns left to print")]
    EmptyProjection,

    #[error("print command failed for `{0}`")]
    PrintFailed(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("pdf generation failed: {0}")]
    Pdf(String),
}
