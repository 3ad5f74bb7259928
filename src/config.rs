use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One column reshaping step. `old_columns` are joined row-wise with
/// `separator` into a new `new_name` column; a single old column renames it.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRule {
    #[serde(rename = "new-name")]
    pub new_name: String,
    #[serde(rename = "old-columns")]
    pub old_columns: Vec<String>,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    " ".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Portrait
    }
}

/// Everything the config file may carry, all optional so that missing
/// required keys can be reported by name instead of as a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    #[serde(rename = "search-dir")]
    search_dir: Option<PathBuf>,
    #[serde(rename = "spreadsheet-pattern")]
    spreadsheet_pattern: Option<String>,
    #[serde(rename = "columns-to-print", alias = "columns")]
    columns_to_print: Option<Vec<String>>,
    #[serde(rename = "class-column-name", alias = "class_column_name")]
    class_column_name: Option<String>,
    #[serde(rename = "title-suffix", alias = "title_suffix")]
    title_suffix: Option<String>,
    #[serde(rename = "modify-columns")]
    modify_columns: Option<Vec<MergeRule>>,
    #[serde(rename = "date-column")]
    date_column: Option<String>,
    #[serde(rename = "date-format")]
    date_format: Option<String>,
    #[serde(rename = "show-print-date")]
    show_print_date: Option<bool>,
    #[serde(rename = "show-modified-time")]
    show_modified_time: Option<bool>,
    orientation: Option<Orientation>,
    #[serde(rename = "use-extra-row")]
    use_extra_row: Option<Vec<String>>,
    #[serde(rename = "work-dir")]
    work_dir: Option<PathBuf>,
}

/// Validated run configuration, built once in `main` and passed explicitly
/// to every stage that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub search_dir: PathBuf,
    pub spreadsheet_pattern: String,
    pub columns_to_print: Vec<String>,
    pub class_column_name: String,
    pub title_suffix: String,
    pub merge_rules: Vec<MergeRule>,
    pub date_column: Option<String>,
    pub date_format: String,
    pub show_print_date: bool,
    pub show_modified_time: bool,
    pub orientation: Orientation,
    pub extra_row_columns: Vec<String>,
    pub work_dir: Option<PathBuf>,
}

impl Config {
    /// Read and validate the YAML config at `path`. Required keys are
    /// checked here, before any roster I/O happens.
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig =
            serde_yaml::from_str(&text).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Config {
            search_dir: raw
                .search_dir
                .ok_or(Error::MissingConfigKey("search-dir"))?,
            spreadsheet_pattern: raw
                .spreadsheet_pattern
                .ok_or(Error::MissingConfigKey("spreadsheet-pattern"))?,
            columns_to_print: raw
                .columns_to_print
                .ok_or(Error::MissingConfigKey("columns-to-print"))?,
            class_column_name: raw
                .class_column_name
                .ok_or(Error::MissingConfigKey("class-column-name"))?,
            title_suffix: raw.title_suffix.unwrap_or_default(),
            merge_rules: raw.modify_columns.unwrap_or_default(),
            date_column: raw.date_column,
            date_format: raw.date_format.unwrap_or_else(|| "%m/%d/%Y".to_string()),
            show_print_date: raw.show_print_date.unwrap_or(false),
            show_modified_time: raw.show_modified_time.unwrap_or(false),
            orientation: raw.orientation.unwrap_or_default(),
            extra_row_columns: raw.use_extra_row.unwrap_or_default(),
            work_dir: raw.work_dir,
        };
        debug!("config has all required keys");
        Ok(config)
    }
}
