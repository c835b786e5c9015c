use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const TABLE_PLACEHOLDER: &str = "{table}";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline config: {}", path.display()))?;
        let config: PipelineConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse toml in {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid pipeline config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extract.anchor_id.trim().is_empty() {
            bail!("extract.anchor_id must not be empty");
        }
        if self.extract.table_class.trim().is_empty() {
            bail!("extract.table_class must not be empty");
        }

        match self.extract.mode {
            FetchMode::Http => {
                if self.extract.url.trim().is_empty() {
                    bail!("extract.url is required for http mode");
                }
                Url::parse(&self.extract.url)
                    .with_context(|| format!("invalid extract.url {}", self.extract.url))?;
            }
            FetchMode::File => {
                if self.extract.file_path.is_none() {
                    bail!("extract.file_path is required for file mode");
                }
            }
        }

        if !is_plain_identifier(&self.load.table_name) {
            bail!(
                "load.table_name must be a plain identifier, got {:?}",
                self.load.table_name
            );
        }
        if self.query.statements.iter().all(|s| s.trim().is_empty()) {
            bail!("query.statements must contain at least one statement");
        }

        Ok(())
    }

    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if let Some(file_path) = self.extract.file_path.take() {
            self.extract.file_path = Some(resolve_path(base, &file_path));
        }
        self.transform.rates_path = resolve_path(base, &self.transform.rates_path);
        self.load.csv_path = resolve_path(base, &self.load.csv_path);
        self.load.db_path = resolve_path(base, &self.load.db_path);
        self.log.progress_path = resolve_path(base, &self.log.progress_path);
        self
    }

    // Statements name the loaded table through `{table}`.
    pub fn expand_table(&self, statement: &str) -> String {
        statement.replace(TABLE_PLACEHOLDER, &self.load.table_name)
    }

    pub fn query_statements(&self) -> Vec<String> {
        self.query
            .statements
            .iter()
            .map(|statement| self.expand_table(statement))
            .collect()
    }

    pub fn document_location(&self) -> Result<String> {
        match self.extract.mode {
            FetchMode::Http => Ok(self.extract.url.clone()),
            FetchMode::File => self
                .extract
                .file_path
                .as_ref()
                .map(|p| format!("file://{}", p.display()))
                .ok_or_else(|| anyhow!("extract.file_path missing for file mode")),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    Http,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub mode: FetchMode,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default = "default_anchor_id")]
    pub anchor_id: String,
    #[serde(default = "default_table_class")]
    pub table_class: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Http,
            url: default_url(),
            file_path: None,
            anchor_id: default_anchor_id(),
            table_class: default_table_class(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    #[serde(default = "default_rates_path")]
    pub rates_path: PathBuf,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            rates_path: default_rates_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            db_path: default_db_path(),
            table_name: default_table_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_statements")]
    pub statements: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            statements: default_statements(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_progress_path")]
    pub progress_path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            progress_path: default_progress_path(),
        }
    }
}

pub fn resolve_path(base: &Path, maybe_relative: &Path) -> PathBuf {
    if maybe_relative.is_absolute() {
        return maybe_relative.to_path_buf();
    }
    base.join(maybe_relative)
}

pub fn is_plain_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_url() -> String {
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks"
        .to_string()
}

fn default_anchor_id() -> String {
    "By_market_capitalization".to_string()
}

fn default_table_class() -> String {
    "wikitable".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_rates_path() -> PathBuf {
    PathBuf::from("exchange_rate.csv")
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("Largest_banks_data.csv")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("Banks.db")
}

fn default_table_name() -> String {
    "Largest_banks".to_string()
}

fn default_statements() -> Vec<String> {
    vec![
        format!("SELECT * FROM {TABLE_PLACEHOLDER}"),
        format!("SELECT AVG(MC_GBP_Billion) FROM {TABLE_PLACEHOLDER}"),
        format!("SELECT Name from {TABLE_PLACEHOLDER} LIMIT 5"),
    ]
}

fn default_progress_path() -> PathBuf {
    PathBuf::from("code_log.txt")
}
