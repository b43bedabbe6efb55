use config::{Config, ConfigError, Environment, File as ConfigFile};
use glob::Pattern;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Local,
    S3,
}

/// Directory nesting between a camera folder and its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileStructure {
    #[default]
    Standard,
    Flat,
}

impl FileStructure {
    pub fn wildcards(&self) -> &'static str {
        match self {
            FileStructure::Standard => "**/**/**/**",
            FileStructure::Flat => "",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (MinIO, LocalStack, ...)
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub project: String,
    pub location: String,
    pub datapull: String,
    #[serde(default = "default_year")]
    pub year: String,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub file_structure: FileStructure,
    #[serde(default)]
    pub video_base_path: String,
    #[serde(default = "default_file_ext")]
    pub file_ext: String,
    #[serde(default = "default_metadata_ext")]
    pub metadata_ext: String,
    pub camera_id: Option<String>,
    #[serde(default = "default_true")]
    pub trim_empty_last_date: bool,
    pub s3: Option<S3Config>,
}

fn default_year() -> String {
    "2025".to_string()
}

fn default_file_ext() -> String {
    "mkv".to_string()
}

fn default_metadata_ext() -> String {
    "xml".to_string()
}

fn default_true() -> bool {
    true
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_download_dir() -> String {
    "temp_blob_storage".to_string()
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("NIGHT_AUDIT").separator("__"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

impl AppConfig {
    pub fn datapull_root(&self) -> String {
        join_segments(&[&self.video_base_path, &self.datapull])
    }

    /// Glob pattern matching the datapull folder. The datapull name is taken
    /// literally; the base path keeps its wildcards unless it is an existing
    /// folder, in which case it is taken literally too.
    pub fn datapull_root_pattern(&self) -> String {
        let base = if Path::new(&self.video_base_path).is_dir() {
            Pattern::escape(&self.video_base_path)
        } else {
            self.video_base_path.clone()
        };
        join_segments(&[&base, &Pattern::escape(&self.datapull)])
    }

    pub fn video_search_pattern(&self) -> String {
        self.search_pattern(&self.file_ext)
    }

    pub fn metadata_search_pattern(&self) -> String {
        self.search_pattern(&self.metadata_ext)
    }

    fn search_pattern(&self, ext: &str) -> String {
        let camera = match self.camera_id.as_deref() {
            Some(camera_id) => Pattern::escape(camera_id),
            None => "*".to_string(),
        };
        let file_glob = format!("*.{}", ext);
        join_segments(&[
            &self.datapull_root_pattern(),
            &camera,
            self.file_structure.wildcards(),
            &file_glob,
        ])
    }

    /// Key prefix of this datapull inside a blob container.
    pub fn remote_prefix(&self) -> String {
        join_segments(&[&self.year, &self.location, &self.datapull])
    }

    pub fn report_title(&self) -> String {
        format!("{}, {}. {}", self.project, self.location, self.datapull)
    }
}

/// Join with `/`, skipping empty segments and doubled separators.
fn join_segments(segments: &[&str]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().filter(|s| !s.is_empty()).enumerate() {
        let segment = if i == 0 {
            segment.trim_end_matches('/')
        } else {
            segment.trim_matches('/')
        };
        if i > 0 {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}
