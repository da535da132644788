use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of the environment variables read by `AppConfig::load`.
pub const ENV_PREFIX: &str = "EFILING";

/// Service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bucket that receives generated documents
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Directory holding one sub-directory per bucket
    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,

    /// Directory holding the `.docx` templates
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Key prefix of every generated object
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Overrides the template used by a plain form submission
    #[serde(default)]
    pub default_template: Option<String>,

    /// JSON file replacing the built-in template families
    #[serde(default)]
    pub families_file: Option<PathBuf>,

    /// Open the form in a browser once the server is up
    #[serde(default)]
    pub open_browser: bool,

    /// Expose `GET /debug`
    #[serde(default)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bucket_name: default_bucket_name(),
            store_root: default_store_root(),
            template_dir: default_template_dir(),
            output_prefix: default_output_prefix(),
            default_template: None,
            families_file: None,
            open_browser: false,
            debug: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional `efiling.{toml,json,yaml}` file,
    /// overridden by `EFILING_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("efiling").required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn template_path(&self, file: &str) -> PathBuf {
        self.template_dir.join(file)
    }

    /// URL the browser is pointed at on startup.
    pub fn local_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            host => host,
        };
        format!("http://{}:{}", host, self.port)
    }

    pub fn template_dir_present(&self) -> bool {
        self.template_dir.is_dir()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_bucket_name() -> String {
    "efiling-store".to_string()
}

fn default_store_root() -> PathBuf {
    PathBuf::from("./store")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("./templates")
}

fn default_output_prefix() -> String {
    "/output/".to_string()
}
