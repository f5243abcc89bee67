use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "cloudpeek.toml";

/// Prefix of nested environment overrides, e.g. `CLOUDPEEK__LOGS__LIMIT=10`.
pub const ENV_PREFIX: &str = "CLOUDPEEK__";

/// Google Cloud project and how to authenticate against it
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    pub id: String,
    /// Path to a service account or authorized user JSON key file
    pub credentials: Option<PathBuf>,
    /// Pre-issued OAuth2 access token, e.g. from `gcloud auth print-access-token`
    pub access_token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Upper bound for a single request, including reading the body
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    pub monitoring_endpoint: String,
    pub logging_endpoint: String,
    pub trace_endpoint: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            monitoring_endpoint: "https://monitoring.googleapis.com".to_string(),
            logging_endpoint: "https://logging.googleapis.com".to_string(),
            trace_endpoint: "https://cloudtrace.googleapis.com".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Metric types to poll, e.g. `custom.googleapis.com/login_latency`
    pub types: Vec<String>,
    /// How far back the time series query reaches
    #[serde(with = "humantime_serde")]
    pub lookback: Duration,
    /// Restrict series to a single `subject_id` label value
    pub subject: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            lookback: Duration::from_secs(240 * 60 * 60),
            subject: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Log name, either short (`app`) or fully qualified (`projects/p/logs/app`)
    pub name: String,
    #[serde(with = "humantime_serde")]
    pub lookback: Duration,
    /// Number of most recent entries to fetch
    pub limit: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            lookback: Duration::from_secs(72 * 60 * 60),
            limit: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TracesConfig {
    /// Number of traces to fetch
    pub limit: usize,
    /// Only list traces that started within this window
    #[serde(default, with = "humantime_serde")]
    pub lookback: Option<Duration>,
}

impl Default for TracesConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            lookback: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    pub project: ProjectConfig,
    pub http: HttpConfig,
    pub metrics: MetricsConfig,
    pub logs: LogsConfig,
    pub traces: TracesConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::figment(Path::new(CONFIG_FILE))
            .extract()
            .map_err(Box::new)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        Self::figment(path).extract().map_err(Box::new)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(legacy_env())
    }
}

/// `PROJECT_ID` and `PROJECT_CREDENTIALS`, as read from the environment by
/// earlier deployments of this tool.
fn legacy_env() -> Env {
    Env::raw()
        .only(&["PROJECT_ID", "PROJECT_CREDENTIALS"])
        .map(|key| {
            if key == "PROJECT_ID" {
                "project.id".into()
            } else {
                "project.credentials".into()
            }
        })
}
