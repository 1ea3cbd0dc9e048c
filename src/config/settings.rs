use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Max request body in bytes (media uploads go through the API)
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

/// WhatsApp Cloud (Graph) API access
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Empty token selects the in-memory integrations
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub business_account_id: String,
    /// App ID used for resumable media uploads
    #[serde(default)]
    pub app_id: String,
    /// Bytes per upload chunk
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    /// Escape HTML in previews before applying markup
    #[serde(default = "default_escape_html")]
    pub escape_html: bool,
    /// `message_send_ttl_seconds` for drafts without their own expiry
    #[serde(default = "default_message_ttl_seconds")]
    pub default_message_ttl_seconds: u32,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024 // 16 MiB
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v21.0".to_string()
}

fn default_upload_chunk_size() -> usize {
    4 * 1024 * 1024 // 4 MiB
}

fn default_request_timeout() -> u64 {
    30
}

fn default_escape_html() -> bool {
    true
}

fn default_message_ttl_seconds() -> u32 {
    300
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    100
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("graph.base_url", default_graph_base_url())?
            .set_default("graph.api_version", default_api_version())?
            .set_default("templates.escape_html", true)?
            .set_default("templates.default_message_ttl_seconds", 300)?
            .set_default("logging.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER__PORT, GRAPH__ACCESS_TOKEN, GRAPH__BUSINESS_ACCOUNT_ID, etc.
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl GraphConfig {
    /// Whether enough is configured to talk to the Graph API
    pub fn is_configured(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// `{base_url}/{api_version}/{path}`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            path.trim_start_matches('/')
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit: default_body_limit(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
            api_version: default_api_version(),
            access_token: String::new(),
            business_account_id: String::new(),
            app_id: String::new(),
            upload_chunk_size: default_upload_chunk_size(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            escape_html: default_escape_html(),
            default_message_ttl_seconds: default_message_ttl_seconds(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}
