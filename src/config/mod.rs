mod settings;

pub use settings::{GraphConfig, LoggingConfig, ServerConfig, Settings, TemplateConfig};
