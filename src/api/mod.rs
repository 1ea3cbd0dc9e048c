//! API layer - HTTP endpoint handlers.

mod drafts;
mod format;
mod health;
mod metrics;
mod routes;

pub use drafts::{AddVariableRequest, MediaQuery, PreviewRequest, SubmitResponse};
pub use format::{FormatRequest, FormatResponse};
pub use health::HealthResponse;
pub use routes::api_routes;
