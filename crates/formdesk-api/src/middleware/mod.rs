pub mod cors;

pub use cors::{cors_middleware, CorsPolicy};
pub use formdesk_infra::request_id_middleware;
