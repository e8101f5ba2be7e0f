//! ChainSherlock REST API Module
//! Wallet investigation over HTTP, backed by the shared `Investigator`

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
