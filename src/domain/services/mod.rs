mod app_context;
mod auth;
pub mod gateway;
mod pois;
mod route_draft;
mod routes;
mod session_context;
mod token_refresher;

pub use app_context::*;
pub use auth::*;
pub use gateway::encode_path;
pub use gateway::Failure;
pub use gateway::Gateway;
pub use gateway::Outcome;
pub use gateway::PendingRequest;
pub use pois::*;
pub use route_draft::*;
pub use routes::*;
pub use session_context::*;
pub use token_refresher::*;
