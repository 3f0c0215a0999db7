mod api;
mod event;
mod notice;
mod plan_command;
mod poi;
mod route;
mod session;
mod storage;
mod user;

pub use api::*;
pub use event::*;
pub use notice::*;
pub use plan_command::*;
pub use poi::*;
pub use route::*;
pub use session::*;
pub use storage::*;
pub use user::*;
