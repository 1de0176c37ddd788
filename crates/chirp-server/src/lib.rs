pub mod auth;
pub mod email;
pub mod error;
pub mod queue;
pub mod routes;
pub mod session;
pub mod state;
pub mod view;

pub use auth::{AuthenticatedUser, SessionSecret};
pub use email::{EmailNotifier, LogNotifier};
pub use error::ApiError;
pub use queue::{NotifierWorker, QueuedNotifier};
pub use routes::build_router;
pub use session::JwtSessionIssuer;
pub use state::AppState;
pub use view::UserView;
