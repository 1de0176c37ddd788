pub mod account_store;
pub mod notifier;
pub mod session;

pub use account_store::AccountStore;
pub use notifier::Notifier;
pub use session::SessionIssuer;
