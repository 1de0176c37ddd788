pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::ChirpConfig;
pub use error::{ChirpError, ChirpResult, FieldErrors};
pub use traits::{AccountStore, Notifier, SessionIssuer};
pub use types::{Account, AccountState, Actor, CreateAccountInput, Page};
