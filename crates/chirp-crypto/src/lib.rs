pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::{SessionClaims, create_session_token, validate_session_token};
pub use password::{hash_password, verify_password};
pub use token::{generate_account_id, generate_activation_token};
