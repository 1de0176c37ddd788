pub mod lifecycle;
pub mod policy;
pub mod validation;

pub use lifecycle::{
    ACCOUNTS_PER_PAGE, AccountLifecycle, FOLLOWS_PER_PAGE, Registration, SignedIn,
};
pub use policy::AccountPolicy;
pub use validation::{ProfileForm, RegisterForm, validate_profile, validate_registration};
