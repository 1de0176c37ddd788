pub mod assertions;
pub mod notifier;
pub mod server;
pub mod stores;

pub use assertions::{assert_api_error, assert_api_ok, assert_field_error};
pub use notifier::{FailingNotifier, RecordingNotifier, SentConfirmation};
pub use server::{
    TEST_PASSWORD, TEST_SESSION_SECRET, TestApp, create_test_app, create_test_app_state,
    create_test_app_with_config, create_test_config, create_test_router_with_notifier,
    send_request,
};
pub use stores::{TestStores, create_test_stores};
