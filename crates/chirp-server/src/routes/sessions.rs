use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use chirp_core::AccountStore;

use crate::error::ApiError;
use crate::state::AppState;
use crate::view::UserView;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login<A: AccountStore>(
    State(state): State<AppState<A>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let signed_in = state
        .accounts
        .authenticate(&body.email, &body.password)
        .await?;
    Ok(Json(json!({
        "user": UserView::private(&signed_in.account),
        "accessJwt": signed_in.session_token,
    })))
}
