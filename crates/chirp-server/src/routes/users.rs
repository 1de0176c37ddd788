use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use chirp_accounts::{ProfileForm, RegisterForm};
use chirp_core::{AccountStore, Page};

use super::PageQuery;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::view::UserView;

// ---------------------------------------------------------------------------
// Listing and lookup
// ---------------------------------------------------------------------------

pub async fn index<A: AccountStore>(
    State(state): State<AppState<A>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserView>>, ApiError> {
    let page = state.accounts.list(query.page()).await?;
    Ok(Json(page.map(|account| UserView::public(&account))))
}

pub async fn show<A: AccountStore>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let account = state.accounts.get(&id).await?;
    Ok(Json(UserView::public(&account)))
}

// ---------------------------------------------------------------------------
// Registration and confirmation
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl From<RegisterRequest> for RegisterForm {
    fn from(req: RegisterRequest) -> Self {
        RegisterForm {
            name: req.name,
            email: req.email,
            password: req.password,
            password_confirmation: req.password_confirmation,
        }
    }
}

pub async fn store<A: AccountStore>(
    State(state): State<AppState<A>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registration = state.accounts.register(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": UserView::private(&registration.account),
            "confirmationSent": registration.notification_error.is_none(),
        })),
    ))
}

pub async fn confirm_email<A: AccountStore>(
    State(state): State<AppState<A>>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let signed_in = state.accounts.confirm_email(&token).await?;
    Ok(Json(json!({
        "user": UserView::private(&signed_in.account),
        "accessJwt": signed_in.session_token,
    })))
}

// ---------------------------------------------------------------------------
// Profile update and deletion
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRequest {
    pub name: String,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl From<UpdateRequest> for ProfileForm {
    fn from(req: UpdateRequest) -> Self {
        ProfileForm {
            name: req.name,
            password: req.password,
            password_confirmation: req.password_confirmation,
        }
    }
}

pub async fn update<A: AccountStore>(
    State(state): State<AppState<A>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<UserView>, ApiError> {
    let actor = state.accounts.resolve_actor(&user.account_id).await?;
    let account = state
        .accounts
        .update_profile(&actor, &id, body.into())
        .await?;
    Ok(Json(UserView::private(&account)))
}

pub async fn destroy<A: AccountStore>(
    State(state): State<AppState<A>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = state.accounts.resolve_actor(&user.account_id).await?;
    state.accounts.delete(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Follow listings
// ---------------------------------------------------------------------------

pub async fn followings<A: AccountStore>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserView>>, ApiError> {
    let page = state.accounts.list_following(&id, query.page()).await?;
    Ok(Json(page.map(|account| UserView::public(&account))))
}

pub async fn followers<A: AccountStore>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserView>>, ApiError> {
    let page = state.accounts.list_followers(&id, query.page()).await?;
    Ok(Json(page.map(|account| UserView::public(&account))))
}
