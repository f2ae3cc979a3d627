use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AccountResponse, LoginCredentials, LoginRequest, NewAccount, ProfileChanges,
            RegisterRequest, UpdateProfileRequest,
        },
        middleware::{require_auth, AuthUser},
        password::{hash_password_async, verify_password_async},
        repo_types::{NewUser, UserChanges},
    },
    error::ApiError,
    messages,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn account_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/account", put(update_profile))
        .route("/delete", delete(delete_account))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Unreadable JSON is reported like any other invalid input.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected request body");
            Err(ApiError::Validation)
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = NewAccount::try_from(body(payload)?).inspect_err(|_| {
        warn!("registration with missing fields");
    })?;

    // Advisory only; the unique index decides under concurrency.
    if state.users.find_by_email(&account.email).await?.is_some() {
        warn!(email = %account.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    let password_hash = hash_password_async(account.password).await?;

    let user = match state
        .users
        .create(NewUser {
            name: account.name,
            email: account.email,
            password_hash,
            phone: account.phone,
        })
        .await
    {
        Ok(u) => u,
        Err(e) => {
            let err = ApiError::from(e);
            if matches!(err, ApiError::Conflict) {
                warn!("email registered concurrently");
            }
            return Err(err);
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::with_user(messages::OPERATION_OK, user)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let creds = LoginCredentials::try_from(body(payload)?)?;

    let user = match state.users.find_by_email(&creds.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %creds.email, "login unknown email");
            return Err(ApiError::UnknownAccount);
        }
    };

    if !verify_password_async(creds.password, user.password_hash.clone()).await? {
        warn!(email = %creds.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::WrongPassword);
    }

    let token = state.jwt.issue(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(
        AccountResponse::with_user(messages::OPERATION_OK, user).with_token(token),
    ))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<AccountResponse>, ApiError> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "token subject has no account");
        ApiError::NotFound
    })?;
    Ok(Json(AccountResponse::with_user(messages::OPERATION_OK, user)))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let changes = ProfileChanges::try_from(body(payload)?)?;

    if let Some(email) = &changes.email {
        if let Some(owner) = state.users.find_by_email(email).await? {
            if owner.id != user_id {
                warn!(user_id = %user_id, email = %email, "email already registered");
                return Err(ApiError::Conflict);
            }
        }
    }

    let password_hash = match changes.password {
        Some(plain) => Some(hash_password_async(plain).await?),
        None => None,
    };

    state
        .users
        .update(
            user_id,
            UserChanges {
                name: changes.name,
                email: changes.email,
                password_hash,
                phone: changes.phone,
            },
        )
        .await?;

    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "profile update for missing account");
        ApiError::NotFound
    })?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(AccountResponse::with_user(messages::PROFILE_UPDATED, user)))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<AccountResponse>, ApiError> {
    let removed = state.users.destroy(user_id).await?;
    info!(user_id = %user_id, removed, "account deleted");
    Ok(Json(AccountResponse::ok(messages::OPERATION_OK)))
}

/// Tokens are stateless; logging out changes nothing server-side and the
/// token stays valid until it expires.
#[instrument]
pub async fn logout(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Json<AccountResponse> {
    info!(user_id = %user_id, "logout");
    Json(AccountResponse::ok(messages::OPERATION_OK))
}
