use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        LoginRequest, LoginResponse, MessageResponse, SearchParams, SearchResponse, SignupRequest,
        SignupResponse,
    },
    jwt::AuthUser,
};
use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/search", get(search))
        .route("/logout", get(logout))
}

#[instrument(skip(state, payload))]
async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(%rejection, "malformed signup body");
        AppError::Validation("Invalid request body".into())
    })?;
    let (data, token) = state.accounts.signup(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            status: "SUCCESS",
            message: "Signup successful",
            token,
            data,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(%rejection, "malformed login body");
        AppError::Validation("Invalid request body".into())
    })?;
    let token = state.accounts.login(payload).await?;
    Ok(Json(LoginResponse {
        status: "SUCCESS",
        message: "Logged in successful",
        token,
    }))
}

#[instrument(skip(state, claims, params))]
async fn search(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(params) = params.map_err(|rejection| {
        warn!(%rejection, "malformed search query");
        AppError::Validation("Invalid query string".into())
    })?;
    let data = state.accounts.search(&claims, params).await?;
    let message = if data.is_empty() {
        "No results found for the given input"
    } else {
        "Here are requested users"
    };
    Ok(Json(SearchResponse {
        status: "SUCCESS",
        message,
        data,
    }))
}

#[instrument(skip(claims))]
async fn logout(AuthUser(claims): AuthUser) -> Json<MessageResponse> {
    info!(user_id = %claims.sub, "user logged out");
    Json(MessageResponse {
        status: "SUCCESS",
        message: "Logout successful",
    })
}
