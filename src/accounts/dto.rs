use serde::{Deserialize, Serialize};

use super::repo_types::PublicUser;

/// Body for `POST /user/signup`.
///
/// Fields are optional at the serde layer; presence is checked by the
/// service with a single shared error message.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
}

/// Body for `POST /user/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Query string for `GET /user/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub token: String,
    pub data: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: Vec<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}
