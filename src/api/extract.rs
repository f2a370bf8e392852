//! Request extractors.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use std::sync::Arc;

/// Header carrying the acting user.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Acting user taken from the `X-User-ID` header.
///
/// A missing, empty or non-UTF-8 header is rejected with 400. The rejection
/// is reported to the state's error sink before it becomes the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::InvalidRequest(format!("missing {} header", USER_ID_HEADER)))?;

        let user_id = value.to_str().map_err(|_| {
            ApiError::InvalidRequest(format!("malformed {} header", USER_ID_HEADER))
        })?;

        if user_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest(format!(
                "empty {} header",
                USER_ID_HEADER
            )));
        }

        Ok(Self(user_id.to_string()))
    }
}

impl<S> FromRequestParts<S> for UserId
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts).map_err(|err| {
            let state = Arc::<AppState>::from_ref(state);
            state.report(request_id(parts).as_deref(), err)
        })
    }
}

fn request_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Correlation id assigned by the request-id middleware, if present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestId(pub Option<String>);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_id(parts)))
    }
}
