use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Request, State},
    routing::post,
};
use serde_json::Value;

use crate::{
    AppState, Error,
    relay::{LookupOutcome, LookupRelay},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(scan))
}

/// Body of `POST /api/scan`.
pub struct LookupRequest {
    pub target: String,
}

impl<S> FromRequest<S> for LookupRequest
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| Error::validation(rejection.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::missing_target());
        }

        let value: Value =
            serde_json::from_slice(&body).map_err(|_| Error::validation("invalid JSON body"))?;
        match value.get("target") {
            Some(Value::String(target)) => Ok(Self {
                target: target.clone(),
            }),
            _ => Err(Error::missing_target()),
        }
    }
}

async fn scan(
    State(relay): State<Arc<LookupRelay>>,
    request: LookupRequest,
) -> Result<Json<LookupOutcome>, Error> {
    let outcome = relay.lookup(&request.target).await?;
    Ok(Json(outcome))
}
