use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::Error;

/// Turns a handler panic into the regular 500 body.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        String::from("unknown panic")
    };
    Error::internal(detail).into_response()
}
