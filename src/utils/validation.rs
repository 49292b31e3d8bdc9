// Request body checks shared by the resource handlers

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;

use crate::{db::Fields, utils::api_error::ApiError};

pub const INVALID_BODY: &str = "Les données fournies ne sont pas valides";

/// Accept only a JSON object body
pub fn object_body(body: Result<Json<Value>, JsonRejection>) -> Result<Fields, ApiError> {
    match body {
        Ok(Json(Value::Object(fields))) => Ok(fields),
        Ok(_) => Err(ApiError::BadRequest(INVALID_BODY.to_string())),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

/// First required field absent from `fields`, in declaration order.
///
/// Only absence counts: an explicit `null` is a present value.
pub fn first_missing_field<'a>(fields: &Fields, required: &[&'a str]) -> Option<&'a str> {
    required
        .iter()
        .copied()
        .find(|field| !fields.contains_key(*field))
}

pub fn check_required_fields(fields: &Fields, required: &[&str]) -> Result<(), ApiError> {
    match first_missing_field(fields, required) {
        Some(field) => Err(ApiError::MissingField(field.to_string())),
        None => Ok(()),
    }
}

/// Accept only a JSON array of strings (image identifiers)
pub fn id_list_body(body: Result<Json<Value>, JsonRejection>) -> Result<Vec<String>, ApiError> {
    let invalid = || ApiError::BadRequest(INVALID_BODY.to_string());

    match body {
        Ok(Json(Value::Array(items))) => items
            .into_iter()
            .map(|item| match item {
                Value::String(id) => Ok(id),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}
