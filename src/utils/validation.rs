use serde::{Deserialize, Deserializer};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T, context: &str) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|err| AppError::bad_request(context, serde_json::to_value(err).unwrap_or_default()))
}

pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("Invalid {} ID", what), json!({ "id": raw })))
}

/// For `#[serde(default, deserialize_with = "nullable")]` on `Option<Option<T>>`:
/// an absent field stays `None`, an explicit `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
