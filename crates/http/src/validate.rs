//! Request extractors that reject with [`AppError`] instead of axum's plain-text rejections.

use axum::extract::{FromRequest, FromRequestParts, Request};
use garde::{Report, Validate};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;

/// Path parameters, rejected as a structured `400` when they fail to parse.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

/// JSON body that is deserialized and then validated with `garde`.
///
/// Malformed bodies become `bad_request`, constraint violations become `validation_error`
/// with one `{field, message}` detail per violation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate<Context = ()> + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        value.validate().map_err(report_to_error)?;
        Ok(ValidJson(value))
    }
}

fn report_to_error(report: Report) -> AppError {
    let details = report
        .iter()
        .map(|(path, error)| {
            json!({
                "field": json_field_name(&path.to_string()),
                "message": error.message(),
            })
        })
        .collect();
    AppError::validation(details, "request validation failed")
}

/// Field paths come from Rust identifiers; the wire format is camelCase.
fn json_field_name(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            let mut out = String::with_capacity(segment.len());
            let mut upper = false;
            for c in segment.chars() {
                if c == '_' && !out.is_empty() {
                    upper = true;
                } else if upper {
                    out.extend(c.to_uppercase());
                    upper = false;
                } else {
                    out.push(c);
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}
