//! Status checking and content interpretation.

use serde_json::Value;

use crate::error::{ClientError, RestError, ValidationError};
use crate::transport::{RawResponse, GZIP_MIMETYPE, JSON_MIMETYPE};

use super::error_body::ErrorBody;
use super::value::{ApiResponse, ResponseContent};

/// Turns a raw response into an [`ApiResponse`] or an error.
///
/// ## Errors
///
/// - [`ClientError::Api`] for a 4xx with a normalizable JSON body
/// - [`ClientError::ClientStatus`] for any other 4xx
/// - [`ClientError::ServerStatus`] for a 5xx
/// - [`ValidationError::UnsupportedContentType`] for a success response that
///   is neither JSON nor a gzip archive
/// - [`ValidationError::Json`] if a JSON body does not parse
pub fn interpret(raw: RawResponse) -> Result<ApiResponse, RestError> {
    raise_for_status(&raw)?;

    let mimetype = raw.mimetype().unwrap_or_default();
    let content = if mimetype == JSON_MIMETYPE {
        ResponseContent::Json(serde_json::from_slice(&raw.body).map_err(ValidationError::from)?)
    } else if mimetype == GZIP_MIMETYPE {
        ResponseContent::Binary(raw.body)
    } else {
        return Err(ValidationError::UnsupportedContentType { mimetype }.into());
    };

    Ok(ApiResponse::new(mimetype, content))
}

/// Fails on 4xx and 5xx statuses.
///
/// ## Errors
///
/// See [`interpret`].
pub fn raise_for_status(raw: &RawResponse) -> Result<(), ClientError> {
    match raw.status {
        400..=499 => {
            let body = raw
                .is_json()
                .then(|| serde_json::from_slice::<Value>(&raw.body).ok())
                .flatten()
                .and_then(|value| ErrorBody::parse(&value));

            if let Some(body) = body {
                let (message, reasons) = body.into_parts();
                return Err(ClientError::Api {
                    status: raw.status,
                    url: raw.url.clone(),
                    message,
                    reasons,
                });
            }

            Err(ClientError::ClientStatus {
                status: raw.status,
                reason: raw.reason.clone(),
                url: raw.url.clone(),
            })
        }
        500..=599 => Err(ClientError::ServerStatus {
            status: raw.status,
            reason: raw.reason.clone(),
            url: raw.url.clone(),
        }),
        _ => Ok(()),
    }
}
