//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies registry, payment, and request failures into a
//! single enum that converts into a JSON HTTP response via its
//! [`IntoResponse`] implementation.
//!
//! Every error body has the shape `{error, kind, status}`; variants that
//! name an event, account, or amount add it as an extra field.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use boxoffice_core::office::OfficeError;
use boxoffice_core::registry::RegistryError;
use boxoffice_ledger::PaymentError;
use serde_json::{Map, Value, json};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A box office operation failed.
    #[error(transparent)]
    Office(#[from] OfficeError),

    /// A caller-identified route was called without the caller header.
    #[error("missing x-caller-id header")]
    MissingCaller,

    /// The caller header is not a valid account identifier.
    #[error("invalid x-caller-id header: {0}")]
    InvalidCaller(String),

    /// The request body is not valid JSON for the endpoint.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// A path parameter could not be decoded.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidPath(rejection.body_text())
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self::Office(OfficeError::Registry(e))
    }
}

impl ApiError {
    /// HTTP status code for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Office(OfficeError::Registry(e)) => match e {
                RegistryError::NotOwner(_) => StatusCode::FORBIDDEN,
                RegistryError::EventNotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::ExistingEvent(_)
                | RegistryError::AlreadyOwner(_)
                | RegistryError::AllTicketsSold(_) => StatusCode::CONFLICT,
                RegistryError::TicketPriceNotCovered(_) => StatusCode::PAYMENT_REQUIRED,
                RegistryError::BalanceOverflow => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Office(OfficeError::Payment(PaymentError::Declined { .. })) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Office(OfficeError::Payment(PaymentError::Ledger(_)) | OfficeError::Snapshot(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MissingCaller
            | Self::InvalidCaller(_)
            | Self::InvalidBody(_)
            | Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Office(OfficeError::Registry(e)) => match e {
                RegistryError::ExistingEvent(_) => "ExistingEvent",
                RegistryError::EventNotFound(_) => "EventNotFound",
                RegistryError::AlreadyOwner(_) => "AlreadyOwner",
                RegistryError::AllTicketsSold(_) => "AllTicketsSold",
                RegistryError::TicketPriceNotCovered(_) => "TicketPriceNotCovered",
                RegistryError::NotOwner(_) => "NotOwner",
                RegistryError::BalanceOverflow => "BalanceOverflow",
            },
            Self::Office(OfficeError::Payment(PaymentError::Declined { .. })) => "PaymentDeclined",
            Self::Office(OfficeError::Payment(PaymentError::Ledger(_))) => "LedgerError",
            Self::Office(OfficeError::Snapshot(_)) => "SnapshotError",
            Self::MissingCaller => "MissingCaller",
            Self::InvalidCaller(_) => "InvalidCaller",
            Self::InvalidBody(_) => "InvalidBody",
            Self::InvalidPath(_) => "InvalidPath",
        }
    }

    /// Structured detail naming the offending event, account, or amount.
    fn detail(&self) -> Map<String, Value> {
        let mut detail = Map::new();
        match self {
            Self::Office(OfficeError::Registry(e)) => match e {
                RegistryError::ExistingEvent(name) | RegistryError::EventNotFound(name) => {
                    detail.insert("name".to_owned(), json!(name));
                }
                RegistryError::AlreadyOwner(id) | RegistryError::NotOwner(id) => {
                    detail.insert("account".to_owned(), json!(id));
                }
                RegistryError::AllTicketsSold(max) => {
                    detail.insert("max_tickets".to_owned(), json!(max));
                }
                RegistryError::TicketPriceNotCovered(price) => {
                    detail.insert("price".to_owned(), json!(price));
                }
                RegistryError::BalanceOverflow => {}
            },
            Self::Office(OfficeError::Payment(PaymentError::Declined { account, amount })) => {
                detail.insert("account".to_owned(), json!(account));
                detail.insert("amount".to_owned(), json!(amount));
            }
            Self::Office(_)
            | Self::MissingCaller
            | Self::InvalidCaller(_)
            | Self::InvalidBody(_)
            | Self::InvalidPath(_) => {}
        }
        detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let mut body = self.detail();
        body.insert("error".to_owned(), json!(self.to_string()));
        body.insert("kind".to_owned(), json!(self.kind()));
        body.insert("status".to_owned(), json!(status.as_u16()));

        (status, axum::Json(Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_types::AccountId;

    use super::*;

    #[test]
    fn registry_errors_map_to_statuses() {
        let id = AccountId::new();
        let cases = [
            (RegistryError::NotOwner(id), StatusCode::FORBIDDEN),
            (RegistryError::EventNotFound("x".to_owned()), StatusCode::NOT_FOUND),
            (RegistryError::ExistingEvent("x".to_owned()), StatusCode::CONFLICT),
            (RegistryError::AlreadyOwner(id), StatusCode::CONFLICT),
            (RegistryError::AllTicketsSold(2), StatusCode::CONFLICT),
            (RegistryError::TicketPriceNotCovered(20), StatusCode::PAYMENT_REQUIRED),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn declined_payment_is_bad_gateway() {
        let err = ApiError::from(OfficeError::from(PaymentError::Declined {
            account: AccountId::new(),
            amount: 5,
        }));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.kind(), "PaymentDeclined");
        assert_eq!(err.detail()["amount"], 5);
    }

    #[test]
    fn caller_errors_are_bad_request() {
        assert_eq!(ApiError::MissingCaller.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCaller("nope".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn detail_names_the_event() {
        let err = ApiError::from(RegistryError::EventNotFound("Opera".to_owned()));
        assert_eq!(err.detail()["name"], "Opera");
        assert_eq!(err.kind(), "EventNotFound");
    }
}
