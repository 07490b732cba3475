use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use boost_engine::{AccountApiError, OrderError, TopUpError, WalletError, WebhookError};
use plisio_tools::SignatureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("No identity claims were attached to the request")]
    Unauthenticated,
    #[error("Insufficient permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
    #[error("Invalid webhook signature. {0}")]
    InvalidSignature(#[from] SignatureError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InvalidSignature(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "detail": self.to_string() }).to_string())
    }
}

impl From<OrderError> for ServerError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::DatabaseError(e) => Self::BackendError(e),
            OrderError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderError::Wallet(WalletError::DatabaseError(e)) => Self::BackendError(e),
            // Validation, pricing and wallet-funding problems are all client-reportable.
            e => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<WalletError> for ServerError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::DatabaseError(e) => Self::BackendError(e),
            WalletError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            e => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<TopUpError> for ServerError {
    fn from(e: TopUpError) -> Self {
        match e {
            TopUpError::DatabaseError(e) => Self::BackendError(e),
            TopUpError::GatewayUnavailable(e) => Self::GatewayUnavailable(e.to_string()),
            e => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<WebhookError> for ServerError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::MalformedPayload(e) => Self::InvalidRequestBody(e),
            WebhookError::UnknownInvoice(_) => Self::NoRecordFound(e.to_string()),
            WebhookError::Wallet(e) => Self::BackendError(e.to_string()),
            WebhookError::DatabaseError(e) => Self::BackendError(e),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            AccountApiError::QueryError(e) => Self::ValidationError(e),
            AccountApiError::DatabaseError(e) => Self::BackendError(e),
        }
    }
}

#[cfg(test)]
mod test {
    use bg_common::Money;
    use boost_engine::{OrderError, WalletError};

    use super::*;

    #[test]
    fn insufficient_funds_maps_to_bad_request_with_a_detail_string() {
        let err = ServerError::from(OrderError::Wallet(WalletError::InsufficientFunds {
            required: Money::from_cents(510),
            available: Money::from_dollars(5),
        }));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.error_response();
        assert_eq!(body.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Insufficient funds"));
    }

    #[test]
    fn unknown_records_map_to_not_found() {
        let err = ServerError::from(OrderError::OrderNotFound(42));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = ServerError::from(WebhookError::UnknownInvoice("inv-1".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn signature_failures_are_forbidden() {
        let err = ServerError::from(SignatureError::InvalidSignature);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let err = ServerError::from(SignatureError::MissingSignature);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn gateway_failures_are_bad_gateway() {
        let err = ServerError::from(TopUpError::GatewayUnavailable(
            boost_engine::traits::GatewayError::Unavailable("timed out".into()),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn backend_errors_stay_internal() {
        let err = ServerError::from(OrderError::DatabaseError("disk on fire".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
