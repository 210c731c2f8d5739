//! Error handling for the inventory platform
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::DomainError;
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_es: String },

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Tenant scoping errors
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Tenant selection required")]
    TenantSelectionRequired,

    #[error("No tenant context for write")]
    NoTenantContext,

    #[error("Tenant reassignment is not allowed")]
    TenantReassignment,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Store errors
    #[error("Query failed: {0}")]
    QueryFailed(StoreError),

    // Contract errors
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Validation failure on a single input field
    pub fn validation(field: &str, message: &str, message_es: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_es: message_es.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, .. } => AppError::NotFound(collection),
            StoreError::InvalidCursor => AppError::validation(
                "cursor",
                "Invalid or expired pagination cursor",
                "Cursor de paginación inválido o expirado",
            ),
            StoreError::UnsupportedFilter(field) => AppError::Validation {
                message: format!("Unsupported filter on {}", field),
                message_es: format!("Filtro no soportado en {}", field),
                field,
            },
            other => AppError::QueryFailed(other),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_es: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_es: message_es.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::TokenExpired | AppError::InvalidToken | AppError::Unauthorized { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InsufficientPermissions | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::TenantSelectionRequired => StatusCode::PRECONDITION_REQUIRED,
            AppError::NoTenantContext | AppError::TenantReassignment => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::QueryFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Domain(_)
            | AppError::Configuration(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            AppError::TokenExpired => ErrorDetail::new(
                "TOKEN_EXPIRED",
                "Token has expired",
                "El token ha expirado",
            ),
            AppError::InvalidToken => {
                ErrorDetail::new("INVALID_TOKEN", "Invalid token", "Token inválido")
            }
            AppError::Unauthorized { message, message_es } => {
                ErrorDetail::new("UNAUTHORIZED", message.clone(), message_es.clone())
            }
            AppError::InsufficientPermissions => ErrorDetail::new(
                "INSUFFICIENT_PERMISSIONS",
                "You do not have permission to perform this action",
                "No tienes permiso para realizar esta acción",
            ),
            AppError::Forbidden(msg) => ErrorDetail::new(
                "FORBIDDEN",
                msg.clone(),
                "Acceso denegado",
            ),
            AppError::TenantSelectionRequired => ErrorDetail::new(
                "TENANT_SELECTION_REQUIRED",
                "Select a business (or all businesses) before continuing",
                "Selecciona un negocio (o todos los negocios) antes de continuar",
            ),
            AppError::NoTenantContext => ErrorDetail::new(
                "NO_TENANT_CONTEXT",
                "This action requires a single selected business",
                "Esta acción requiere un único negocio seleccionado",
            ),
            AppError::TenantReassignment => ErrorDetail::new(
                "TENANT_REASSIGNMENT",
                "Records cannot be moved to another business",
                "Los registros no se pueden mover a otro negocio",
            )
            .with_field("tenantId"),
            AppError::Validation {
                field,
                message,
                message_es,
            } => ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_es.clone())
                .with_field(field),
            AppError::Conflict {
                resource,
                message,
                message_es,
            } => ErrorDetail::new("CONFLICT", message.clone(), message_es.clone())
                .with_field(resource),
            AppError::NotFound(resource) => ErrorDetail::new(
                "NOT_FOUND",
                format!("{} not found", resource),
                format!("{} no encontrado", resource),
            ),
            AppError::QueryFailed(_) => ErrorDetail::new(
                "QUERY_FAILED",
                "The data store could not complete the request",
                "El almacén de datos no pudo completar la solicitud",
            ),
            // Contract errors never expose their internals
            AppError::Domain(_)
            | AppError::Configuration(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => ErrorDetail::new(
                "INTERNAL_ERROR",
                "An internal server error occurred",
                "Ocurrió un error interno del servidor",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
