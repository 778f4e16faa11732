use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Dados inválidos: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("{0}")]
    Conflict(String),
    #[error("Usuário não encontrado")]
    NotFound,
    #[error("Usuário já está deletado")]
    AlreadyDeleted,
    #[error("Usuário não está deletado")]
    NotDeleted,
    #[error("ID deve ser um número válido")]
    InvalidId,
    #[error("Email e senha são obrigatórios")]
    MissingCredentials,
    #[error("Erro ao processar senha")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Erro no banco de dados")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = match self {
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Validation(_)
            | UserError::Conflict(_)
            | UserError::AlreadyDeleted
            | UserError::NotDeleted
            | UserError::InvalidId
            | UserError::MissingCredentials => StatusCode::BAD_REQUEST,
            UserError::Hash(_) | UserError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Infrastructure details stay in the logs, not the response body.
        let message = match &self {
            UserError::Hash(e) => {
                tracing::error!("password hashing failed: {}", e);
                "Erro interno do servidor".to_string()
            }
            UserError::Database(e) => {
                tracing::error!("database error: {}", e);
                "Erro interno do servidor".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
