use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::response::ApiResponse;
use crate::error::UserError;
use crate::models::{CreateUser, UpdateUser, User};
use crate::services::UserService;

/// User CRUD routes, nested under `/api/users`.
pub fn user_routes(service: UserService) -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/verify-password", post(verify_password))
        .route("/email/:email", get(get_user_by_email))
        .route("/cpf/:cpf", get(get_user_by_cpf))
        .route("/:id", get(get_user_by_id).put(update_user).delete(delete_user))
        .route("/:id/restore", post(restore_user))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    #[serde(rename = "includeDeleted")]
    include_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(rename = "includeDeleted")]
    include_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    email: Option<String>,
    password: Option<String>,
}

// Path ids arrive as strings so a non-numeric id maps to a 400, not a
// framework rejection outside the response envelope.
fn parse_id(raw: &str) -> Result<i64, UserError> {
    raw.parse().map_err(|_| UserError::InvalidId)
}

#[tracing::instrument(skip(service, data))]
async fn create_user(
    State(service): State<UserService>,
    Json(data): Json<CreateUser>,
) -> Result<Response, UserError> {
    let user = service.create(data).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Usuário criado com sucesso", user)),
    )
        .into_response())
}

#[tracing::instrument(skip(service))]
async fn list_users(
    State(service): State<UserService>,
    Query(params): Query<ListQuery>,
) -> Result<Response, UserError> {
    let page = service
        .list_page(
            params.page.unwrap_or(1),
            params.limit.unwrap_or(10),
            params.include_deleted.unwrap_or(false),
        )
        .await?;

    Ok(Json(ApiResponse::paginated(
        "Usuários listados com sucesso",
        page.items,
        page.pagination,
    ))
    .into_response())
}

fn found_or_404(user: Option<User>) -> Response {
    match user {
        Some(user) => Json(ApiResponse::ok("Usuário encontrado", user.to_public())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": "Usuário não encontrado",
            })),
        )
            .into_response(),
    }
}

#[tracing::instrument(skip(service))]
async fn get_user_by_id(
    State(service): State<UserService>,
    Path(id): Path<String>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, UserError> {
    let id = parse_id(&id)?;
    let user = service
        .find_by_id(id, params.include_deleted.unwrap_or(false))
        .await?;
    Ok(found_or_404(user))
}

#[tracing::instrument(skip(service))]
async fn get_user_by_email(
    State(service): State<UserService>,
    Path(email): Path<String>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, UserError> {
    let user = service
        .find_by_email(&email, params.include_deleted.unwrap_or(false))
        .await?;
    Ok(found_or_404(user))
}

#[tracing::instrument(skip(service))]
async fn get_user_by_cpf(
    State(service): State<UserService>,
    Path(cpf): Path<String>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, UserError> {
    let user = service
        .find_by_cpf(&cpf, params.include_deleted.unwrap_or(false))
        .await?;
    Ok(found_or_404(user))
}

#[tracing::instrument(skip(service, data))]
async fn update_user(
    State(service): State<UserService>,
    Path(id): Path<String>,
    Json(data): Json<UpdateUser>,
) -> Result<Response, UserError> {
    let id = parse_id(&id)?;
    let user = service.update(id, data).await?;
    Ok(Json(ApiResponse::ok("Usuário atualizado com sucesso", user)).into_response())
}

#[tracing::instrument(skip(service))]
async fn delete_user(
    State(service): State<UserService>,
    Path(id): Path<String>,
) -> Result<Response, UserError> {
    let id = parse_id(&id)?;
    let user = service.soft_delete(id).await?;
    Ok(Json(ApiResponse::ok("Usuário deletado com sucesso", user)).into_response())
}

#[tracing::instrument(skip(service))]
async fn restore_user(
    State(service): State<UserService>,
    Path(id): Path<String>,
) -> Result<Response, UserError> {
    let id = parse_id(&id)?;
    let user = service.restore(id).await?;
    Ok(Json(ApiResponse::ok("Usuário restaurado com sucesso", user)).into_response())
}

#[tracing::instrument(skip(service, request))]
async fn verify_password(
    State(service): State<UserService>,
    Json(request): Json<VerifyPasswordRequest>,
) -> Result<Response, UserError> {
    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(UserError::MissingCredentials),
    };

    let result = service.verify_password(&email, &password).await?;

    if !result.valid {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": "Email ou senha inválidos",
            })),
        )
            .into_response());
    }

    Ok(Json(ApiResponse::ok("Credenciais válidas", result.user)).into_response())
}
