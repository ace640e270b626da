//! User routes.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use service_core::{CoreError, HandlerReply, RouteBuilder, RouteDefinition, ValidatedRequest};

use crate::service::UserService;

const COMPONENT: &str = "UserHandler";

pub struct UserHandler;

impl UserHandler {
    pub fn routes(service: Arc<UserService>) -> Vec<RouteDefinition> {
        let list_service = Arc::clone(&service);
        let get_service = service;

        vec![
            RouteBuilder::get("/")
                .handler(move |request| get_users(Arc::clone(&list_service), request)),
            RouteBuilder::get("/:id")
                .handler(move |request| get_user(Arc::clone(&get_service), request)),
        ]
    }
}

async fn get_users(
    service: Arc<UserService>,
    request: ValidatedRequest,
) -> Result<HandlerReply, CoreError> {
    request.detail.add_detail(COMPONENT, "getUsers", Some("Start"));

    let users = service.find_all_users(&request.detail).await?;

    request
        .summary
        .add_success_block("Get Users", "Get all users", "200", "Success");
    Ok(HandlerReply::ok(json!({ "data": users })))
}

async fn get_user(
    service: Arc<UserService>,
    request: ValidatedRequest,
) -> Result<HandlerReply, CoreError> {
    request.detail.add_detail(COMPONENT, "getUserById", None);

    let id = request.params.get("id").cloned().unwrap_or_default();
    let Some(user) = service.find_user_by_id(&id, &request.detail).await? else {
        return Ok(HandlerReply::with_status(
            StatusCode::NOT_FOUND,
            json!({ "message": "user not found" }),
        ));
    };

    request
        .summary
        .add_success_block("Get User", "Get user by id", "200", "Success");
    Ok(HandlerReply::ok(json!({ "data": user })))
}
