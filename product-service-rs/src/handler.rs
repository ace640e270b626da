//! Product routes.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};

use service_core::{
    CoreError, HandlerReply, PeerClient, PeerRequest, RouteBuilder, RouteDefinition,
    ValidatedRequest,
};

use crate::model::{limit_from_query, CreateProduct, ProductFilter, UpdateProduct};
use crate::schemas::{create_product_schema, list_products_query_schema, update_product_schema};
use crate::service::ProductService;

const COMPONENT: &str = "ProductHandler";

pub struct ProductHandler;

impl ProductHandler {
    /// Route definitions mounted under the service base path, in
    /// registration order.
    pub fn routes(
        service: Arc<ProductService>,
        peers: PeerClient,
        user_service_base: String,
    ) -> Vec<RouteDefinition> {
        let list_service = Arc::clone(&service);
        let create_service = Arc::clone(&service);
        let get_service = Arc::clone(&service);
        let update_service = service;

        vec![
            RouteBuilder::get("/")
                .query(list_products_query_schema())
                .handler(move |request| get_products(Arc::clone(&list_service), request)),
            RouteBuilder::get("/:id").handler(move |request| {
                get_product(
                    Arc::clone(&get_service),
                    peers.clone(),
                    user_service_base.clone(),
                    request,
                )
            }),
            RouteBuilder::post("/")
                .body(create_product_schema())
                .handler(move |request| create_product(Arc::clone(&create_service), request)),
            RouteBuilder::put("/:id")
                .body(update_product_schema())
                .handler(move |request| update_product(Arc::clone(&update_service), request)),
        ]
    }
}

async fn get_products(
    service: Arc<ProductService>,
    request: ValidatedRequest,
) -> Result<HandlerReply, CoreError> {
    request.detail.add_detail(COMPONENT, "getProducts", Some("Start"));

    let filter = ProductFilter::from_query(request.query.as_ref());
    let limit = limit_from_query(request.query.as_ref());

    let total = service.count_products(&filter, &request.detail).await?;
    let data = service
        .find_all_products(&filter, limit, &request.detail)
        .await?;

    request
        .summary
        .add_success_block("Get Products", "Get all products", "200", "Success");
    Ok(HandlerReply::ok(json!({
        "success": true,
        "total": total,
        "data": data,
    })))
}

async fn get_product(
    service: Arc<ProductService>,
    peers: PeerClient,
    user_service_base: String,
    request: ValidatedRequest,
) -> Result<HandlerReply, CoreError> {
    request.detail.add_detail(COMPONENT, "getProductById", None);

    let id = request.params.get("id").cloned().unwrap_or_default();
    let Some(product) = service.find_product_by_id(&id, &request.detail).await? else {
        return Ok(HandlerReply::with_status(
            StatusCode::NOT_FOUND,
            json!({ "message": "product not found" }),
        ));
    };

    // Whatever user-service answers (errors included) lands in `owner` as
    // data; only an unreachable peer fails this request.
    let owner = peers
        .get(
            PeerRequest::new(&format!(
                "{}/users/{}",
                user_service_base, product.create_by
            )),
            &request.context,
            &request.detail,
        )
        .await?;

    request
        .summary
        .add_success_block("Get Product", "Get product by id", "200", "Success");
    Ok(HandlerReply::ok(json!({
        "success": true,
        "data": product,
        "owner": owner.data,
    })))
}

async fn create_product(
    service: Arc<ProductService>,
    request: ValidatedRequest,
) -> Result<HandlerReply, CoreError> {
    request.detail.add_detail(COMPONENT, "createProduct", None);

    let input: CreateProduct =
        serde_json::from_value(request.body.clone().unwrap_or(Value::Null))
            .map_err(|err| CoreError::Handler(err.to_string()))?;

    let id = service.insert_product(input, &request.detail).await?;

    request
        .summary
        .add_success_block("Create Product", "Insert product", "201", "Success");
    Ok(HandlerReply::created(json!({ "success": true, "id": id })))
}

async fn update_product(
    service: Arc<ProductService>,
    request: ValidatedRequest,
) -> Result<HandlerReply, CoreError> {
    request.detail.add_detail(COMPONENT, "updateProduct", None);

    let id = request.params.get("id").cloned().unwrap_or_default();
    let changes: UpdateProduct =
        serde_json::from_value(request.body.clone().unwrap_or_else(|| json!({})))
            .map_err(|err| CoreError::Handler(err.to_string()))?;

    let Some(product) = service.update_product(&id, changes, &request.detail).await? else {
        return Ok(HandlerReply::with_status(
            StatusCode::NOT_FOUND,
            json!({ "message": "product not found" }),
        ));
    };

    request
        .summary
        .add_success_block("Update Product", "Update product by id", "200", "Success");
    Ok(HandlerReply::ok(json!({ "success": true, "data": product })))
}
