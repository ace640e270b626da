// product-service-rs/src/main.rs
// Product listing and creation service.

use std::sync::Arc;

use axum::middleware;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use service_core::auth::verify_token;
use service_core::pipeline::MAX_PAYLOAD_SIZE;
use service_core::sink::StdoutSink;
use service_core::{
    init_logging, register, AppContext, AuthGate, AuthGateOptions, LogSink, LoggingConfig,
    PeerClient, ServiceConfig,
};

use product_service::{MemoryProductRepository, ProductHandler, ProductService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    init_logging(Some(LoggingConfig {
        service_name: "product-service".to_string(),
        ..LoggingConfig::default()
    }));

    let config = ServiceConfig::new("product-service");
    let port = config.get_service_port(3000);
    let timeout = config.get_timeout(3000);
    let auth_endpoint = std::env::var("AUTH_VERIFY_URL").unwrap_or_else(|_| {
        format!(
            "{}/api/v1/auth/verify",
            config.get_client_address("auth-service", 8080)
        )
    });
    let user_service_base = config.get_client_address("user-service", 3001);

    let sink: Arc<dyn LogSink> = Arc::new(StdoutSink);
    let app_context = AppContext::new("product-service", sink);

    let repository = Arc::new(MemoryProductRepository::new());
    let service = Arc::new(ProductService::new(repository));
    let peers = PeerClient::new();

    let gate = AuthGate::new(
        auth_endpoint.clone(),
        AuthGateOptions {
            timeout: Some(timeout),
            retries: Some(config.get_auth_retries(3)),
        },
        app_context.clone(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = register(
        "/products",
        ProductHandler::routes(service, peers, user_service_base.clone()),
        app_context,
    )
    .layer(middleware::from_fn_with_state(gate, verify_token))
    .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE))
    .layer(cors);

    let addr = config.get_bind_address(port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        %addr,
        auth = %auth_endpoint,
        users = %user_service_base,
        "product-service listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
