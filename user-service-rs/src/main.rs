// user-service-rs/src/main.rs
// User listing service.

use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use service_core::pipeline::MAX_PAYLOAD_SIZE;
use service_core::sink::StdoutSink;
use service_core::{init_logging, register, AppContext, LogSink, LoggingConfig, ServiceConfig};

use user_service::{MemoryUserRepository, UserHandler, UserService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    init_logging(Some(LoggingConfig {
        service_name: "user-service".to_string(),
        ..LoggingConfig::default()
    }));

    let config = ServiceConfig::new("user-service");
    let port = config.get_service_port(3001);

    let sink: Arc<dyn LogSink> = Arc::new(StdoutSink);
    let app_context = AppContext::new("user-service", sink);

    let repository = Arc::new(MemoryUserRepository::seeded());
    let service = Arc::new(UserService::new(repository));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = register("/users", UserHandler::routes(service), app_context)
        .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE))
        .layer(cors);

    let addr = config.get_bind_address(port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "user-service listening");

    axum::serve(listener, app).await?;

    Ok(())
}
