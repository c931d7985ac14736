mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::AuthService;
use crate::features::auth::JwtValidator;
use crate::features::contact::{routes as contact_routes, ContactService, LogMailer};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::gallery::{routes as gallery_routes, GalleryService};
use crate::features::properties::routes as properties_routes;
use crate::features::properties::{Geocoder, NominatimGeocoder, PropertyService};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared services handed to the feature routers
struct AppServices {
    jwt_validator: Arc<JwtValidator>,
    auth: Arc<AuthService>,
    properties: Arc<PropertyService>,
    gallery: Arc<GalleryService>,
    dashboard: Arc<DashboardService>,
    admin: Arc<AdminService>,
    contact: Arc<ContactService>,
}

/// Every API route, without swagger and the outer tower layers
fn api_router(services: AppServices) -> Router {
    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .merge(properties_routes::protected_routes(Arc::clone(
            &services.properties,
        )))
        .merge(dashboard_routes::routes(services.dashboard))
        .merge(gallery_routes::routes(services.gallery))
        .nest("/api/admin", admin_routes::routes(services.admin))
        .route_layer(axum::middleware::from_fn_with_state(
            services.jwt_validator,
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(services.auth))
        .merge(properties_routes::public_routes(services.properties))
        .merge(contact_routes::routes(services.contact));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
}

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded (tokio_worker_threads={}, pid={})",
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Auth
    let jwt_validator = Arc::new(JwtValidator::new(
        &config.auth.jwt_secret,
        config.auth.issuer.clone(),
        config.auth.jwt_leeway,
        config.auth.token_ttl,
    ));
    let auth_service = Arc::new(AuthService::new(pool.clone(), Arc::clone(&jwt_validator)));
    if let Some((username, password)) = config.auth.bootstrap_admin() {
        if auth_service
            .ensure_bootstrap_admin(username, password)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create bootstrap admin: {}", e))?
        {
            tracing::info!("Bootstrap admin '{}' created", username);
        }
    }
    tracing::info!("Auth service initialized");

    let gallery_service = Arc::new(GalleryService::new(pool.clone()));

    let geocoder: Option<Arc<dyn Geocoder>> = if config.geocoding.enabled {
        let nominatim = NominatimGeocoder::new(&config.geocoding)
            .map_err(|e| anyhow::anyhow!("Failed to initialize geocoder: {}", e))?;
        tracing::info!("Geocoding enabled ({})", config.geocoding.base_url);
        Some(Arc::new(nominatim))
    } else {
        tracing::info!("Geocoding disabled");
        None
    };

    let property_service = Arc::new(PropertyService::new(
        pool.clone(),
        Arc::clone(&gallery_service),
        geocoder,
    ));
    let dashboard_service = Arc::new(DashboardService::new(pool.clone()));
    let admin_service = Arc::new(AdminService::new(pool.clone()));

    let contact_service = Arc::new(
        ContactService::new(Arc::new(LogMailer), config.contact.recipient.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize contact service: {}", e))?,
    );
    tracing::info!(
        "Contact messages delivered to {}",
        config.contact.recipient
    );

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let api = api_router(AppServices {
        jwt_validator,
        auth: auth_service,
        properties: property_service,
        gallery: gallery_service,
        dashboard: dashboard_service,
        admin: admin_service,
        contact: contact_service,
    });

    let app = Router::new()
        .merge(swagger)
        .merge(api)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::shared::test_helpers::lazy_pool;

    const SECRET: &str = "test-secret-test-secret-test-secret";

    fn test_server() -> (TestServer, Arc<JwtValidator>) {
        let pool = lazy_pool();
        let jwt_validator = Arc::new(JwtValidator::new(
            SECRET,
            "multicasa".to_string(),
            Duration::from_secs(0),
            Duration::from_secs(3600),
        ));
        let gallery = Arc::new(GalleryService::new(pool.clone()));
        let services = AppServices {
            jwt_validator: Arc::clone(&jwt_validator),
            auth: Arc::new(AuthService::new(pool.clone(), Arc::clone(&jwt_validator))),
            properties: Arc::new(PropertyService::new(
                pool.clone(),
                Arc::clone(&gallery),
                None,
            )),
            gallery,
            dashboard: Arc::new(DashboardService::new(pool.clone())),
            admin: Arc::new(AdminService::new(pool)),
            contact: Arc::new(
                ContactService::new(Arc::new(LogMailer), "office@example.com".to_string())
                    .unwrap(),
            ),
        };
        (TestServer::new(api_router(services)).unwrap(), jwt_validator)
    }

    fn admin_token(jwt: &JwtValidator) -> String {
        jwt.issue_token("admin-id", "admin", vec!["admin".to_string()])
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (server, _) = test_server();
        server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let (server, _) = test_server();

        for path in ["/api/dashboard", "/api/auth/me", "/api/admin/properties"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(response.json::<Value>()["success"], false);
        }

        server
            .post("/api/properties")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/api/properties/0191f1a2-0000-7000-8000-000000000001")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_bad_token() {
        let (server, _) = test_server();
        server
            .get("/api/dashboard")
            .authorization_bearer("not-a-jwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden_from_back_office() {
        let (server, jwt) = test_server();
        let token = jwt.issue_token("staff-id", "staff", vec![]).unwrap();

        server
            .get("/api/dashboard")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_me_echoes_token_claims() {
        let (server, jwt) = test_server();
        let response = server
            .get("/api/auth/me")
            .authorization_bearer(admin_token(&jwt))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"]["username"], "admin");
        assert_eq!(body["data"]["roles"], json!(["admin"]));
    }

    #[tokio::test]
    async fn test_create_property_reports_field_errors() {
        let (server, jwt) = test_server();
        let response = server
            .post("/api/properties")
            .authorization_bearer(admin_token(&jwt))
            .json(&json!({
                "title": "",
                "description": "Casa",
                "price": "-5",
                "address": "Av. Guadalupe 1200",
                "municipality": "Zapopan",
                "state": "Jalisco",
                "postal_code": "45",
                "bedrooms": 3,
                "bathrooms": 2,
                "surface_m2": 120
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        let fields = &body["field_errors"];
        assert!(fields["title"].is_array());
        assert!(fields["price"].is_array());
        assert!(fields["postal_code"].is_array());
    }

    #[tokio::test]
    async fn test_public_search_and_filter_reject_bad_input() {
        let (server, _) = test_server();

        server
            .get("/api/properties/search")
            .add_query_param("q", "   ")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .get("/api/properties/filter")
            .add_query_param("garage", "2")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .get("/api/listings")
            .add_query_param("bedrooms", "many")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_pagination_answers_in_envelope() {
        let (server, jwt) = test_server();

        let response = server
            .get("/api/properties")
            .add_query_param("page", "abc")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("page"));

        let response = server
            .get("/api/admin/gallery")
            .authorization_bearer(admin_token(&jwt))
            .add_query_param("page_size", "lots")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_contact_form() {
        let (server, _) = test_server();

        let response = server
            .post("/api/contact")
            .json(&json!({
                "name": "Lucía",
                "email": "lucia@example.com",
                "message": "Me interesa la casa de Zapopan"
            }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["success"], true);

        let response = server
            .post("/api/contact")
            .json(&json!({ "name": "", "email": "nope", "message": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(body["field_errors"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_contact_rejects_blank_and_multiline_names() {
        let (server, _) = test_server();

        for name in ["   ", "Ana\r\nBcc: spam@example.com"] {
            let response = server
                .post("/api/contact")
                .json(&json!({
                    "name": name,
                    "email": " ana@example.com ",
                    "message": "Hola"
                }))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body = response.json::<Value>();
            assert_eq!(body["success"], false);
            assert!(body["field_errors"]["name"].is_array());
            assert!(body["field_errors"]["email"].is_null());
        }
    }

    #[tokio::test]
    async fn test_gallery_upload_rejects_non_images() {
        use axum_test::multipart::{MultipartForm, Part};

        let (server, jwt) = test_server();
        let form = MultipartForm::new().add_text("name", "Notes").add_part(
            "file",
            Part::bytes(b"plain text".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );

        let response = server
            .post("/api/admin/gallery")
            .authorization_bearer(admin_token(&jwt))
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let message = response.json::<Value>()["message"].as_str().unwrap().to_string();
        assert!(message.contains("text/plain"));
    }

    #[tokio::test]
    async fn test_bulk_action_requires_ids() {
        let (server, jwt) = test_server();
        server
            .post("/api/admin/properties/bulk-delete")
            .authorization_bearer(admin_token(&jwt))
            .json(&json!({ "ids": [] }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
