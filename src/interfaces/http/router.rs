//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, EmptyData};
use super::middleware::require_session;
use super::modules::auth::{self, AuthHandlerState};
use super::modules::health::{self, HealthState};
use super::modules::request_id::request_id_middleware;
use crate::application::AuthService;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by /login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        auth::register,
        auth::load_profile,
        auth::update_profile,
        auth::delete_user,
    ),
    components(
        schemas(
            ApiResponse<String>,
            EmptyData,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::UpdateProfileRequest,
            auth::ProfileDto,
            health::HealthReport,
            health::HealthStatus,
            health::StoreCheck,
            health::RevocationSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Authentication", description = "Registration, login/logout with session tokens, profile and account deletion"),
    ),
    info(
        title = "Auth Service API",
        version = "1.0.0",
        description = "Session authentication: password credentials, signed expiring tokens, revocation",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(auth_service: Arc<AuthService>) -> Router {
    let auth_state = AuthHandlerState {
        auth: auth_service.clone(),
    };

    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register));

    let protected_routes = Router::new()
        .route("/user", get(auth::load_profile).put(auth::update_profile))
        .route("/delete/user", delete(auth::delete_user))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_session,
        ));

    let auth_routes = public_routes.merge(protected_routes).with_state(auth_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            auth: auth_service,
            started_at: Arc::new(Instant::now()),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes =
        SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/auth", auth_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::AuthSettings;
    use crate::infrastructure::crypto::jwt::JwtConfig;
    use crate::domain::CredentialStore;
    use crate::infrastructure::storage::{InMemoryCredentialStore, UnavailableCredentialStore};

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt: JwtConfig {
                secret: "router-test-secret".into(),
                expiration_hours: 24,
                issuer: "auth-service".into(),
            },
            bcrypt_cost: 4,
        }
    }

    fn app_with_store(store: Arc<dyn CredentialStore>) -> (Router, Arc<AuthService>) {
        let auth = Arc::new(AuthService::with_system_clock(store, settings()));
        (create_api_router(auth.clone()), auth)
    }

    fn app() -> (Router, Arc<AuthService>) {
        app_with_store(Arc::new(InMemoryCredentialStore::new()))
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
        let creds = json!({"username": username, "password": password});
        let (status, _) = call(app, "POST", "/api/v1/auth/register", None, Some(creds.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(app, "POST", "/api/v1/auth/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn session_lifecycle_over_http() {
        let (app, _) = app();
        let token = register_and_login(&app, "alice", "pw1").await;

        let (status, body) = call(&app, "GET", "/api/v1/auth/user", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "alice");
        assert_eq!(body["data"]["role"], "user");

        let (status, _) = call(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "GET", "/api/v1/auth/user", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn login_response_carries_expiry() {
        let (app, _) = app();
        register_and_login(&app, "alice", "pw1").await;

        let creds = json!({"username": "alice", "password": "pw1"});
        let (_, body) = call(&app, "POST", "/api/v1/auth/login", None, Some(creds)).await;
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert_eq!(body["data"]["expires_in"], 24 * 3600);
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let (app, _) = app();
        let (status, _) = call(&app, "GET", "/api/v1/auth/user", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, "GET", "/api/v1/auth/user", Some("not.a.token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, "DELETE", "/api/v1/auth/delete/user", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (app, _) = app();
        register_and_login(&app, "alice", "pw1").await;

        let creds = json!({"username": "alice", "password": "other"});
        let (status, body) = call(&app, "POST", "/api/v1/auth/register", None, Some(creds)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_alike() {
        let (app, _) = app();
        register_and_login(&app, "alice", "pw1").await;

        let wrong = json!({"username": "alice", "password": "nope"});
        let (s1, b1) = call(&app, "POST", "/api/v1/auth/login", None, Some(wrong)).await;
        let ghost = json!({"username": "ghost", "password": "nope"});
        let (s2, b2) = call(&app, "POST", "/api/v1/auth/login", None, Some(ghost)).await;

        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!(s2, StatusCode::UNAUTHORIZED);
        assert_eq!(b1["error"], b2["error"]);
    }

    #[tokio::test]
    async fn invalid_register_body_is_rejected() {
        let (app, _) = app();
        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"username": "al", "password": "pw1"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn profile_update_round_trip() {
        let (app, _) = app();
        let token = register_and_login(&app, "alice", "pw1").await;

        let (status, body) = call(
            &app,
            "PUT",
            "/api/v1/auth/user",
            Some(&token),
            Some(json!({"email": "alice@example.com", "display_name": "Alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "alice@example.com");

        let (status, _) = call(
            &app,
            "PUT",
            "/api/v1/auth/user",
            Some(&token),
            Some(json!({"email": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn self_delete_revokes_session() {
        let (app, _) = app();
        let token = register_and_login(&app, "alice", "pw1").await;

        let (status, _) = call(&app, "DELETE", "/api/v1/auth/delete/user", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "GET", "/api/v1/auth/user", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let creds = json!({"username": "alice", "password": "pw1"});
        let (status, _) = call(&app, "POST", "/api/v1/auth/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleting_another_user_needs_admin() {
        let (app, _) = app();
        let alice = register_and_login(&app, "alice", "pw1").await;
        let bob = register_and_login(&app, "bob", "pw2").await;

        let (status, body) = call(
            &app,
            "DELETE",
            "/api/v1/auth/delete/user?username=bob",
            Some(&alice),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);

        let (status, _) = call(&app, "GET", "/api/v1/auth/user", Some(&bob), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_deletes_other_user() {
        let (app, auth) = app();
        assert!(auth.bootstrap_admin("root", "rootpw").await.unwrap());
        let admin = {
            let creds = json!({"username": "root", "password": "rootpw"});
            let (_, body) = call(&app, "POST", "/api/v1/auth/login", None, Some(creds)).await;
            body["data"]["token"].as_str().unwrap().to_string()
        };
        let bob = register_and_login(&app, "bob", "pw2").await;

        let (status, _) = call(
            &app,
            "DELETE",
            "/api/v1/auth/delete/user?username=bob",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "GET", "/api/v1/auth/user", Some(&bob), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &app,
            "DELETE",
            "/api/v1/auth/delete/user?username=bob",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();
        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"]["reachable"], true);
        assert_eq!(body["revocations"]["revoked_tokens"], 0);
        assert_eq!(body["revocations"]["persisted"], false);
    }

    #[tokio::test]
    async fn store_outage_is_503_with_generic_message() {
        let (app, _) = app_with_store(Arc::new(UnavailableCredentialStore));
        let creds = json!({"username": "alice", "password": "pw1"});

        let (status, body) =
            call(&app, "POST", "/api/v1/auth/login", None, Some(creds.clone())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Service temporarily unavailable");

        let (status, body) = call(&app, "POST", "/api/v1/auth/register", None, Some(creds)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Service temporarily unavailable");

        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["store"]["reachable"], false);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (app, _) = app();
        let (status, body) = call(&app, "GET", "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/auth/login"].is_object());
    }
}
