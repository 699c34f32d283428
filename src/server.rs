use axum::{
    extract::{DefaultBodyLimit, State},
    handler::Handler,
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post, MethodRouter},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{Endpoint, JwtKeys};
use crate::config::AppConfig;
use crate::database::RestaurantStore;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, require_policy};
use crate::services::RestaurantService;

/// Shared request context: the store and the token keys. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RestaurantStore>,
    jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(store: Arc<dyn RestaurantStore>, jwt: JwtKeys) -> Self {
        Self {
            store,
            jwt: Arc::new(jwt),
        }
    }

    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }

    pub fn store(&self) -> &Arc<dyn RestaurantStore> {
        &self.store
    }

    pub fn service(&self) -> RestaurantService {
        RestaurantService::new(self.store.clone())
    }
}

/// Full application router with the global layers configured from `config`.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes(&state))
        // Owner only
        .merge(owner_routes(&state))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes(state: &AppState) -> Router<AppState> {
    use public::restaurant;

    Router::new()
        .route("/restaurant", get(restaurant::list))
        .route(
            Endpoint::List.path(),
            endpoint_route(Endpoint::List, restaurant::list, state),
        )
        .route(
            Endpoint::Show.path(),
            endpoint_route(Endpoint::Show, restaurant::show, state),
        )
}

fn owner_routes(state: &AppState) -> Router<AppState> {
    use protected::restaurant;

    // Static segments win over `:restId`, so /restaurant/user and
    // /restaurant/create never reach the public show handler.
    Router::new()
        .route(
            Endpoint::Mine.path(),
            endpoint_route(Endpoint::Mine, restaurant::mine, state),
        )
        .route(
            Endpoint::Create.path(),
            endpoint_route(Endpoint::Create, restaurant::create, state),
        )
        .route(
            Endpoint::Edit.path(),
            endpoint_route(Endpoint::Edit, restaurant::edit, state),
        )
        .route(
            Endpoint::Delete.path(),
            endpoint_route(Endpoint::Delete, restaurant::delete, state),
        )
}

/// Route `handler` under the endpoint's method, guarded when its policy needs an identity.
fn endpoint_route<H, T>(
    endpoint: Endpoint,
    handler: H,
    state: &AppState,
) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    let method = endpoint.method();
    let route = if method == Method::POST {
        post(handler)
    } else if method == Method::DELETE {
        delete(handler)
    } else {
        get(handler)
    };

    if endpoint.policy().identity {
        guarded(route, endpoint, state)
    } else {
        route
    }
}

/// Wrap a method router in the identity check and the endpoint's role check.
/// Layers run outermost first, so the JWT layer is added last.
fn guarded(
    route: MethodRouter<AppState>,
    endpoint: Endpoint,
    state: &AppState,
) -> MethodRouter<AppState> {
    route
        .route_layer(middleware::from_fn(require_policy(endpoint.policy())))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(allowed)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Restaurant API",
            "version": version,
            "description": "Restaurant listings for the reservation app",
            "endpoints": {
                "list": "GET /restaurant/ (public)",
                "show": "GET /restaurant/:restId (public)",
                "mine": "GET /restaurant/user (owner)",
                "create": "POST /restaurant/create (owner)",
                "edit": "POST /restaurant/:restId/edit (owner of the record)",
                "delete": "DELETE /restaurant/:restId/delete (owner of the record)",
                "health": "GET /health (public)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store().backend();

    match state.store().health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": backend
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed for {} store: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": backend
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn call(router: Router, uri: &str) -> (StatusCode, Value) {
        send(router, Method::GET, uri).await
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_store_backend() {
        let (state, _) = memory_state();
        let (status, body) = call(app(state, &AppConfig::development()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["store"], "memory");
    }

    #[tokio::test]
    async fn owner_routes_reject_anonymous_callers() {
        let (state, _) = memory_state();
        let (status, body) = call(app(state, &AppConfig::development()), "/restaurant/user").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn every_endpoint_is_routed_with_its_policy() {
        let (state, _) = memory_state();
        let router = app(state, &AppConfig::development());
        let id = uuid::Uuid::new_v4().to_string();

        for endpoint in Endpoint::ALL {
            let uri = endpoint.path().replace(":restId", &id);
            let (status, _) = send(router.clone(), endpoint.method(), &uri).await;
            if endpoint.policy().identity {
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{:?}", endpoint);
            } else {
                assert!(
                    status == StatusCode::OK || status == StatusCode::NOT_FOUND,
                    "{:?} answered {}",
                    endpoint,
                    status
                );
            }
        }
    }
}
