use axum::{extract::Request, middleware::Next, response::Response};
use std::future::Future;
use std::pin::Pin;

use super::auth::AuthUser;
use crate::auth::AccessPolicy;
use crate::error::ApiError;

type PolicyFuture = Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>;

/// Role check for a route. Must sit inside [`super::jwt_auth_middleware`]
/// so the caller identity is already attached to the request.
///
/// ```ignore
/// post(create)
///     .route_layer(middleware::from_fn(require_policy(Endpoint::Create.policy())))
///     .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
/// ```
pub fn require_policy(
    policy: AccessPolicy,
) -> impl Fn(Request, Next) -> PolicyFuture + Clone + Send + Sync + 'static {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let caller = request.extensions().get::<AuthUser>();

            if let Err(denied) = policy.check_caller(caller) {
                tracing::warn!(
                    "Access denied for {} {}: {}",
                    request.method(),
                    request.uri().path(),
                    denied
                );
                return Err(denied.into());
            }

            Ok(next.run(request).await)
        })
    }
}
