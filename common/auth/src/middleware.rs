//! axum wiring for [`JwtHttpInterceptor`].
//!
//! ```ignore
//! let interceptor = Arc::new(JwtHttpInterceptor::from_env(secret, None, &env_snapshot())?);
//! let app = jwt_http_auth::middleware::apply(Router::new().route("/me", get(me)), interceptor);
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;

use crate::error::AuthError;
use crate::interceptor::{log_rejection, JwtHttpInterceptor};
use crate::verifier::TokenVerifier;

/// Put every route of `router` behind the interceptor.
pub fn apply<S, V>(router: Router<S>, interceptor: Arc<JwtHttpInterceptor<V>>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    V: TokenVerifier + 'static,
{
    router.layer(middleware::from_fn_with_state(interceptor, require_auth::<V>))
}

/// Authenticates the request and forwards it; rejects with 401 otherwise.
pub async fn require_auth<V>(
    State(interceptor): State<Arc<JwtHttpInterceptor<V>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    V: TokenVerifier + 'static,
{
    if let Err(err) = interceptor.authenticate(&mut req).await {
        log_rejection(&err, Some(req.uri().path()));
        return Err(err);
    }

    Ok(next.run(req).await)
}
