pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod interceptor;
pub mod locator;
pub mod middleware;
pub mod verifier;

pub use claims::Claims;
pub use config::{env_snapshot, resolve_config, InterceptorConfig, PartialConfig, Secret};
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use interceptor::{JwtHttpInterceptor, StatusSink};
pub use locator::{token_from_headers, token_from_query, TokenSource};
pub use verifier::{HmacVerifier, TokenVerifier};
