//! Authentication and authorization
//!
//! - [`JwtService`] - token issue/validation
//! - [`CurrentUser`] - authenticated request context
//! - [`require_auth`] - authentication middleware
//! - [`require_role`] - role gate middleware

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_auth, require_role};
