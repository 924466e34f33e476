//! Services layer for the identity service.
//!
//! Business logic for authentication, lockout, session tokens, and
//! role-scoped menu resolution.

mod auth;
pub mod error;
mod jwt;
mod lockout;
mod menu;

pub use auth::{AuthService, LoginOutcome, UnlockReport};
pub use error::ServiceError;
pub use jwt::{JwtService, SessionClaims, TokenRejection};
pub use lockout::{LockoutDecision, LockoutPolicy, LockoutState};
pub use menu::{resolve_menu, MenuService};
