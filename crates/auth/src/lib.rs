//! `vidaplena-auth` — authentication/authorization boundary.
//!
//! Pure policy types plus JWT validation. Decoupled from HTTP and storage;
//! sign-up/sign-in flows are out of scope (the platform only *validates*
//! tokens minted elsewhere).

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, CommandAuthorization, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use principal::{PrincipalId, TenantMembership};
pub use roles::Role;
