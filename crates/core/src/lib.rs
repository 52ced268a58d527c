//! `vidaplena-core` — domain foundation for the storefront platform.
//!
//! Pure domain primitives only: typed identifiers, the domain error model and
//! the aggregate execution traits. No storage, no HTTP, no vendor SDKs.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, TenantId, UserId};
pub use value_object::ValueObject;
