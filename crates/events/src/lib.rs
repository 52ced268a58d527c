//! Event-sourcing building blocks.
//!
//! Events are facts about tenant data (a product was rated, an order was
//! placed); this crate defines how they are described, wrapped for transport
//! and distributed to projections.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod tenant;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;
pub use tenant::TenantScoped;
