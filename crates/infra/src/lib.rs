//! Infrastructure layer: event store, dispatcher, read models, projections.
//!
//! The append-only event store, the command dispatch pipeline that every
//! write goes through, tenant-scoped read-model stores and the projections
//! that fill them. No HTTP here; the API crate composes these pieces.

pub mod command_dispatcher;
pub mod event_store;
pub mod projections;
pub mod read_model;
