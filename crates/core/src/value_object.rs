//! Value object trait: equality by value, not identity.

/// Marker trait for immutable, value-compared domain objects.
///
/// A header configuration or a payment channel is a value object: two with
/// the same attribute values are the same thing. An order is an entity: it
/// has an identity that survives attribute changes. "Modifying" a value
/// object means constructing a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
