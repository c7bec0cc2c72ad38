//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// A value object has no identity of its own: two instances with the same
/// attributes are the same value. Storage locations, product codes and actor
/// names are all value objects; they are referenced, never created or
/// destroyed.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
