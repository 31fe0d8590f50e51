//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity registration.
#[derive(Clone, Copy, Debug)]
pub struct Registration;
