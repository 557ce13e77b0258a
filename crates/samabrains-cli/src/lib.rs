//! Client side of the `SamaBrains` contact relay.

pub mod form;
