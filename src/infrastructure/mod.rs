//! Gateway adapters: the in-process payment simulation and the
//! degraded-mode fallback decorator.

pub mod fallback;
pub mod simulated;
