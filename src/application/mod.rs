//! Application layer containing the payment-form orchestration.
//!
//! This module defines the `PaymentController`, which drives one payment
//! attempt at a time. It uses an actor-like pattern with `tokio` channels:
//! the ticker, the gateway call and the timers are independent tasks that
//! report events into a single channel, and one reducer task owns every
//! state transition.

pub mod controller;
