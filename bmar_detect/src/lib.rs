//! Level-threshold event detection: a background worker polls the capture
//! ring, drives a pre-roll/post-roll state machine, and publishes
//! [`worker::EventWorker`] requests for the scheduler's event archetype to
//! consume.

mod detector;
pub use detector::*;

mod worker;
pub use worker::*;
