//! Watermark gating for late-arriving facts.

pub mod gate;

pub use gate::{GateDecision, WatermarkGate};
