//! Cross-layer integration tests for Cairn
//!
//! Tests that verify correct interaction between storage and engine.

mod tick_cycle;
