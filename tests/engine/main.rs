//! Integration tests for Layer 2: Engine
//!
//! Tests for system registration, dispatch, and the tick scheduler.


use cairn_foundation::Component;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}
impl Component for Position {}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}
impl Component for Velocity {}
