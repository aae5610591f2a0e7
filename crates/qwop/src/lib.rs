// crates/qwop/src/lib.rs
//! QWOP-style demo: a keyboard-driven character with walk, run, jump, dance
//! and an additive wave.

pub mod controller;
pub mod keybinds;
pub mod stage;
pub mod states;

pub use stage::{default_model, QwopStage};
