// crates/ragdoll_core/src/lib.rs

// Logic Modules
pub mod animation;
pub mod entity;
pub mod input;

// Runtime
pub mod app;
pub mod config;
pub mod engine_loop;
pub mod logging;
pub mod platform_runner;

// Re-export the pieces the sandbox binary and the demo reach for
pub use app::{App, AppError, Stage};
pub use config::{ConfigError, SandboxConfig};
pub use entity::Entity;
