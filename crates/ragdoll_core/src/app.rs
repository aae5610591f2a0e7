// crates/ragdoll_core/src/app.rs
use thiserror::Error;

use crate::config::SandboxConfig;
use crate::input::KeyboardHub;
use crate::platform_runner::PlatformRunner;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("could not create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// What the sandbox drives. Keyboard events reach the stage through the hub
/// it subscribed to in `on_load`.
pub trait Stage {
    fn on_load(&mut self, _hub: &KeyboardHub) {}

    /// Drain and dispatch queued keyboard events. Runs before `update`.
    fn handle_input(&mut self) {}

    /// The window lost focus; releases for held keys will not arrive.
    fn focus_lost(&mut self) {}

    fn update(&mut self, dt: f32);

    fn on_unload(&mut self) {}
}

pub struct App {
    pub window_title: String,
    pub window_size: (u32, u32),
    pub max_frame_dt: f32,
    hub: KeyboardHub,
}

impl App {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            window_title: config.window_title.clone(),
            window_size: config.window_size,
            max_frame_dt: config.max_frame_dt,
            hub: KeyboardHub::new(),
        }
    }

    pub fn hub(&self) -> &KeyboardHub {
        &self.hub
    }

    /// One frame of the update phase.
    pub fn step<S: Stage + ?Sized>(&mut self, stage: &mut S, dt: f32) {
        stage.handle_input();
        stage.update(dt);
    }

    pub fn run<S: Stage + 'static>(self, stage: S) -> Result<(), AppError> {
        PlatformRunner::new(self, stage).start()
    }
}
