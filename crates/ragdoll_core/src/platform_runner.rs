// crates/ragdoll_core/src/platform_runner.rs

use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::app::{App, AppError, Stage};
use crate::engine_loop::FrameClock;
use crate::input::poller;

/// Owns App and the stage and runs the platform (winit) event loop.
/// This isolates OS interaction from the engine core.
pub struct PlatformRunner<S: Stage> {
    app: App,
    stage: S,
}

impl<S: Stage + 'static> PlatformRunner<S> {
    pub fn new(app: App, stage: S) -> Self {
        Self { app, stage }
    }

    pub fn start(mut self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        let (width, height) = self.app.window_size;
        let window = WindowBuilder::new()
            .with_title(&self.app.window_title)
            .with_inner_size(LogicalSize::new(f64::from(width), f64::from(height)))
            .build(&event_loop)?;

        let mut clock = FrameClock::new(self.app.max_frame_dt);
        self.stage.on_load(self.app.hub());
        tracing::info!(title = %self.app.window_title, width, height, "window opened");

        event_loop.run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event: win_event, .. } => match win_event {
                    WindowEvent::CloseRequested => {
                        self.stage.on_unload();
                        elwt.exit();
                    }

                    // Raw keyboard input goes to the hub; the stage drains it.
                    WindowEvent::KeyboardInput { .. } => {
                        if let Some(raw) = poller::translate(&win_event) {
                            tracing::trace!(code = %raw.code, key = %raw.key, down = raw.is_down(), "key");
                            self.app.hub().emit(raw);
                        }
                    }

                    WindowEvent::Focused(false) => self.stage.focus_lost(),

                    _ => {}
                },

                Event::AboutToWait => {
                    let frame_dt = clock.tick();
                    self.app.step(&mut self.stage, frame_dt);
                    window.request_redraw();
                }

                _ => {}
            }
        })?;
        Ok(())
    }
}
