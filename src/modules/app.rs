use crate::modules::config::AppConfig;
use crate::modules::error::{StartupError, StartupResult};
use crate::modules::state::{FrameOutcome, State};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// The render loop has exactly two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

pub struct App {
    config: AppConfig,
    state: Option<State>,
    loop_state: LoopState,
    started: bool,
    startup_error: Option<StartupError>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            loop_state: LoopState::Running,
            started: false,
            startup_error: None,
        }
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Creates the event loop, runs until the window closes and releases all
    /// GPU and window resources before returning.
    pub fn run(config: AppConfig) -> StartupResult<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(config);
        event_loop.run_app(&mut app)?;
        app.finish()
    }

    fn finish(mut self) -> StartupResult<()> {
        self.terminate();
        match self.startup_error.take() {
            Some(e) => Err(e),
            None if !self.started => Err(StartupError::NeverStarted),
            None => Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> StartupResult<()> {
        let window_config = &self.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(window_config.size)
            .with_resizable(window_config.resizable);
        let window = Arc::new(event_loop.create_window(attrs)?);
        log::info!(
            "window '{}' created at {}x{}",
            window_config.title,
            window_config.size.width,
            window_config.size.height
        );

        let state = pollster::block_on(State::new(window.clone(), &self.config))?;
        self.state = Some(state);
        self.started = true;
        window.request_redraw();
        Ok(())
    }

    /// Running -> Terminated. Drops the GPU state, which releases vertex data,
    /// program, then the context, in that order.
    fn terminate(&mut self) {
        if self.loop_state == LoopState::Terminated {
            return;
        }
        self.loop_state = LoopState::Terminated;
        if let Some(state) = self.state.take() {
            state.shutdown();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.loop_state == LoopState::Terminated {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            self.startup_error = Some(e);
            self.terminate();
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested; stopping");
                self.terminate();
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                if state.render() == FrameOutcome::Fatal {
                    self.terminate();
                    event_loop.exit();
                    return;
                }
                state.get_window().request_redraw();
            }

            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let app = App::new(AppConfig::default());
        assert_eq!(app.loop_state(), LoopState::Running);
        assert!(app.state.is_none());
    }

    #[test]
    fn terminate_is_one_way_and_idempotent() {
        let mut app = App::new(AppConfig::default());
        app.terminate();
        assert_eq!(app.loop_state(), LoopState::Terminated);
        app.terminate();
        assert_eq!(app.loop_state(), LoopState::Terminated);
    }

    #[test]
    fn finishing_without_a_window_is_a_startup_failure() {
        let app = App::new(AppConfig::default());
        assert!(matches!(app.finish(), Err(StartupError::NeverStarted)));
    }

    #[test]
    fn recorded_startup_error_is_returned() {
        let mut app = App::new(AppConfig::default());
        app.startup_error = Some(StartupError::NoSurfaceFormat);
        app.terminate();
        assert!(matches!(app.finish(), Err(StartupError::NoSurfaceFormat)));
    }
}
