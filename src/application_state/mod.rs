//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling
//! - Application lifecycle events
//! - State transitions between initialization and running states

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{GraphicsBuilder, GraphicsEvent, MaybeGraphics};
use input_manager::InputManager;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{config::ClientConfig, engine_state::EngineState, error::ClientError};

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the current state of the application, including graphics resources,
/// input handling, and window management. It implements `ApplicationHandler` to handle
/// window events.
pub struct ApplicationState {
    /// Settings the engine is created with
    pub config: ClientConfig,

    /// The graphics builder, until graphics have been handed to the engine
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// The error that stopped the event loop, if any
    pub error: Option<ClientError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The simulation and renderer
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,
}

fn is_exit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

impl ApplicationState {
    /// Creates the application in its uninitialized state.
    ///
    /// # Arguments
    /// * `config` - Validated client settings
    /// * `event_loop_proxy` - Receives the graphics once they are built
    pub fn new(config: ClientConfig, event_loop_proxy: EventLoopProxy<GraphicsEvent>) -> Self {
        Self {
            config,
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            state: None,
            error: None,
        }
    }

    /// Takes the error that stopped the event loop.
    pub fn take_error(&mut self) -> Option<ClientError> {
        self.error.take()
    }

    /// Transitions to the running state with freshly built graphics.
    fn initialize_application_state(&mut self, event: GraphicsEvent) -> Result<(), ClientError> {
        let graphics = event?;
        let window = graphics.window.clone();
        let engine_state = EngineState::new(&self.config, graphics)?;

        self.state = Some(InitializedApplicationState {
            engine_state,
            window,
            input_manager: InputManager::new(),
        });
        self.graphics = MaybeGraphics::Moved;
        log::info!("Application initialized");
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(state) = &mut self.state {
            state.engine_state.shutdown();
        }
    }
}

impl ApplicationHandler<GraphicsEvent> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `_window_id` - ID of the window that generated the event
    /// * `event` - The window event to process
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if is_exit_request(&event) {
            self.shutdown();
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };
        let input_manager = &mut state.input_manager;
        let engine_state = &mut state.engine_state;

        input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                engine_state.resize(size.width, size.height);
            }
            WindowEvent::Focused(false) => {
                input_manager.reset_inputs();
            }
            WindowEvent::RedrawRequested => {
                let input = input_manager.get_and_reset_processed_input();
                engine_state.run_frame(&input);
            }
            _ => (),
        }
    }

    /// Called when the application is resumed after being suspended.
    ///
    /// Starts graphics initialization the first time it runs.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop, &self.config.window);
        }
    }

    /// Receives the result of graphics initialization.
    ///
    /// A failure is kept for `run` to report and stops the event loop.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: GraphicsEvent) {
        if let Err(err) = self.initialize_application_state(event) {
            log::error!("Initialization failed: {}", err);
            self.error = Some(err);
            event_loop.exit();
        }
    }

    /// Requests the next frame once all pending events have been handled.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    /// Releases GPU resources before the window is destroyed.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
