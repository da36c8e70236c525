use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use celestial_hands::gpu::PointCloudRenderer;
use celestial_hands::input::{Input, KeyCode};
use celestial_hands::{Sculpture, ViewerError, Viewport, PLACEHOLDER_GREETING};

pub struct App {
    sculpture: Sculpture,
    input: Input,
    window: Option<Arc<Window>>,
    renderer: Option<PointCloudRenderer>,
    greeting: String,
    greetings: Option<Receiver<String>>,
    title: String,
    error: Option<ViewerError>,
}

impl App {
    pub fn new(sculpture: Sculpture, greetings: Receiver<String>) -> Self {
        Self {
            sculpture,
            input: Input::new(),
            window: None,
            renderer: None,
            greeting: PLACEHOLDER_GREETING.to_string(),
            greetings: Some(greetings),
            title: String::new(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: ViewerError) {
        error!(error = %e, "viewer stopped");
        self.error = Some(e);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title(PLACEHOLDER_GREETING)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(PointCloudRenderer::new(
            window.clone(),
            self.sculpture.particles().len(),
        ))?;

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        self.sculpture.set_viewport(logical_viewport(&window, size));
        info!(width = size.width, height = size.height, "window ready");

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn poll_greeting(&mut self) {
        let Some(rx) = &self.greetings else {
            return;
        };
        match rx.try_recv() {
            Ok(greeting) => {
                self.greeting = greeting;
                self.greetings = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.greetings = None,
        }
    }

    fn update_title(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let interaction = self.sculpture.interaction();
        let title = format!(
            "{} | Gesture {}: {} | {}",
            self.greeting,
            interaction.left_gesture_index(),
            self.sculpture.active_text(),
            interaction.steering_mode(),
        );
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }
        self.poll_greeting();

        let hands = self.input.hands(self.sculpture.config().selection_hand);
        self.sculpture.on_detection(&hands);
        self.sculpture.tick();

        if let Some(renderer) = &mut self.renderer {
            renderer.upload(self.sculpture.positions());
            match renderer.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.resize(winit::dpi::PhysicalSize {
                    width: renderer.config.width,
                    height: renderer.config.height,
                }),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("surface out of memory");
                    event_loop.exit();
                }
                Err(e) => warn!(error = ?e, "render error"),
            }
        }

        self.update_title();
        self.input.begin_frame();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn logical_viewport(window: &Window, size: winit::dpi::PhysicalSize<u32>) -> Viewport {
    let logical = size.to_logical::<f32>(window.scale_factor());
    Viewport::new(logical.width, logical.height)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                if physical_size.width == 0 || physical_size.height == 0 {
                    return;
                }
                if let Some(window) = &self.window {
                    let viewport = logical_viewport(window, physical_size);
                    self.sculpture.set_viewport(viewport);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => {}
        }
    }
}
