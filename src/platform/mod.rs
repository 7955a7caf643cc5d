//=========================================================================
// Winit Host Integration
//
// Reference host platform: owns a winit window and drives one engine
// through the same lifecycle a C host performs over the ABI.
//
// Architecture:
// ```text
//  Main Thread (host):                      Render Thread (engine):
//  ┌──────────────────────────────┐        ┌──────────────────────┐
//  │  Winit Event Loop            │        │  RenderOrchestrator  │
//  │   resumed ──► create window  │        │                      │
//  │      └─► notify_surface_created ─────►│  frames start        │
//  │   Resized / ScaleFactor      │        │                      │
//  │      └─► send_window_metrics ────────►│  next frame resized  │
//  │   Cursor / MouseInput        │        │                      │
//  │      └─► InputProcessor      │        │                      │
//  │          └─► pending batch   │        │                      │
//  │   RedrawRequested (flush) ───┼───────►│  PointerSystem       │
//  │   suspended / CloseRequested │        │                      │
//  │      └─► notify_surface_destroyed ◄──►│  barrier (frame done)│
//  │          drop window         │        │                      │
//  └──────────────────────────────┘        └──────────────────────┘
// ```
//
// Key Design Decisions:
// - **Surface follows the window**: the surface is bound right after the
//   window is created and unbound before the window is dropped, never
//   the other way round
// - **RedrawRequested = pointer flush boundary**: samples are batched
//   and sent atomically, preserving order
// - **Main thread requirement**: winit mandates the main thread on
//   macOS/iOS, so `run()` must be called from it
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;

//=== External Crates =====================================================

use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::input::{PointerEvent, WindowMetrics};
use crate::engine::Engine;
use crate::surface::SurfaceId;
use input_processor::InputProcessor;

//=== PlatformError =======================================================

/// Event loop failures. These are fatal for the host.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Failed to create event loop (rare, indicates OS-level issue).
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(winit::error::EventLoopError),

    /// Event loop execution error.
    #[error("Event loop error: {0}")]
    EventLoopExecution(winit::error::EventLoopError),
}

//=== WinitHost ===========================================================

/// Window owner and event forwarder for one engine.
///
/// # Lifecycle
///
/// 1. **Construction**: `WinitHost::new(engine)`
/// 2. **Execution**: `host.run()` blocks on the event loop
/// 3. **Resume**: window created → surface bound → metrics sent
/// 4. **Suspend / Close**: surface unbound (barrier) → window dropped
/// 5. **Exit**: engine shut down before `run()` returns
///
/// # Thread Safety
///
/// Not Send: it must stay on the main thread. The engine it drives is
/// reached only through its non-blocking injection calls and the
/// surface notifications.
pub struct WinitHost {
    engine: Engine,
    window: Option<Window>,
    attributes: WindowAttributes,
    on_window_created: Option<Box<dyn FnMut(&Window)>>,
    input_processor: InputProcessor,
    pending_pointers: Vec<PointerEvent>,
    scale_factor: f64,
}

impl WinitHost {
    //--- Construction -----------------------------------------------------

    /// Wraps a started engine. The window is created lazily on resume.
    pub fn new(engine: Engine) -> Self {
        info!(target: "platform", "Winit host initialized");
        Self {
            engine,
            window: None,
            attributes: WindowAttributes::default()
                .with_title("Aetheric Embedder")
                .with_inner_size(LogicalSize::new(800, 600)),
            on_window_created: None,
            input_processor: InputProcessor::new(),
            pending_pointers: Vec::with_capacity(32),
            scale_factor: 1.0,
        }
    }

    /// Overrides the attributes used to create the window.
    pub fn with_window_attributes(mut self, attributes: WindowAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Runs `hook` after the window exists but before the surface is bound.
    ///
    /// This is where the host sets up the GL context its renderer binding
    /// will make current.
    pub fn on_window_created<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Window) + 'static,
    {
        self.on_window_created = Some(Box::new(hook));
        self
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window closes, then shuts the engine down.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// fails while running.
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        let outcome = event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution);

        self.release_surface();
        if let Err(e) = self.engine.shutdown() {
            warn!(target: "platform", "Engine shutdown after event loop: {}", e);
        }
        outcome
    }

    //--- Internal Helpers -------------------------------------------------

    fn send_metrics(&self, size: PhysicalSize<u32>) {
        let metrics = WindowMetrics::new(size.width as usize, size.height as usize, self.scale_factor);
        if let Err(e) = self.engine.send_window_metrics(metrics) {
            warn!(target: "platform", "Window metrics rejected: {}", e);
        }
    }

    fn queue_pointer(&mut self, event: Option<PointerEvent>) {
        if let Some(event) = event {
            self.pending_pointers.push(event);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    /// Sends buffered pointer samples as one ordered batch.
    fn flush_pointers(&mut self) {
        if self.pending_pointers.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.pending_pointers);
        trace!(target: "platform::input", "Flushing {} pointer samples", batch.len());
        if let Err(e) = self.engine.send_pointer_events(&batch) {
            warn!(target: "platform::input", "Dropping {} pointer samples: {}", batch.len(), e);
        }
    }

    /// Unbinds the surface (blocking on the in-flight frame), then drops the window.
    fn release_surface(&mut self) {
        self.flush_pointers();
        if self.engine.surface().is_some() {
            self.engine.notify_surface_destroyed();
        }
        if self.window.take().is_some() {
            debug!(target: "platform", "Window released");
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for WinitHost {
    /// Startup or mobile resume: create the window and bind the surface.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let window = match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => window,
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        let surface = SurfaceId(u64::from(window.id()));
        if surface.is_null() {
            error!(target: "platform", "Window reported a null id, cannot bind surface");
            event_loop.exit();
            return;
        }

        if let Some(hook) = self.on_window_created.as_mut() {
            hook(&window);
        }

        self.scale_factor = window.scale_factor();
        let size = window.inner_size();
        info!(
            target: "platform",
            "Window created: {}x{} @ {}x DPI",
            size.width,
            size.height,
            self.scale_factor
        );

        self.window = Some(window);
        self.engine.notify_surface_created(surface);
        self.send_metrics(size);
    }

    /// Mobile suspend: the native surface is about to go away.
    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        info!(target: "platform", "Suspended, releasing surface");
        self.release_surface();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.release_surface();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => self.send_metrics(size),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(size) = self.window.as_ref().map(Window::inner_size) {
                    self.send_metrics(size);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let timestamp = self.input_processor.timestamp();
                let event = self.input_processor.process_cursor_moved(position.x, position.y, timestamp);
                self.queue_pointer(event);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let timestamp = self.input_processor.timestamp();
                let event = self.input_processor.process_mouse_button(button, state, timestamp);
                self.queue_pointer(event);
            }

            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                let timestamp = self.input_processor.timestamp();
                let event = self.input_processor.process_cursor_left(timestamp);
                self.queue_pointer(event);
            }

            WindowEvent::RedrawRequested => self.flush_pointers(),

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::PointerPhase;
    use crate::engine::EngineBuilder;
    use crate::project::ProjectArgs;
    use crate::renderer::{OpenGlRenderer, RendererConfig};
    use crate::ENGINE_VERSION;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    struct NullGl;

    impl OpenGlRenderer for NullGl {
        fn make_current(&mut self) -> bool { true }
        fn clear_current(&mut self) -> bool { true }
        fn present(&mut self) -> bool { true }
        fn fbo(&mut self) -> u32 { 0 }
    }

    fn host_with_sink() -> (WinitHost, Arc<Mutex<Vec<PointerPhase>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let engine = EngineBuilder::new(
            RendererConfig::open_gl(NullGl),
            ProjectArgs::new("app.flx", "lib/main.dart", ".packages"),
        )
        .with_frame_rate(500.0)
        .with_pointer_sink(move |e: &PointerEvent| sink.lock().push(e.phase))
        .start(ENGINE_VERSION)
        .unwrap();
        (WinitHost::new(engine), seen)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn host_creation_is_lazy() {
        let (host, _) = host_with_sink();
        assert!(host.window.is_none(), "Window should be created lazily");
        assert!(host.engine.surface().is_none());
    }

    #[test]
    fn flush_empty_batch_is_noop() {
        let (mut host, seen) = host_with_sink();
        host.flush_pointers();
        thread::sleep(Duration::from_millis(20));
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn flush_sends_queued_samples_in_order() {
        let (mut host, seen) = host_with_sink();
        host.queue_pointer(Some(PointerEvent::new(PointerPhase::Down, 1, 0.0, 0.0)));
        host.queue_pointer(None);
        host.queue_pointer(Some(PointerEvent::new(PointerPhase::Up, 2, 0.0, 0.0)));

        host.flush_pointers();

        assert!(host.pending_pointers.is_empty());
        assert!(wait_until(|| seen.lock().len() == 2));
        assert_eq!(*seen.lock(), vec![PointerPhase::Down, PointerPhase::Up]);
    }

    #[test]
    fn release_without_surface_is_noop() {
        let (mut host, _) = host_with_sink();
        host.release_surface();
        assert!(host.engine.surface().is_none());
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
