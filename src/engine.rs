//=========================================================================
// Aetheric Embedder: Engine
//
// Lifecycle and event-injection facade for one engine instance.
//
// Architecture:
// ```text
//     EngineBuilder  ──start(version)──>  Engine  ──shutdown()──>  [joined]
//         │                                 │
//         ├─ with_frame_rate()              ├─ send_window_metrics()
//         ├─ with_message_handler()         ├─ send_pointer_events()
//         ├─ with_pointer_sink()            ├─ send_platform_message()
//         └─ with_frame_observer()          ├─ notify_surface_created()
//                                           └─ notify_surface_destroyed()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Sender};
use log::{debug, error, info};
use parking_lot::Mutex;
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::frame::FrameObserver;
use crate::core::input::{PointerEvent, PointerSink, PointerSystem, WindowMetrics};
use crate::core::message_bus::{ChannelRegistry, MessageHandler, PlatformMessage};
use crate::core::platform_bridge::EngineEvent;
use crate::core::RenderOrchestrator;
use crate::error::EmbedderError;
use crate::project::ProjectArgs;
use crate::renderer::RendererConfig;
use crate::surface::{SurfaceController, SurfaceGate, SurfaceId};
use crate::ENGINE_VERSION;

//=== EngineBuilder =======================================================

/// Builder for configuring and starting an [`Engine`].
///
/// # Default Values
///
/// - **Frame rate**: 60.0 frames per second
/// - No message handlers, pointer sinks or frame observers
///
/// # Examples
///
/// ```no_run
/// use aetheric_embedder::{EngineBuilder, ProjectArgs, RendererConfig, ENGINE_VERSION};
/// # use aetheric_embedder::OpenGlRenderer;
/// # struct HostGl;
/// # impl OpenGlRenderer for HostGl {
/// #     fn make_current(&mut self) -> bool { true }
/// #     fn clear_current(&mut self) -> bool { true }
/// #     fn present(&mut self) -> bool { true }
/// #     fn fbo(&mut self) -> u32 { 0 }
/// # }
///
/// let engine = EngineBuilder::new(
///         RendererConfig::open_gl(HostGl),
///         ProjectArgs::new("app.flx", "lib/main.dart", ".packages"),
///     )
///     .with_frame_rate(120.0)
///     .with_message_handler("app/settings", |payload: &[u8]| {
///         println!("settings: {} bytes", payload.len());
///     })
///     .start(ENGINE_VERSION)
///     .expect("engine failed to start");
///
/// engine.shutdown().unwrap();
/// ```
pub struct EngineBuilder {
    renderer: RendererConfig,
    project: ProjectArgs,
    frame_rate: f64,
    channels: ChannelRegistry,
    pointer_sinks: Vec<Box<dyn PointerSink>>,
    frame_observers: Vec<Box<dyn FrameObserver>>,
}

impl EngineBuilder {
    /// Creates a builder with default settings.
    pub fn new(renderer: RendererConfig, project: ProjectArgs) -> Self {
        Self {
            renderer,
            project,
            frame_rate: 60.0,
            channels: ChannelRegistry::new(),
            pointer_sinks: Vec::new(),
            frame_observers: Vec::new(),
        }
    }

    /// Sets the target frame rate of the render thread.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `frame_rate` is not finite or `<= 0.0`.
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        assert!(
            frame_rate.is_finite() && frame_rate > 0.0,
            "Frame rate must be positive, got {}",
            frame_rate
        );
        self.frame_rate = frame_rate;
        self
    }

    /// Registers the engine subsystem listening on `channel`.
    pub fn with_message_handler<H>(mut self, channel: impl Into<String>, handler: H) -> Self
    where
        H: MessageHandler + 'static,
    {
        self.channels.register(channel, Box::new(handler));
        self
    }

    /// Adds a consumer for pointer samples.
    pub fn with_pointer_sink<P>(mut self, sink: P) -> Self
    where
        P: PointerSink + 'static,
    {
        self.pointer_sinks.push(Box::new(sink));
        self
    }

    /// Adds an observer notified after every drawn frame.
    pub fn with_frame_observer<O>(mut self, observer: O) -> Self
    where
        O: FrameObserver + 'static,
    {
        self.frame_observers.push(Box::new(observer));
        self
    }

    /// Validates the configuration and spins up the render thread.
    ///
    /// No renderer capability is invoked until a surface is bound.
    ///
    /// # Errors
    ///
    /// - [`EmbedderError::InvalidLibraryVersion`] if `version` differs
    ///   from [`ENGINE_VERSION`]
    /// - [`EmbedderError::InvalidArguments`] if the project args are unusable
    /// - [`EmbedderError::RenderThreadSpawn`] if the OS refuses the thread
    pub fn start(self, version: usize) -> Result<Engine, EmbedderError> {
        if version != ENGINE_VERSION {
            return Err(EmbedderError::InvalidLibraryVersion {
                expected: ENGINE_VERSION,
                found: version,
            });
        }
        self.project.validate()?;

        info!(
            target: "embedder::engine",
            "Starting engine ({} renderer, {} fps, assets {:?}, main {:?})",
            self.renderer.backend_name(),
            self.frame_rate,
            self.project.assets_path(),
            self.project.main_path()
        );

        let (sender, receiver) = unbounded();
        let gate = Arc::new(SurfaceGate::new());

        let orchestrator = RenderOrchestrator::new(
            self.renderer,
            PointerSystem::new(self.pointer_sinks),
            self.channels,
            self.frame_observers,
        );
        let render_thread = orchestrator
            .spawn_render_thread(receiver, Arc::clone(&gate), self.frame_rate)
            .map_err(|e| EmbedderError::RenderThreadSpawn(e.to_string()))?;

        Ok(Engine {
            sender,
            surface: Mutex::new(SurfaceController::new(gate)),
            render_thread: Mutex::new(Some(render_thread)),
            project: self.project,
        })
    }
}

//=== Engine ==============================================================

/// A running engine instance.
///
/// All methods take `&self`; injection calls never block on rendering.
/// Dropping the engine shuts it down.
pub struct Engine {
    sender: Sender<EngineEvent>,
    surface: Mutex<SurfaceController>,
    render_thread: Mutex<Option<JoinHandle<()>>>,
    project: ProjectArgs,
}

impl Engine {
    //--- Queries ----------------------------------------------------------

    /// Project this engine was started with.
    pub fn project(&self) -> &ProjectArgs {
        &self.project
    }

    /// Returns `true` until the engine has been shut down.
    pub fn is_running(&self) -> bool {
        self.render_thread.lock().is_some()
    }

    /// Surface currently bound, if any.
    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface.lock().surface()
    }

    //--- Event Injection --------------------------------------------------

    /// Updates the drawable size and scale used by subsequent frames.
    pub fn send_window_metrics(&self, metrics: WindowMetrics) -> Result<(), EmbedderError> {
        metrics.validate()?;
        self.enqueue(EngineEvent::WindowMetrics(metrics))
    }

    /// Delivers an ordered pointer batch. An empty batch is a no-op.
    pub fn send_pointer_events(&self, events: &[PointerEvent]) -> Result<(), EmbedderError> {
        if events.is_empty() {
            return self.ensure_running();
        }
        self.enqueue(EngineEvent::Pointers(events.to_vec()))
    }

    /// Delivers a payload to the handler registered for its channel.
    ///
    /// Messages for unregistered channels are accepted and dropped.
    pub fn send_platform_message(&self, message: PlatformMessage) -> Result<(), EmbedderError> {
        self.enqueue(EngineEvent::PlatformMessage(message))
    }

    //--- Surface Lifecycle ------------------------------------------------

    /// Lets the engine render to `surface`.
    ///
    /// # Panics
    ///
    /// Panics if a surface is already bound or `surface` is null.
    pub fn notify_surface_created(&self, surface: SurfaceId) {
        self.surface.lock().notify_created(surface);
    }

    /// Revokes rendering; returns once no frame uses the surface.
    ///
    /// # Panics
    ///
    /// Panics if no surface is bound.
    pub fn notify_surface_destroyed(&self) -> SurfaceId {
        self.surface.lock().notify_destroyed()
    }

    //--- Shutdown ---------------------------------------------------------

    /// Stops the render thread and waits for it to finish.
    pub fn shutdown(self) -> Result<(), EmbedderError> {
        self.stop()
    }

    /// Idempotent stop shared by `shutdown`, `Drop` and the C ABI.
    pub(crate) fn stop(&self) -> Result<(), EmbedderError> {
        let handle = self
            .render_thread
            .lock()
            .take()
            .ok_or(EmbedderError::EngineShutDown)?;

        // The loop also exits on disconnect, so a failed send is harmless.
        let _ = self.sender.send(EngineEvent::Shutdown);

        match handle.join() {
            Ok(()) => debug!(target: "embedder::engine", "Render thread joined"),
            Err(e) => error!(target: "embedder::engine", "Render thread panicked: {:?}", e),
        }

        if let Some(surface) = self.surface() {
            debug!(target: "embedder::engine", "Shut down with surface {} still bound", surface.0);
        }

        info!(target: "embedder::engine", "Engine shutdown complete");
        Ok(())
    }

    //--- Internal Helpers -------------------------------------------------

    fn ensure_running(&self) -> Result<(), EmbedderError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(EmbedderError::EngineShutDown)
        }
    }

    fn enqueue(&self, event: EngineEvent) -> Result<(), EmbedderError> {
        self.ensure_running()?;
        self.sender
            .send(event)
            .map_err(|_| EmbedderError::EngineShutDown)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::FrameInfo;
    use crate::core::input::PointerPhase;
    use crate::renderer::OpenGlRenderer;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    //--- Test Helpers -----------------------------------------------------

    /// Counts every capability call and flags calls made without a surface.
    #[derive(Clone, Default)]
    struct InstrumentedGl {
        make_current: Arc<AtomicUsize>,
        present: Arc<AtomicUsize>,
        surface_alive: Arc<AtomicBool>,
        violations: Arc<AtomicUsize>,
        in_present: Arc<AtomicBool>,
        present_delay_ms: Arc<AtomicU64>,
    }

    impl InstrumentedGl {
        fn check(&self) {
            if !self.surface_alive.load(Ordering::SeqCst) {
                self.violations.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn calls(&self) -> (usize, usize) {
            (self.make_current.load(Ordering::SeqCst), self.present.load(Ordering::SeqCst))
        }
    }

    impl OpenGlRenderer for InstrumentedGl {
        fn make_current(&mut self) -> bool {
            self.check();
            self.make_current.fetch_add(1, Ordering::SeqCst);
            true
        }
        fn clear_current(&mut self) -> bool {
            self.check();
            true
        }
        fn present(&mut self) -> bool {
            self.check();
            self.in_present.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(self.present_delay_ms.load(Ordering::SeqCst)));
            self.present.fetch_add(1, Ordering::SeqCst);
            self.in_present.store(false, Ordering::SeqCst);
            true
        }
        fn fbo(&mut self) -> u32 {
            self.check();
            0
        }
    }

    fn project() -> ProjectArgs {
        ProjectArgs::new("app.flx", "lib/main.dart", ".packages")
    }

    fn builder(gl: &InstrumentedGl) -> EngineBuilder {
        EngineBuilder::new(RendererConfig::open_gl(gl.clone()), project()).with_frame_rate(500.0)
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

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let gl = InstrumentedGl::default();
        let builder = EngineBuilder::new(RendererConfig::open_gl(gl), project());
        assert_eq!(builder.frame_rate, 60.0);
        assert!(builder.channels.is_empty());
        assert!(builder.pointer_sinks.is_empty());
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn builder_with_frame_rate_panics_on_zero() {
        let gl = InstrumentedGl::default();
        let _ = builder(&gl).with_frame_rate(0.0);
    }

    #[test]
    fn start_rejects_wrong_version() {
        for version in [0, ENGINE_VERSION + 1, usize::MAX] {
            let gl = InstrumentedGl::default();
            let result = builder(&gl).start(version);
            assert_eq!(
                result.err(),
                Some(EmbedderError::InvalidLibraryVersion { expected: ENGINE_VERSION, found: version })
            );
        }
    }

    #[test]
    fn start_rejects_empty_project() {
        let gl = InstrumentedGl::default();
        let result = EngineBuilder::new(RendererConfig::open_gl(gl), ProjectArgs::new("", "", ""))
            .start(ENGINE_VERSION);
        assert!(matches!(result, Err(EmbedderError::InvalidArguments(_))));
    }

    //=====================================================================
    // Lifecycle Tests
    //=====================================================================

    #[test]
    fn start_and_shutdown() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();
        assert!(engine.is_running());
        assert_eq!(engine.project(), &project());
        assert!(engine.shutdown().is_ok());
    }

    #[test]
    fn second_stop_is_rejected() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();
        assert!(engine.stop().is_ok());
        assert_eq!(engine.stop(), Err(EmbedderError::EngineShutDown));
        assert!(!engine.is_running());
    }

    #[test]
    fn injection_after_stop_is_rejected() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();
        engine.stop().unwrap();

        assert_eq!(
            engine.send_window_metrics(WindowMetrics::new(1, 1, 1.0)),
            Err(EmbedderError::EngineShutDown)
        );
        assert_eq!(engine.send_pointer_events(&[]), Err(EmbedderError::EngineShutDown));
        assert_eq!(
            engine.send_platform_message(PlatformMessage::new("x", vec![])),
            Err(EmbedderError::EngineShutDown)
        );
    }

    #[test]
    fn shutdown_waits_for_in_flight_frame() {
        let gl = InstrumentedGl::default();
        gl.present_delay_ms.store(40, Ordering::SeqCst);
        gl.surface_alive.store(true, Ordering::SeqCst);
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();

        engine.notify_surface_created(SurfaceId(7));
        assert!(wait_until(|| gl.in_present.load(Ordering::SeqCst)), "no frame reached present");

        engine.shutdown().unwrap();

        assert!(!gl.in_present.load(Ordering::SeqCst), "present still running after shutdown");
        let after_shutdown = gl.calls();
        gl.surface_alive.store(false, Ordering::SeqCst);

        thread::sleep(Duration::from_millis(60));

        assert_eq!(gl.calls(), after_shutdown);
        assert_eq!(gl.violations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn events_queued_before_shutdown_are_applied() {
        for _ in 0..20 {
            let seen = Arc::new(AtomicUsize::new(0));
            let handler_seen = Arc::clone(&seen);
            let gl = InstrumentedGl::default();
            let engine = builder(&gl)
                .with_message_handler("c", move |_: &[u8]| {
                    handler_seen.fetch_add(1, Ordering::SeqCst);
                })
                .start(ENGINE_VERSION)
                .unwrap();

            engine.send_platform_message(PlatformMessage::new("c", vec![1])).unwrap();
            engine.shutdown().unwrap();

            assert_eq!(seen.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn tiny_frame_rate_starts_and_stops() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).with_frame_rate(1e-300).start(ENGINE_VERSION).unwrap();
        assert!(engine.is_running());
        assert!(engine.shutdown().is_ok());
    }

    #[test]
    fn no_callbacks_before_surface_created() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();

        thread::sleep(Duration::from_millis(50));

        assert_eq!(gl.calls(), (0, 0));
        engine.shutdown().unwrap();
    }

    //=====================================================================
    // Event Injection Tests
    //=====================================================================

    #[test]
    fn window_metrics_validation() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();

        assert!(engine.send_window_metrics(WindowMetrics::new(0, 0, 1.0)).is_ok());
        assert!(matches!(
            engine.send_window_metrics(WindowMetrics::new(800, 600, 0.0)),
            Err(EmbedderError::InvalidArguments(_))
        ));
        engine.shutdown().unwrap();
    }

    #[test]
    fn pointer_batch_is_observed_in_order() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let gl = InstrumentedGl::default();
        let engine = builder(&gl)
            .with_pointer_sink(move |e: &PointerEvent| sink.lock().push((e.phase, e.timestamp)))
            .start(ENGINE_VERSION)
            .unwrap();

        engine
            .send_pointer_events(&[
                PointerEvent::new(PointerPhase::Down, 0, 0.0, 0.0),
                PointerEvent::new(PointerPhase::Move, 1, 1.0, 1.0),
                PointerEvent::new(PointerPhase::Up, 2, 2.0, 2.0),
            ])
            .unwrap();

        assert!(wait_until(|| seen.lock().len() == 3));
        assert_eq!(
            *seen.lock(),
            vec![(PointerPhase::Down, 0), (PointerPhase::Move, 1), (PointerPhase::Up, 2)]
        );
        engine.shutdown().unwrap();
    }

    #[test]
    fn platform_messages_route_by_channel() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let handler_seen = Arc::clone(&seen);
        let gl = InstrumentedGl::default();
        let engine = builder(&gl)
            .with_message_handler("app/echo", move |payload: &[u8]| {
                handler_seen.lock().push(payload.to_vec())
            })
            .start(ENGINE_VERSION)
            .unwrap();

        assert!(engine.send_platform_message(PlatformMessage::new("app/unknown", vec![0])).is_ok());
        assert!(engine.send_platform_message(PlatformMessage::new("app/echo", b"hi".to_vec())).is_ok());

        assert!(wait_until(|| !seen.lock().is_empty()));
        engine.shutdown().unwrap();
        assert_eq!(*seen.lock(), vec![b"hi".to_vec()]);
    }

    //=====================================================================
    // Surface Lifecycle Tests
    //=====================================================================

    #[test]
    fn end_to_end_surface_lifecycle() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();

        gl.surface_alive.store(true, Ordering::SeqCst);
        engine.notify_surface_created(SurfaceId(42));
        assert_eq!(engine.surface(), Some(SurfaceId(42)));
        assert!(wait_until(|| gl.calls().0 > 0), "make_current was never invoked");

        assert_eq!(engine.notify_surface_destroyed(), SurfaceId(42));
        gl.surface_alive.store(false, Ordering::SeqCst);
        let after_destroy = gl.calls();

        thread::sleep(Duration::from_millis(50));

        assert_eq!(gl.calls(), after_destroy);
        assert_eq!(gl.violations.load(Ordering::SeqCst), 0);
        assert!(engine.shutdown().is_ok());
    }

    #[test]
    fn surface_churn_under_load_never_renders_unbound() {
        let gl = InstrumentedGl::default();
        let engine = builder(&gl).with_frame_rate(2000.0).start(ENGINE_VERSION).unwrap();

        for round in 0..50u64 {
            gl.surface_alive.store(true, Ordering::SeqCst);
            engine.notify_surface_created(SurfaceId(round + 1));

            for i in 0..5 {
                engine.send_window_metrics(WindowMetrics::new(i, i, 1.0)).unwrap();
                engine
                    .send_pointer_events(&[PointerEvent::new(PointerPhase::Cancel, round, 0.0, 0.0)])
                    .unwrap();
            }
            thread::sleep(Duration::from_millis(1));

            engine.notify_surface_destroyed();
            gl.surface_alive.store(false, Ordering::SeqCst);
        }

        thread::sleep(Duration::from_millis(20));
        assert_eq!(gl.violations.load(Ordering::SeqCst), 0);
        engine.shutdown().unwrap();
    }

    #[test]
    fn frames_pick_up_new_metrics() {
        let frames = Arc::new(parking_lot::Mutex::new(Vec::<FrameInfo>::new()));
        let observed = Arc::clone(&frames);
        let gl = InstrumentedGl::default();
        gl.surface_alive.store(true, Ordering::SeqCst);
        let engine = builder(&gl)
            .with_frame_observer(move |info: &FrameInfo| observed.lock().push(*info))
            .start(ENGINE_VERSION)
            .unwrap();

        engine.send_window_metrics(WindowMetrics::new(1024, 768, 2.0)).unwrap();
        engine.notify_surface_created(SurfaceId(9));

        assert!(wait_until(|| frames
            .lock()
            .iter()
            .any(|f| f.metrics == WindowMetrics::new(1024, 768, 2.0))));

        engine.notify_surface_destroyed();
        engine.shutdown().unwrap();
    }

    #[test]
    #[should_panic(expected = "still bound")]
    fn double_surface_created_panics() {
        let gl = InstrumentedGl::default();
        gl.surface_alive.store(true, Ordering::SeqCst);
        let engine = builder(&gl).start(ENGINE_VERSION).unwrap();
        engine.notify_surface_created(SurfaceId(1));
        engine.notify_surface_created(SurfaceId(2));
    }
}
