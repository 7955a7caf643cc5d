//=========================================================================
// Render Loop Orchestrator
//
// Engine-internal coordinator running on the render thread.
//
// Responsibilities:
// - Receive host events over the platform bridge channel
// - Apply window metrics, dispatch pointer batches and platform messages
// - Produce frames through the renderer binding while a surface is bound
// - Maintain pacing at a fixed frame rate
//
// Notes:
// The orchestrator never touches host state directly. Everything arrives
// by message passing, except the surface gate, which is the single shared
// synchronization point with the host thread.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use crossbeam_channel::Receiver;
use log::{debug, info};

//=== Internal Modules ====================================================
pub mod frame;
pub mod input;
pub mod message_bus;
pub(crate) mod platform_bridge;

use crate::renderer::RendererConfig;
use crate::surface::SurfaceGate;
use frame::{draw_frame, FrameObserver};
use input::{PointerSystem, WindowMetrics};
use message_bus::ChannelRegistry;
use platform_bridge::{EngineEvent, EventCollector, TickControl};

//=== Frame Pacing ========================================================

/// Longest frame interval the render loop waits between ticks.
pub(crate) const MAX_FRAME_INTERVAL: Duration = Duration::from_secs(60);

/// Frame interval for `frame_rate`, clamped to [`MAX_FRAME_INTERVAL`].
///
/// Rates so small that `1 / frame_rate` overflows a `Duration` clamp too.
pub(crate) fn frame_duration(frame_rate: f64) -> Duration {
    Duration::try_from_secs_f64(1.0 / frame_rate)
        .map_or(MAX_FRAME_INTERVAL, |interval| interval.min(MAX_FRAME_INTERVAL))
}

//=== RenderOrchestrator ==================================================
//
// Owns every render-thread subsystem. Built on the host thread by the
// engine builder, then moved onto the render thread.
//
pub(crate) struct RenderOrchestrator {
    renderer: RendererConfig,
    pointers: PointerSystem,
    channels: ChannelRegistry,
    observers: Vec<Box<dyn FrameObserver>>,
    metrics: WindowMetrics,
    frame_number: u64,
}

impl RenderOrchestrator {
    //--- Construction -----------------------------------------------------
    pub fn new(
        renderer: RendererConfig,
        pointers: PointerSystem,
        channels: ChannelRegistry,
        observers: Vec<Box<dyn FrameObserver>>,
    ) -> Self {
        Self {
            renderer,
            pointers,
            channels,
            observers,
            metrics: WindowMetrics::default(),
            frame_number: 0,
        }
    }

    //--- spawn_render_thread() -------------------------------------------
    //
    // Each tick:
    //  1. Collects host events (waits at most one frame)
    //  2. Applies them in arrival order
    //  3. Draws a frame if, and only if, a surface is bound
    //  4. Sleeps out the remainder of the frame
    //  5. Exits on Shutdown or when the host side disconnects, after
    //     applying whatever was queued ahead of it (no final frame)
    //
    pub fn spawn_render_thread(
        self,
        receiver: Receiver<EngineEvent>,
        gate: Arc<SurfaceGate>,
        frame_rate: f64,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        let frame_duration = frame_duration(frame_rate);

        thread::Builder::new()
            .name("aetheric.render".into())
            .spawn(move || {
                let mut orchestrator = self;
                let mut collector = EventCollector::new(receiver);

                loop {
                    let frame_start = Instant::now();

                    //--- Step 1: Gather host events ------------------------
                    let control = collector.collect_frame(frame_duration);

                    //--- Step 2: Apply them --------------------------------
                    for event in collector.take_pending() {
                        orchestrator.handle_event(event);
                    }
                    if let TickControl::Exit = control {
                        info!(target: "embedder::render", "Render thread exiting");
                        break;
                    }

                    //--- Step 3: Produce a frame ---------------------------
                    orchestrator.render(&gate);

                    //--- Step 4: Pacing ------------------------------------
                    let elapsed = frame_start.elapsed();
                    if elapsed < frame_duration {
                        thread::sleep(frame_duration - elapsed);
                    }
                }
            })
    }

    //--- Event Handling ---------------------------------------------------

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::WindowMetrics(metrics) => {
                debug!(
                    target: "embedder::render",
                    "Window metrics {}x{} @ {}x",
                    metrics.width,
                    metrics.height,
                    metrics.pixel_ratio
                );
                self.metrics = metrics;
            }
            EngineEvent::Pointers(batch) => self.pointers.process_batch(&batch),
            EngineEvent::PlatformMessage(message) => {
                self.channels.dispatch(&message);
            }
            EngineEvent::Shutdown => {}
        }
    }

    //--- Frame Production -------------------------------------------------

    fn render(&mut self, gate: &SurfaceGate) {
        let renderer = &mut self.renderer;
        let metrics = self.metrics;
        let frame_number = self.frame_number;

        let drawn = gate
            .with_bound_surface(|surface| draw_frame(renderer, surface, metrics, frame_number))
            .flatten();

        if let Some(info) = drawn {
            self.frame_number += 1;
            for observer in &mut self.observers {
                observer.on_frame(&info);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
