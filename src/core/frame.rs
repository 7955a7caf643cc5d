//=========================================================================
// Frame Production
//=========================================================================
//
// Drives one frame through the renderer capability set.
//
// Sequence: make_current → fbo → present → clear_current.
// If the context cannot be made current the frame is skipped.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::input::WindowMetrics;
use crate::renderer::RendererConfig;
use crate::surface::SurfaceId;

//=== FrameInfo ===========================================================

/// Summary of a frame handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub frame_number: u64,
    pub surface: SurfaceId,
    pub metrics: WindowMetrics,
    pub fbo: u32,
    pub presented: bool,
}

//=== FrameObserver =======================================================

/// Notified on the render thread after every drawn frame.
///
/// Implemented for any `FnMut(&FrameInfo) + Send` closure.
pub trait FrameObserver: Send {
    fn on_frame(&mut self, frame: &FrameInfo);
}

impl<F> FrameObserver for F
where
    F: FnMut(&FrameInfo) + Send,
{
    fn on_frame(&mut self, frame: &FrameInfo) {
        self(frame)
    }
}

//=== draw_frame() ========================================================

/// Draws one frame on `surface`; returns `None` if it was skipped.
pub(crate) fn draw_frame(
    renderer: &mut RendererConfig,
    surface: SurfaceId,
    metrics: WindowMetrics,
    frame_number: u64,
) -> Option<FrameInfo> {
    match renderer {
        RendererConfig::OpenGl(gl) => {
            if !gl.make_current() {
                warn!(target: "embedder::render", "make_current failed, skipping frame {}", frame_number);
                return None;
            }

            let fbo = gl.fbo();
            trace!(
                target: "embedder::render",
                "Frame {} on surface {} fbo {} at {}x{} @ {}x",
                frame_number,
                surface.0,
                fbo,
                metrics.width,
                metrics.height,
                metrics.pixel_ratio
            );

            let presented = gl.present();
            if !presented {
                warn!(target: "embedder::render", "present failed for frame {}", frame_number);
            }

            if !gl.clear_current() {
                warn!(target: "embedder::render", "clear_current failed after frame {}", frame_number);
            }

            Some(FrameInfo { frame_number, surface, metrics, fbo, presented })
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::OpenGlRenderer;
    use std::sync::{Arc, Mutex};

    struct ScriptedGl {
        calls: Arc<Mutex<Vec<&'static str>>>,
        current_ok: bool,
    }

    impl OpenGlRenderer for ScriptedGl {
        fn make_current(&mut self) -> bool {
            self.calls.lock().unwrap().push("make_current");
            self.current_ok
        }
        fn clear_current(&mut self) -> bool {
            self.calls.lock().unwrap().push("clear_current");
            true
        }
        fn present(&mut self) -> bool {
            self.calls.lock().unwrap().push("present");
            true
        }
        fn fbo(&mut self) -> u32 {
            self.calls.lock().unwrap().push("fbo");
            5
        }
    }

    #[test]
    fn frame_follows_capability_sequence() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut config = RendererConfig::open_gl(ScriptedGl { calls: Arc::clone(&calls), current_ok: true });

        let info = draw_frame(&mut config, SurfaceId(42), WindowMetrics::new(640, 480, 2.0), 3)
            .expect("frame should be drawn");

        assert_eq!(*calls.lock().unwrap(), vec!["make_current", "fbo", "present", "clear_current"]);
        assert_eq!(info.fbo, 5);
        assert_eq!(info.frame_number, 3);
        assert_eq!(info.surface, SurfaceId(42));
        assert_eq!(info.metrics.width, 640);
        assert!(info.presented);
    }

    #[test]
    fn failed_make_current_skips_frame() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut config = RendererConfig::open_gl(ScriptedGl { calls: Arc::clone(&calls), current_ok: false });

        assert!(draw_frame(&mut config, SurfaceId(1), WindowMetrics::default(), 0).is_none());
        assert_eq!(*calls.lock().unwrap(), vec!["make_current"]);
    }
}
