//=========================================================================
// Surface Lifecycle
//=========================================================================
//
// Synchronizes the host-owned native surface with the render thread.
//
// Architecture:
// ```text
//  Host Thread:                         Render Thread:
//  ┌──────────────────────────┐        ┌──────────────────────────┐
//  │ SurfaceController        │        │ render loop              │
//  │  notify_created(id) ─────┼─lock──►│ gate.with_bound_surface  │
//  │  notify_destroyed() ─────┼─lock──►│   make_current … present │
//  └──────────────────────────┘        └──────────────────────────┘
//                 └──────── Arc<SurfaceGate> ────────┘
// ```
//
// The render thread holds the gate lock for the entire frame. Unbinding
// takes the same lock, so `notify_destroyed` cannot return while a frame
// that uses the surface is in progress, and no frame can start on an
// unbound gate. That is the happens-before edge between the last render
// and the host releasing the native resources.
//
// Exactly one Unbound → Bound and one Bound → Unbound transition per
// surface instance. Anything else is caller misuse and panics.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::info;
use parking_lot::Mutex;

//=== SurfaceId ===========================================================

/// Host identifier of a native drawable (window id, widget handle).
///
/// Zero is reserved as the null surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl SurfaceId {
    pub const NULL: SurfaceId = SurfaceId(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

//=== SurfaceGate =========================================================

/// Shared surface state; the lock doubles as the frame barrier.
#[derive(Debug, Default)]
pub(crate) struct SurfaceGate {
    bound: Mutex<Option<SurfaceId>>,
}

impl SurfaceGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs `frame` with the gate locked if a surface is bound.
    pub(crate) fn with_bound_surface<R>(&self, frame: impl FnOnce(SurfaceId) -> R) -> Option<R> {
        let bound = self.bound.lock();
        (*bound).map(frame)
    }

    fn bind(&self, surface: SurfaceId) {
        let mut bound = self.bound.lock();
        assert!(
            bound.is_none(),
            "surface {:?} bound while {:?} is still bound",
            surface,
            *bound
        );
        *bound = Some(surface);
    }

    /// Blocks until the in-progress frame (if any) has finished.
    fn unbind(&self) -> SurfaceId {
        let mut bound = self.bound.lock();
        match bound.take() {
            Some(surface) => surface,
            None => panic!("surface unbound while no surface is bound"),
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<SurfaceId> {
        *self.bound.lock()
    }
}

//=== SurfaceController ===================================================

/// Host-side owner of the surface lifetime state for one engine.
///
/// One controller per engine instance; nothing here is process-global.
#[derive(Debug)]
pub struct SurfaceController {
    window: Option<SurfaceId>,
    gate: Arc<SurfaceGate>,
}

impl SurfaceController {
    pub(crate) fn new(gate: Arc<SurfaceGate>) -> Self {
        Self { window: None, gate }
    }

    /// Surface currently bound, if any.
    pub fn surface(&self) -> Option<SurfaceId> {
        self.window
    }

    /// Records that `surface` is ready and lets the engine render to it.
    ///
    /// # Panics
    ///
    /// Panics if a surface is already bound, or if `surface` is null.
    pub fn notify_created(&mut self, surface: SurfaceId) {
        assert!(!surface.is_null(), "surface created with a null id");
        assert!(
            self.window.is_none(),
            "surface created while {:?} is still bound",
            self.window
        );
        self.window = Some(surface);
        self.gate.bind(surface);
        info!(target: "embedder::surface", "Surface {} created", surface.0);
    }

    /// Withdraws the engine's permission to render.
    ///
    /// Returns only after any frame using the surface has completed; the
    /// host may release the native resources afterwards.
    ///
    /// # Panics
    ///
    /// Panics if no surface is bound.
    pub fn notify_destroyed(&mut self) -> SurfaceId {
        let surface = match self.window.take() {
            Some(surface) => surface,
            None => panic!("surface destroyed while no surface is bound"),
        };
        let unbound = self.gate.unbind();
        debug_assert_eq!(unbound, surface);
        info!(target: "embedder::surface", "Surface {} destroyed", surface.0);
        surface
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
