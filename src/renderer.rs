//=========================================================================
// Renderer Binding
//=========================================================================
//
// How the engine obtains a GPU context from the host.
//
// The binding is a closed set of backends. Each variant carries only the
// capabilities its backend needs, so adding a backend never touches the
// layout of another. The host implements the capability trait; context
// travels in `self` rather than through an untyped pointer.
//
// Threading:
//   Capabilities are invoked on the render thread, and only while a
//   surface is bound. They must return promptly and must never wait on
//   the host thread: `Engine::notify_surface_destroyed` holds the host
//   thread until the current frame finishes.
//
//=========================================================================

//=== OpenGlRenderer ======================================================

/// Capability set for an OpenGL context owned by the host.
pub trait OpenGlRenderer: Send {
    /// Makes the host's GL context current on the calling thread.
    fn make_current(&mut self) -> bool;

    /// Releases the GL context from the calling thread.
    fn clear_current(&mut self) -> bool;

    /// Presents the frame rendered into the current framebuffer.
    fn present(&mut self) -> bool;

    /// Returns the framebuffer object the engine should render into.
    fn fbo(&mut self) -> u32;
}

//=== RendererConfig ======================================================

/// Renderer backend selected by the host at start.
pub enum RendererConfig {
    /// OpenGL backend.
    OpenGl(Box<dyn OpenGlRenderer>),
}

impl RendererConfig {
    /// Wraps an OpenGL capability set.
    pub fn open_gl<R: OpenGlRenderer + 'static>(renderer: R) -> Self {
        Self::OpenGl(Box::new(renderer))
    }

    /// Short backend name for diagnostics.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::OpenGl(_) => "OpenGL",
        }
    }
}

impl std::fmt::Debug for RendererConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RendererConfig").field(&self.backend_name()).finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
