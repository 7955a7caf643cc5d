//=========================================================================
// C Embedding ABI
//=========================================================================
//
// Versioned C surface over the Rust engine API.
//
// Architecture:
// ```text
//  Host (C)                        this module                  Rust API
//  ─────────────────────────────   ───────────────────────────  ─────────────
//  aetheric_engine_run(...)     →  validate structs/strings  →  EngineBuilder
//                                  ENGINES.insert(Arc<Engine>)   ::start
//  aetheric_engine_send_*(h)    →  ENGINES.get(h) → clone    →  Engine::send_*
//  aetheric_engine_shutdown(h)  →  ENGINES.remove(h)         →  Engine::stop
// ```
//
// Every struct starts with `struct_size`, which must equal the size of
// the layout compiled here. Handles are generation-checked, so a handle
// used after shutdown is rejected instead of dereferenced.
//
// Surface lifecycle misuse (create while bound, destroy while unbound)
// panics; a panic cannot unwind out of an `extern "C"` function, so the
// process aborts.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_char, c_void, CStr};
use std::mem::size_of;
use std::sync::Arc;

use log::debug;
use parking_lot::{const_mutex, Mutex};

//=== Internal Dependencies ===============================================

use crate::core::input::{PointerEvent, PointerPhase, WindowMetrics};
use crate::core::message_bus::PlatformMessage;
use crate::engine::{Engine, EngineBuilder};
use crate::error::EmbedderError;
use crate::project::ProjectArgs;
use crate::registry::{EngineHandle, HandleTable};
use crate::renderer::{OpenGlRenderer, RendererConfig};
use crate::surface::SurfaceId;
use crate::ENGINE_VERSION;

//=== Result Codes ========================================================

/// Outcome of every ABI call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderResult {
    Success = 0,
    InvalidLibraryVersion = 1,
    InvalidArguments = 2,
}

impl From<Result<(), EmbedderError>> for EmbedderResult {
    fn from(result: Result<(), EmbedderError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(e) => {
                debug!(target: "embedder::ffi", "Call rejected: {}", e);
                e.result()
            }
        }
    }
}

//=== Renderer Config =====================================================

pub type BoolCallback = Option<unsafe extern "C" fn(user_data: *mut c_void) -> bool>;
pub type UIntCallback = Option<unsafe extern "C" fn(user_data: *mut c_void) -> u32>;

/// `AethericRendererConfig::kind` value selecting OpenGL.
pub const RENDERER_TYPE_OPENGL: u32 = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AethericOpenGlRendererConfig {
    /// Must be `sizeof(AethericOpenGlRendererConfig)`.
    pub struct_size: usize,
    pub make_current: BoolCallback,
    pub clear_current: BoolCallback,
    pub present: BoolCallback,
    pub fbo_callback: UIntCallback,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union AethericRendererConfigData {
    pub open_gl: AethericOpenGlRendererConfig,
}

/// Tagged union; `kind` selects the active member of `data`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct AethericRendererConfig {
    pub kind: u32,
    pub data: AethericRendererConfigData,
}

//=== Project Args ========================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AethericProjectArgs {
    /// Must be `sizeof(AethericProjectArgs)`.
    pub struct_size: usize,
    pub assets_path: *const c_char,
    pub main_path: *const c_char,
    pub packages_path: *const c_char,
}

//=== Events ==============================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AethericWindowMetricsEvent {
    /// Must be `sizeof(AethericWindowMetricsEvent)`.
    pub struct_size: usize,
    pub width: usize,
    pub height: usize,
    pub pixel_ratio: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AethericPointerEvent {
    /// Must be `sizeof(AethericPointerEvent)`.
    pub struct_size: usize,
    /// 0 = cancel, 1 = up, 2 = down, 3 = move.
    pub phase: u32,
    /// Microseconds.
    pub timestamp: usize,
    pub x: f64,
    pub y: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AethericPlatformMessage {
    /// Must be `sizeof(AethericPlatformMessage)`.
    pub struct_size: usize,
    pub channel: *const c_char,
    pub message: *const u8,
    pub message_size: usize,
}

//=== Engine Table ========================================================

static ENGINES: Mutex<HandleTable<Arc<Engine>>> = const_mutex(HandleTable::new());

fn lookup(handle: EngineHandle) -> Result<Arc<Engine>, EmbedderError> {
    ENGINES
        .lock()
        .get(handle)
        .cloned()
        .ok_or(EmbedderError::InvalidArguments("unknown engine handle"))
}

//=== Foreign Renderer ====================================================

/// OpenGL capability set backed by host function pointers.
struct ForeignOpenGl {
    make_current: unsafe extern "C" fn(*mut c_void) -> bool,
    clear_current: unsafe extern "C" fn(*mut c_void) -> bool,
    present: unsafe extern "C" fn(*mut c_void) -> bool,
    fbo_callback: unsafe extern "C" fn(*mut c_void) -> u32,
    user_data: *mut c_void,
}

// The host guarantees its callbacks and user data may be used from the
// render thread for the lifetime of the engine.
unsafe impl Send for ForeignOpenGl {}

impl ForeignOpenGl {
    fn from_config(config: &AethericOpenGlRendererConfig, user_data: *mut c_void) -> Result<Self, EmbedderError> {
        if config.struct_size != size_of::<AethericOpenGlRendererConfig>() {
            return Err(EmbedderError::InvalidArguments("OpenGL config struct_size mismatch"));
        }
        match (config.make_current, config.clear_current, config.present, config.fbo_callback) {
            (Some(make_current), Some(clear_current), Some(present), Some(fbo_callback)) => Ok(Self {
                make_current,
                clear_current,
                present,
                fbo_callback,
                user_data,
            }),
            _ => Err(EmbedderError::InvalidArguments("OpenGL callback missing")),
        }
    }
}

impl OpenGlRenderer for ForeignOpenGl {
    fn make_current(&mut self) -> bool {
        unsafe { (self.make_current)(self.user_data) }
    }

    fn clear_current(&mut self) -> bool {
        unsafe { (self.clear_current)(self.user_data) }
    }

    fn present(&mut self) -> bool {
        unsafe { (self.present)(self.user_data) }
    }

    fn fbo(&mut self) -> u32 {
        unsafe { (self.fbo_callback)(self.user_data) }
    }
}

//=== Argument Decoding ===================================================

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn decode_str<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, EmbedderError> {
    if ptr.is_null() {
        return Err(EmbedderError::InvalidArguments(what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| EmbedderError::InvalidArguments(what))
}

/// # Safety
///
/// `config` must be null or point to a valid `AethericRendererConfig`.
unsafe fn decode_renderer(
    config: *const AethericRendererConfig,
    user_data: *mut c_void,
) -> Result<RendererConfig, EmbedderError> {
    let config = config
        .as_ref()
        .ok_or(EmbedderError::InvalidArguments("renderer config is null"))?;
    match config.kind {
        RENDERER_TYPE_OPENGL => {
            let open_gl = ForeignOpenGl::from_config(&config.data.open_gl, user_data)?;
            Ok(RendererConfig::open_gl(open_gl))
        }
        _ => Err(EmbedderError::InvalidArguments("unknown renderer type")),
    }
}

/// # Safety
///
/// `args` must be null or point to a valid `AethericProjectArgs` whose
/// strings are null or NUL-terminated.
unsafe fn decode_project(args: *const AethericProjectArgs) -> Result<ProjectArgs, EmbedderError> {
    let args = args
        .as_ref()
        .ok_or(EmbedderError::InvalidArguments("project args are null"))?;
    if args.struct_size != size_of::<AethericProjectArgs>() {
        return Err(EmbedderError::InvalidArguments("project args struct_size mismatch"));
    }
    Ok(ProjectArgs::new(
        decode_str(args.assets_path, "assets path is null or not UTF-8")?,
        decode_str(args.main_path, "main path is null or not UTF-8")?,
        decode_str(args.packages_path, "packages path is null or not UTF-8")?,
    ))
}

fn decode_pointer(event: &AethericPointerEvent) -> Result<PointerEvent, EmbedderError> {
    if event.struct_size != size_of::<AethericPointerEvent>() {
        return Err(EmbedderError::InvalidArguments("pointer event struct_size mismatch"));
    }
    Ok(PointerEvent::new(
        PointerPhase::try_from(event.phase)?,
        event.timestamp as u64,
        event.x,
        event.y,
    ))
}

//=== Lifecycle ===========================================================

/// Starts an engine and writes its handle to `engine_out`.
///
/// On failure a non-null `engine_out` receives the null handle.
///
/// # Safety
///
/// Every non-null pointer must reference a valid, initialized struct of
/// the documented type. `user_data` is passed back to every renderer
/// callback, from the render thread, until shutdown returns.
#[no_mangle]
pub unsafe extern "C" fn aetheric_engine_run(
    version: usize,
    config: *const AethericRendererConfig,
    args: *const AethericProjectArgs,
    user_data: *mut c_void,
    engine_out: *mut EngineHandle,
) -> EmbedderResult {
    let result = (|| {
        if version != ENGINE_VERSION {
            return Err(EmbedderError::InvalidLibraryVersion {
                expected: ENGINE_VERSION,
                found: version,
            });
        }
        if engine_out.is_null() {
            return Err(EmbedderError::InvalidArguments("engine_out is null"));
        }
        let renderer = decode_renderer(config, user_data)?;
        let project = decode_project(args)?;

        let engine = EngineBuilder::new(renderer, project).start(version)?;
        let handle = ENGINES.lock().insert(Arc::new(engine));
        *engine_out = handle;
        Ok(())
    })();

    if result.is_err() && !engine_out.is_null() {
        *engine_out = EngineHandle::NULL;
    }
    result.into()
}

/// Stops the engine and invalidates `engine`.
#[no_mangle]
pub extern "C" fn aetheric_engine_shutdown(engine: EngineHandle) -> EmbedderResult {
    let removed = ENGINES.lock().remove(engine);
    match removed {
        Some(engine) => engine.stop().into(),
        None => Err(EmbedderError::InvalidArguments("unknown engine handle")).into(),
    }
}

//=== Event Injection =====================================================

/// # Safety
///
/// `event` must be null or point to a valid `AethericWindowMetricsEvent`.
#[no_mangle]
pub unsafe extern "C" fn aetheric_engine_send_window_metrics_event(
    engine: EngineHandle,
    event: *const AethericWindowMetricsEvent,
) -> EmbedderResult {
    let result = (|| {
        let engine = lookup(engine)?;
        let event = event
            .as_ref()
            .ok_or(EmbedderError::InvalidArguments("metrics event is null"))?;
        if event.struct_size != size_of::<AethericWindowMetricsEvent>() {
            return Err(EmbedderError::InvalidArguments("metrics event struct_size mismatch"));
        }
        engine.send_window_metrics(WindowMetrics::new(event.width, event.height, event.pixel_ratio))
    })();

    result.into()
}

/// Sends `events_count` pointer samples, in array order.
///
/// A zero count is a successful no-op whatever `events` points to.
///
/// # Safety
///
/// When `events_count > 0`, `events` must point to that many valid
/// `AethericPointerEvent`s.
#[no_mangle]
pub unsafe extern "C" fn aetheric_engine_send_pointer_event(
    engine: EngineHandle,
    events: *const AethericPointerEvent,
    events_count: usize,
) -> EmbedderResult {
    let result = (|| {
        let engine = lookup(engine)?;
        if events_count == 0 {
            return Ok(());
        }
        if events.is_null() {
            return Err(EmbedderError::InvalidArguments("pointer events are null"));
        }
        let raw = std::slice::from_raw_parts(events, events_count);
        let batch = raw.iter().map(decode_pointer).collect::<Result<Vec<_>, _>>()?;
        engine.send_pointer_events(&batch)
    })();

    result.into()
}

/// # Safety
///
/// `message` must be null or point to a valid `AethericPlatformMessage`
/// whose `message` buffer holds `message_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn aetheric_engine_send_platform_message(
    engine: EngineHandle,
    message: *const AethericPlatformMessage,
) -> EmbedderResult {
    let result = (|| {
        let engine = lookup(engine)?;
        let message = message
            .as_ref()
            .ok_or(EmbedderError::InvalidArguments("platform message is null"))?;
        if message.struct_size != size_of::<AethericPlatformMessage>() {
            return Err(EmbedderError::InvalidArguments("platform message struct_size mismatch"));
        }
        let channel = decode_str(message.channel, "channel is null or not UTF-8")?;
        let payload = match (message.message.is_null(), message.message_size) {
            (_, 0) => Vec::new(),
            (true, _) => return Err(EmbedderError::InvalidArguments("message is null")),
            (false, size) => std::slice::from_raw_parts(message.message, size).to_vec(),
        };
        engine.send_platform_message(PlatformMessage::new(channel, payload))
    })();

    result.into()
}

//=== Surface Lifecycle ===================================================

/// Lets the engine render to the native surface `surface`.
///
/// Aborts the process if a surface is already bound.
#[no_mangle]
pub extern "C" fn aetheric_engine_notify_surface_created(engine: EngineHandle, surface: u64) -> EmbedderResult {
    let result = (|| {
        let engine = lookup(engine)?;
        let surface = SurfaceId(surface);
        if surface.is_null() {
            return Err(EmbedderError::InvalidArguments("surface id is null"));
        }
        engine.notify_surface_created(surface);
        Ok(())
    })();

    result.into()
}

/// Revokes rendering; returns once no frame can touch the surface.
///
/// Aborts the process if no surface is bound.
#[no_mangle]
pub extern "C" fn aetheric_engine_notify_surface_destroyed(engine: EngineHandle) -> EmbedderResult {
    let result = lookup(engine).map(|engine| {
        engine.notify_surface_destroyed();
    });

    result.into()
}

//=========================================================================
// Unit Tests
//=========================================================================
