//! Process-wide proxy state.
//!
//! Settings are read once, the first time any entry point runs. The real
//! module is loaded lazily by the first call that needs it; a failed load is
//! not remembered, so the next call tries again.
//!
//! Statics are never dropped, so unloading is hooked explicitly: on ELF
//! targets a `.fini_array` entry runs [`ProxyState::shutdown`] when the proxy
//! is `dlclose`d or the process exits, releasing the real module and closing
//! the log file. On Windows `DllMain` closes the log file only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use pkcs11_logger_core::{ProxyMetrics, Settings};

use crate::loader::{LoaderError, ModuleLoader, NativeLoader, RealModule};
use crate::sink::LogSink;

static STATE: OnceLock<ProxyState> = OnceLock::new();

/// Everything an intercepted call needs: configuration, the log sink, the
/// real module and the counters.
pub struct ProxyState {
    settings: Settings,
    sink: LogSink,
    loader: Box<dyn ModuleLoader>,
    // Calls in flight hold their own `Arc`, so a shutdown never unloads the
    // module under a running call.
    module: RwLock<Option<Arc<RealModule>>>,
    // Serializes loading and shutdown. Never held together with the sink
    // guard.
    init_lock: Mutex<()>,
    unloaded: AtomicBool,
    metrics: ProxyMetrics,
}

impl ProxyState {
    /// State that loads the real module with the platform's dynamic loader.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_loader(settings, Box::new(NativeLoader))
    }

    #[must_use]
    pub fn with_loader(settings: Settings, loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            sink: LogSink::new(&settings),
            settings,
            loader,
            module: RwLock::new(None),
            init_lock: Mutex::new(()),
            unloaded: AtomicBool::new(false),
            metrics: ProxyMetrics::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    #[must_use]
    pub fn metrics(&self) -> &ProxyMetrics {
        &self.metrics
    }

    /// The real module, loading it if no earlier call has.
    pub fn module(&self) -> Result<Arc<RealModule>, LoaderError> {
        if let Some(module) = self.loaded() {
            return Ok(module);
        }
        let _loading = self.init_lock.lock();
        if let Some(module) = self.loaded() {
            return Ok(module);
        }
        if self.unloaded.load(Ordering::Acquire) {
            return Err(LoaderError::Unloaded);
        }
        let path = self
            .settings
            .library_path
            .as_deref()
            .ok_or(LoaderError::NotConfigured)?;
        let module = Arc::new(RealModule::load(self.loader.as_ref(), path)?);
        *self.module.write() = Some(Arc::clone(&module));
        Ok(module)
    }

    fn loaded(&self) -> Option<Arc<RealModule>> {
        self.module.read().clone()
    }

    /// Release the real module and close the log file.
    ///
    /// Later calls fail with [`LoaderError::Unloaded`] instead of loading the
    /// module again. The module is unloaded once the last call still inside
    /// it returns. Calling this twice is harmless.
    pub fn shutdown(&self) {
        let _loading = self.init_lock.lock();
        self.unloaded.store(true, Ordering::Release);
        let module = self.module.write().take();
        drop(module);
        self.sink.close();
    }
}

impl std::fmt::Debug for ProxyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyState")
            .field("settings", &self.settings)
            .field("module", &self.loaded())
            .field("unloaded", &self.unloaded.load(Ordering::Relaxed))
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}

/// The process-wide state, built from the environment on first use.
pub fn global() -> &'static ProxyState {
    STATE.get_or_init(|| ProxyState::new(Settings::from_env()))
}

/// Install `state` as the process-wide state before any entry point runs.
///
/// Hands `state` back if the global state already exists.
pub fn install(state: ProxyState) -> Result<(), ProxyState> {
    STATE.set(state)
}

/// Shut down the process-wide state, if any call ever created it.
pub fn shutdown_global() {
    if let Some(state) = STATE.get() {
        state.shutdown();
    }
}

// Runs when the proxy is unloaded or the process exits.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
#[used]
#[unsafe(link_section = ".fini_array")]
static ON_UNLOAD: extern "C" fn() = {
    extern "C" fn on_unload() {
        shutdown_global();
    }
    on_unload
};

// The loader lock is held here and FreeLibrary must not be called under it,
// so on Windows only the log file is closed.
#[cfg(windows)]
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
extern "system" fn DllMain(
    _module: *mut std::ffi::c_void,
    reason: u32,
    _reserved: *mut std::ffi::c_void,
) -> i32 {
    const DLL_PROCESS_DETACH: u32 = 0;
    if reason == DLL_PROCESS_DETACH {
        if let Some(state) = STATE.get() {
            state.sink().close();
        }
    }
    1
}
