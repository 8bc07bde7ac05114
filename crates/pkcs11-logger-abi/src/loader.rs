//! Loading of the real Cryptoki module.
//!
//! Opening a module and resolving a symbol are a capability behind
//! [`ModuleLoader`] / [`LoadedModule`]; production uses [`NativeLoader`]
//! (dlopen/LoadLibrary via `libloading`), tests substitute an in-process
//! module.

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use thiserror::Error;

use crate::ck::{CK_C_GetFunctionList, CK_FUNCTION_LIST, CK_FUNCTION_LIST_PTR, CKR_OK, widen};

/// Exported symbol every module provides.
pub const GET_FUNCTION_LIST: &str = "C_GetFunctionList";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("PKCS11_LOGGER_LIBRARY_PATH is not set")]
    NotConfigured,
    #[error("cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },
    #[error("cannot resolve {name}: {reason}")]
    Symbol { name: String, reason: String },
    #[error("C_GetFunctionList failed with 0x{rv:08X}")]
    FunctionList { rv: u64 },
    #[error("C_GetFunctionList returned a null function list")]
    NullFunctionList,
    #[error("the proxy is being unloaded")]
    Unloaded,
}

/// Opens modules by path.
pub trait ModuleLoader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn LoadedModule>, LoaderError>;
}

/// An open module. Dropping it unloads the module.
pub trait LoadedModule: Send + Sync {
    /// Resolve an exported symbol by name.
    fn symbol(&self, name: &str) -> Result<NonNull<c_void>, LoaderError>;
}

/// Platform dynamic loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

struct NativeModule {
    library: libloading::Library,
}

impl ModuleLoader for NativeLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn LoadedModule>, LoaderError> {
        // SAFETY: loading runs the module's initializers; the operator chose
        // this module as the real implementation.
        #[cfg(unix)]
        let library = unsafe {
            use libloading::os::unix::{Library, RTLD_LOCAL, RTLD_NOW};
            Library::open(Some(path), RTLD_NOW | RTLD_LOCAL).map(libloading::Library::from)
        };
        #[cfg(not(unix))]
        let library = unsafe { libloading::Library::new(path) };

        let library = library.map_err(|err| LoaderError::Open {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Ok(Box::new(NativeModule { library }))
    }
}

impl LoadedModule for NativeModule {
    fn symbol(&self, name: &str) -> Result<NonNull<c_void>, LoaderError> {
        let unresolved = |reason: String| LoaderError::Symbol {
            name: name.to_string(),
            reason,
        };
        // SAFETY: the symbol is read as an untyped address; the caller gives
        // it a type.
        let symbol = unsafe { self.library.get::<*mut c_void>(name.as_bytes()) }
            .map_err(|err| unresolved(err.to_string()))?;
        NonNull::new(*symbol).ok_or_else(|| unresolved("null address".to_string()))
    }
}

/// The loaded real module and its function list.
pub struct RealModule {
    functions: NonNull<CK_FUNCTION_LIST>,
    // Kept alive for as long as `functions` is used.
    _module: Box<dyn LoadedModule>,
}

// SAFETY: the function list is read-only after C_GetFunctionList returns and
// Cryptoki requires its entry points to be callable from any thread.
unsafe impl Send for RealModule {}
// SAFETY: see above.
unsafe impl Sync for RealModule {}

impl RealModule {
    /// Open `path`, resolve `C_GetFunctionList` and fetch the function list.
    pub fn load(loader: &dyn ModuleLoader, path: &Path) -> Result<Self, LoaderError> {
        let module = loader.open(path)?;
        let symbol = module.symbol(GET_FUNCTION_LIST)?;
        // SAFETY: Cryptoki fixes the signature of C_GetFunctionList.
        let get_function_list = unsafe {
            std::mem::transmute::<*mut c_void, CK_C_GetFunctionList>(symbol.as_ptr())
        };
        let mut list: CK_FUNCTION_LIST_PTR = std::ptr::null_mut();
        // SAFETY: `list` is a valid out-pointer for the duration of the call.
        let rv = unsafe { get_function_list(&mut list) };
        if rv != CKR_OK {
            return Err(LoaderError::FunctionList { rv: widen(rv) });
        }
        let functions = NonNull::new(list).ok_or(LoaderError::NullFunctionList)?;
        Ok(Self {
            functions,
            _module: module,
        })
    }

    #[must_use]
    pub fn functions(&self) -> &CK_FUNCTION_LIST {
        // SAFETY: non-null, and owned by the module held in `_module`.
        unsafe { self.functions.as_ref() }
    }
}

impl std::fmt::Debug for RealModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealModule")
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_module_reports_path() {
        let err = RealModule::load(&NativeLoader, Path::new("/nonexistent/libnope.so"))
            .expect_err("load must fail");
        match &err {
            LoaderError::Open { path, .. } => assert!(path.ends_with("libnope.so")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("/nonexistent/libnope.so"));
    }

    #[test]
    fn error_messages_name_the_cause() {
        assert_eq!(
            LoaderError::NotConfigured.to_string(),
            "PKCS11_LOGGER_LIBRARY_PATH is not set"
        );
        assert_eq!(
            LoaderError::FunctionList { rv: 5 }.to_string(),
            "C_GetFunctionList failed with 0x00000005"
        );
    }
}
