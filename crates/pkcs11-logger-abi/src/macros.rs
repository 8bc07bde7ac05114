//! Helper macros for ABI function generation.
//!
//! Provides the `proxy_functions!` macro that turns one table of Cryptoki
//! signatures into the exported entry points, the function list handed to
//! callers, and the parameter descriptors the dispatcher logs from.

/// Generate the whole Cryptoki surface from one ordered table.
///
/// # Usage
///
/// ```ignore
/// proxy_functions! {
///     fn C_DigestUpdate(
///         hSession: CK_SESSION_HANDLE => In(Ulong),
///         pPart: CK_BYTE_PTR => In(Bytes(Value("ulPartLen"))),
///         ulPartLen: CK_ULONG => In(Ulong),
///     );
///     fn C_GetFunctionList(
///         ppFunctionList: CK_FUNCTION_LIST_PTR_PTR => Out(FunctionList),
///     ) => own_function_list;
/// }
/// ```
///
/// Entries must appear in `CK_FUNCTION_LIST` order. For each entry this
/// expands to a `#[unsafe(no_mangle)] pub unsafe extern "C" fn` that hands its
/// arguments to [`ProxyState::dispatch`](crate::state::ProxyState). The
/// dispatcher forwards to the real module's entry of the same name, or to the
/// local function named after `=>`.
///
/// Alongside the entry points it generates `CK_FUNCTION_LIST`, `OpId`,
/// `OPERATIONS`, `FUNCTION_LIST` and `operation`.
macro_rules! proxy_functions {
    (@forward $functions:ident, $name:ident, ($($arg:ident),*)) => {{
        let real = { $functions.$name }?;
        // SAFETY: the caller's arguments, passed on unchanged to the entry
        // point the real module registered for this operation.
        Some(unsafe { real($($arg),*) })
    }};
    (@forward $functions:ident, $name:ident, ($($arg:ident),*), $local:path) => {{
        let _ = $functions;
        // SAFETY: the caller's arguments, unchanged.
        Some(unsafe { $local($($arg),*) })
    }};
    (
        $(
            $(#[$meta:meta])*
            fn $name:ident( $($arg:ident : $argty:ty => $dir:ident($shape:expr)),* $(,)? )
            $(=> $local:path)?;
        )+
    ) => {
        /// Cryptoki v2.40 function list.
        #[repr(C)]
        #[cfg_attr(windows, repr(packed))]
        #[derive(Clone, Copy)]
        #[allow(non_camel_case_types, non_snake_case)]
        pub struct CK_FUNCTION_LIST {
            pub version: $crate::ck::CK_VERSION,
            $(pub $name: Option<unsafe extern "C" fn($($argty),*) -> $crate::ck::CK_RV>,)+
        }

        impl CK_FUNCTION_LIST {
            /// A list with every entry absent.
            pub const EMPTY: Self = Self {
                version: $crate::ck::CK_VERSION { major: 0, minor: 0 },
                $($name: None,)+
            };
        }

        impl ::std::fmt::Debug for CK_FUNCTION_LIST {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let version = self.version;
                let present = [$({ self.$name }.is_some()),+].iter().filter(|p| **p).count();
                f.debug_struct("CK_FUNCTION_LIST")
                    .field("version", &version)
                    .field("present", &present)
                    .finish()
            }
        }

        /// Identifies one operation; the discriminant indexes [`OPERATIONS`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(non_camel_case_types)]
        pub enum OpId {
            $($name,)+
        }

        impl OpId {
            #[must_use]
            pub fn descriptor(self) -> &'static $crate::dispatch::OpDescriptor {
                &OPERATIONS[self as usize]
            }
        }

        /// Parameter descriptors, in `CK_FUNCTION_LIST` order.
        pub static OPERATIONS: &[$crate::dispatch::OpDescriptor] = &[
            $(
                $crate::dispatch::OpDescriptor {
                    name: stringify!($name),
                    params: &[
                        $(
                            $crate::dispatch::ParamSpec {
                                name: stringify!($arg),
                                dir: $crate::dispatch::Dir::$dir,
                                shape: $shape,
                            },
                        )*
                    ],
                },
            )+
        ];

        /// The list returned by the proxy's own `C_GetFunctionList`.
        pub static FUNCTION_LIST: CK_FUNCTION_LIST = CK_FUNCTION_LIST {
            version: $crate::ck::PROXY_VERSION,
            $($name: Some($name),)+
        };

        /// Look up an operation descriptor by its exported name.
        #[must_use]
        pub fn operation(name: &str) -> Option<&'static $crate::dispatch::OpDescriptor> {
            OPERATIONS.iter().find(|op| op.name == name)
        }

        $(
            $(#[$meta])*
            #[unsafe(no_mangle)]
            #[allow(non_snake_case)]
            pub unsafe extern "C" fn $name($($arg: $argty),*) -> $crate::ck::CK_RV {
                use $crate::dispatch::ArgWord as _;
                let args = [$($arg.word()),*];
                let forward = |functions: &CK_FUNCTION_LIST| {
                    proxy_functions!(@forward functions, $name, ($($arg),*) $(, $local)?)
                };
                // SAFETY: `args` are this call's arguments in declaration
                // order, as the descriptor for this operation expects.
                unsafe { $crate::state::global().dispatch(OpId::$name, &args, forward) }
            }
        )+
    };
}
