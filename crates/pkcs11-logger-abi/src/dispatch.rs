//! Generic interception of a Cryptoki call.
//!
//! Every exported entry point reduces to one call of [`ProxyState::dispatch`]
//! with its [`OpId`], its raw arguments flattened to machine words, and a
//! closure that forwards to the real module. What to log for each parameter
//! comes from the static [`OpDescriptor`] table; no entry point carries its
//! own logging code.

use pkcs11_logger_core::metrics::ProxyMetrics;
use pkcs11_logger_core::record::{self, INIT_FAILED, INPUT, OUTPUT, Record};

use crate::ck::{
    CK_BBOOL, CK_FUNCTION_LIST, CK_NOTIFY, CK_RV, CK_ULONG, CKR_FUNCTION_NOT_SUPPORTED,
    CKR_GENERAL_ERROR, widen,
};
use crate::params::{Phase, RenderContext};
use crate::proxy_abi::OpId;
use crate::state::ProxyState;
use crate::util;

/// Direction of a parameter relative to the real module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    In,
    Out,
    InOut,
}

impl Dir {
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }

    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }
}

/// Where the element count of a buffer or array comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Len {
    /// The named parameter holds the count.
    Value(&'static str),
    /// The named parameter points at the count.
    Pointee(&'static str),
    /// Fixed size.
    Fixed(usize),
}

/// How a parameter is read and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Handle, slot id or count, in decimal.
    Ulong,
    /// `CK_BBOOL` by value.
    Bool,
    /// Opaque address.
    Pointer,
    SessionFlags,
    WaitFlags,
    UserType,
    MechanismType,
    /// Pointer to one `CK_ULONG`.
    UlongRef,
    Bytes(Len),
    /// Byte buffer subject to redaction.
    Credential(Len),
    /// Blank-padded UTF-8 field.
    Text(Len),
    /// `CK_ATTRIBUTE` array with values.
    Template(Len),
    /// `CK_ATTRIBUTE` array filled in by the module.
    AttributeQuery(Len),
    Mechanism,
    InitArgs,
    Info,
    SlotInfo,
    TokenInfo,
    SessionInfo,
    MechanismInfo,
    SlotList(Len),
    MechanismList(Len),
    HandleList(Len),
    FunctionList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub dir: Dir,
    pub shape: Shape,
}

/// Static description of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpDescriptor {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
}

impl OpDescriptor {
    /// Position of the parameter called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    #[must_use]
    pub fn has_outputs(&self) -> bool {
        self.params.iter().any(|p| p.dir.is_output())
    }
}

/// Flatten an argument to a machine word for descriptor-driven rendering.
pub trait ArgWord: Copy {
    fn word(self) -> usize;
}

impl ArgWord for CK_ULONG {
    #[inline]
    fn word(self) -> usize {
        self as usize
    }
}

impl ArgWord for CK_BBOOL {
    #[inline]
    fn word(self) -> usize {
        usize::from(self)
    }
}

impl<T> ArgWord for *mut T {
    #[inline]
    fn word(self) -> usize {
        self as usize
    }
}

impl<T> ArgWord for *const T {
    #[inline]
    fn word(self) -> usize {
        self as usize
    }
}

impl ArgWord for CK_NOTIFY {
    #[inline]
    fn word(self) -> usize {
        self.map_or(0, |callback| callback as usize)
    }
}

impl ProxyState {
    /// Log and forward one call.
    ///
    /// `invoke` receives the real function list and returns `None` when the
    /// entry it needs is null.
    ///
    /// # Safety
    ///
    /// `args` must be the caller's arguments to `op`, in declaration order,
    /// valid as the Cryptoki contract for `op` requires.
    pub unsafe fn dispatch<F>(&self, op: OpId, args: &[usize], invoke: F) -> CK_RV
    where
        F: FnOnce(&CK_FUNCTION_LIST) -> Option<CK_RV>,
    {
        let descriptor = op.descriptor();
        let metrics = self.metrics();
        ProxyMetrics::inc(&metrics.calls);
        let ids = util::caller_ids(self.settings().flags);

        let module = match self.module() {
            Ok(module) => module,
            Err(err) => {
                ProxyMetrics::inc(&metrics.init_failures);
                let mut block = Record::new(ids);
                block.separator();
                block.enter(descriptor.name, &record::timestamp_now());
                block.note(format_args!("{INIT_FAILED}: {err}"));
                block.exit(widen(CKR_GENERAL_ERROR));
                let failures = self.sink().lock().write(block.as_str());
                ProxyMetrics::add(&metrics.sink_write_failures, failures);
                return CKR_GENERAL_ERROR;
            }
        };

        let guard = self.sink().lock();
        let mut block = Record::new(ids);
        block.separator();
        block.enter(descriptor.name, &record::timestamp_now());
        block.section(INPUT);
        let mut context = RenderContext::new(
            descriptor,
            args,
            self.settings().flags.credentials_visible(),
        );
        // SAFETY: forwarded from this function's contract.
        unsafe { context.render(&mut block, Phase::Input) };
        ProxyMetrics::add(&metrics.sink_write_failures, guard.write(&block.take()));

        let rv = match invoke(module.functions()) {
            Some(rv) => {
                ProxyMetrics::inc(&metrics.forwarded);
                rv
            }
            None => {
                ProxyMetrics::inc(&metrics.unsupported_calls);
                CKR_FUNCTION_NOT_SUPPORTED
            }
        };

        block.exit(widen(rv));
        if descriptor.has_outputs() {
            block.section(OUTPUT);
            context.set_result(rv);
            // SAFETY: as above; outputs are read after the real call.
            unsafe { context.render(&mut block, Phase::Output) };
        }
        ProxyMetrics::add(&metrics.sink_write_failures, guard.write(&block.take()));
        ProxyMetrics::add(&metrics.redactions, context.redactions());
        drop(guard);
        rv
    }
}
