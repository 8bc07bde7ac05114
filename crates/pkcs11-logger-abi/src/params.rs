//! Descriptor-driven reading and rendering of call parameters.
//!
//! Arguments arrive as machine words. A word is reinterpreted according to
//! its [`Shape`]: a scalar is rendered directly, a pointer is checked for
//! null and then read with unaligned copies only. Nothing here writes to
//! caller memory.

use std::mem::size_of;

use pkcs11_logger_core::Record;
use pkcs11_logger_core::render::{self, EMPTY_MARKER, NULL_MARKER, REDACTED_MARKER, UNAVAILABLE};
use pkcs11_logger_core::translate::{self, AttributeKind};

use crate::ck::{
    CK_ATTRIBUTE, CK_C_INITIALIZE_ARGS, CK_INFO, CK_MECHANISM, CK_MECHANISM_INFO, CK_RV,
    CK_SESSION_INFO, CK_SLOT_INFO, CK_TOKEN_INFO, CK_ULONG, CK_UNAVAILABLE_INFORMATION, CK_VERSION,
    CKR_OK, widen,
};
use crate::dispatch::{Len, OpDescriptor, ParamSpec, Shape};
use crate::util::{read_bytes, read_value};

/// Nesting limit for templates inside attribute values.
pub const MAX_TEMPLATE_DEPTH: usize = 4;

const ULONG_WIDTH: usize = size_of::<CK_ULONG>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the real call.
    Input,
    /// After the real call.
    Output,
}

/// Whether attribute values in a template hold data yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Values {
    Filled,
    /// Buffers handed to `C_GetAttributeValue`, not written yet.
    Pending,
}

/// Per-call rendering state.
pub struct RenderContext<'a> {
    descriptor: &'static OpDescriptor,
    args: &'a [usize],
    credentials_visible: bool,
    rv: Option<CK_RV>,
    redactions: u64,
}

impl<'a> RenderContext<'a> {
    #[must_use]
    pub fn new(
        descriptor: &'static OpDescriptor,
        args: &'a [usize],
        credentials_visible: bool,
    ) -> Self {
        Self {
            descriptor,
            args,
            credentials_visible,
            rv: None,
            redactions: 0,
        }
    }

    /// Record the real call's result; output buffers are shown only on success.
    pub fn set_result(&mut self, rv: CK_RV) {
        self.rv = Some(rv);
    }

    /// Values replaced by the redaction marker so far.
    #[must_use]
    pub fn redactions(&self) -> u64 {
        self.redactions
    }

    /// Append one line (or line group) per parameter belonging to `phase`.
    ///
    /// # Safety
    ///
    /// The argument words must satisfy the Cryptoki contract of the operation
    /// the descriptor describes.
    pub unsafe fn render(&mut self, record: &mut Record, phase: Phase) {
        let descriptor = self.descriptor;
        for (index, spec) in descriptor.params.iter().enumerate() {
            let wanted = match phase {
                Phase::Input => spec.dir.is_input(),
                Phase::Output => spec.dir.is_output(),
            };
            if wanted {
                let word = self.args.get(index).copied().unwrap_or(0);
                // SAFETY: forwarded from this function's contract.
                unsafe { self.param(record, spec, word, phase) };
            }
        }
    }

    fn withheld(&self, phase: Phase) -> bool {
        phase == Phase::Output && self.rv != Some(CKR_OK)
    }

    fn arg(&self, name: &str) -> Option<usize> {
        self.descriptor
            .position(name)
            .and_then(|index| self.args.get(index).copied())
    }

    /// Resolve an element count.
    unsafe fn length(&self, len: Len) -> Option<usize> {
        match len {
            Len::Value(name) => self.arg(name).map(|word| word as CK_ULONG as usize),
            // SAFETY: a count pointer is null or points at a CK_ULONG.
            Len::Pointee(name) => unsafe { read_value::<CK_ULONG>(self.arg(name)?) }
                .map(|count| count as usize),
            Len::Fixed(n) => Some(n),
        }
    }

    unsafe fn param(&mut self, record: &mut Record, spec: &ParamSpec, word: usize, phase: Phase) {
        let name = spec.name;
        if !matches!(spec.shape, Shape::AttributeQuery(_) | Shape::UlongRef)
            && word != 0
            && self.withheld(phase)
        {
            record.param(name, render::pointer(word));
            return;
        }
        // SAFETY (all arms): each shape reads exactly what Cryptoki says the
        // parameter points at, after a null check.
        unsafe {
            match spec.shape {
                Shape::Ulong => record.param(name, ulong(word)),
                Shape::Bool => record.param(name, render::ck_bool(word as u8)),
                Shape::Pointer => record.param(name, render::pointer(word)),
                Shape::SessionFlags => {
                    record.param(name, render::flags(ulong(word), translate::SESSION_FLAGS));
                }
                Shape::WaitFlags => {
                    record.param(name, render::flags(ulong(word), translate::WAIT_FLAGS));
                }
                Shape::UserType => {
                    record.param(name, render::code(ulong(word), translate::user_type_name));
                }
                Shape::MechanismType => {
                    record.param(name, render::code(ulong(word), translate::mechanism_name));
                }
                Shape::UlongRef => record.param(
                    name,
                    read_value::<CK_ULONG>(word)
                        .map_or_else(|| NULL_MARKER.to_string(), |v| v.to_string()),
                ),
                Shape::Bytes(len) => {
                    let data = match self.length(len) {
                        Some(n) => read_bytes(word, n),
                        None if word == 0 => None,
                        None => return record.param(name, render::pointer(word)),
                    };
                    record.param(name, render::bytes(data));
                }
                Shape::Credential(len) => self.credential(record, name, word, len),
                Shape::Text(len) => {
                    let text = self
                        .length(len)
                        .and_then(|n| read_bytes(word, n))
                        .map_or_else(|| NULL_MARKER.to_string(), render::padded_text);
                    record.param(name, text);
                }
                Shape::Template(len) => {
                    let count = self.length(len);
                    self.template(record, name, word, count, Values::Filled, 0);
                }
                Shape::AttributeQuery(len) => {
                    let count = self.length(len);
                    let values = match phase {
                        Phase::Input => Values::Pending,
                        Phase::Output => Values::Filled,
                    };
                    self.template(record, name, word, count, values, 0);
                }
                Shape::Mechanism => mechanism(record, name, word),
                Shape::InitArgs => init_args(record, name, word),
                Shape::Info => info(record, name, word),
                Shape::SlotInfo => slot_info(record, name, word),
                Shape::TokenInfo => token_info(record, name, word),
                Shape::SessionInfo => session_info(record, name, word),
                Shape::MechanismInfo => mechanism_info(record, name, word),
                Shape::SlotList(len) | Shape::HandleList(len) => {
                    let count = self.length(len);
                    ulong_list(record, name, word, count, |v| v.to_string());
                }
                Shape::MechanismList(len) => {
                    let count = self.length(len);
                    ulong_list(record, name, word, count, |v| {
                        render::code(v, translate::mechanism_name)
                    });
                }
                Shape::FunctionList => {
                    let list = read_value::<usize>(word)
                        .map_or_else(|| NULL_MARKER.to_string(), render::pointer);
                    record.param(name, list);
                }
            }
        }
    }

    unsafe fn credential(&mut self, record: &mut Record, name: &str, word: usize, len: Len) {
        if word == 0 {
            return record.param(name, NULL_MARKER);
        }
        if !self.credentials_visible {
            self.redactions += 1;
            return record.param(name, REDACTED_MARKER);
        }
        // SAFETY: non-null PIN buffer of the declared length.
        let pin = unsafe { self.length(len).and_then(|n| read_bytes(word, n)) };
        record.param(name, render::text(pin));
    }

    /// Render a `CK_ATTRIBUTE` array, one line per attribute.
    unsafe fn template(
        &mut self,
        record: &mut Record,
        name: &str,
        addr: usize,
        count: Option<usize>,
        values: Values,
        depth: usize,
    ) {
        if addr == 0 {
            return record.param(name, NULL_MARKER);
        }
        let Some(count) = count else {
            return record.param(name, render::pointer(addr));
        };
        if count == 0 {
            return record.param(name, EMPTY_MARKER);
        }
        record.param(name, format_args!("{count} attributes"));

        let attributes: Vec<CK_ATTRIBUTE> = (0..count)
            .filter_map(|i| {
                // SAFETY: `count` attributes start at `addr`.
                unsafe { read_value::<CK_ATTRIBUTE>(addr + i * size_of::<CK_ATTRIBUTE>()) }
            })
            .collect();
        let class = match values {
            // SAFETY: filled attribute values are readable for their length.
            Values::Filled => unsafe { class_hint(&attributes) },
            Values::Pending => None,
        };

        for (i, attribute) in attributes.iter().enumerate() {
            let label = format!("{name}[{i}]");
            let kind = widen(attribute.type_);
            let len = attribute.ulValueLen;
            let value_addr = attribute.pValue as usize;
            let len_text = if len == CK_UNAVAILABLE_INFORMATION {
                UNAVAILABLE.to_string()
            } else {
                len.to_string()
            };

            let mut nested = None;
            let value = if value_addr == 0 {
                NULL_MARKER.to_string()
            } else if len == CK_UNAVAILABLE_INFORMATION {
                UNAVAILABLE.to_string()
            } else if values == Values::Pending {
                render::pointer(value_addr)
            } else if translate::is_secret_attribute(kind, class) && !self.credentials_visible {
                self.redactions += 1;
                REDACTED_MARKER.to_string()
            } else {
                let value_kind = translate::attribute_kind(kind);
                if value_kind == AttributeKind::Template && depth < MAX_TEMPLATE_DEPTH {
                    nested = Some(len as usize / size_of::<CK_ATTRIBUTE>());
                    render::pointer(value_addr)
                } else {
                    // SAFETY: a filled value is readable for its length.
                    let bytes = unsafe { read_bytes(value_addr, len as usize) }.unwrap_or(&[]);
                    render::attribute_value(value_kind, bytes, ULONG_WIDTH)
                }
            };
            record.param(
                &label,
                format_args!(
                    "{} len={len_text} value={value}",
                    render::code(kind, translate::attribute_name)
                ),
            );
            if let Some(inner) = nested {
                let inner_name = format!("{label}.pValue");
                // SAFETY: a nested template value is itself an attribute array.
                unsafe {
                    self.template(record, &inner_name, value_addr, Some(inner), values, depth + 1);
                }
            }
        }
    }
}

fn ulong(word: usize) -> u64 {
    widen(word as CK_ULONG)
}

/// `CKA_CLASS` of a template, used to decide whether `CKA_VALUE` is secret.
unsafe fn class_hint(attributes: &[CK_ATTRIBUTE]) -> Option<u64> {
    let class = attributes.iter().find(|attribute| {
        widen(attribute.type_) == translate::CKA_CLASS
            && attribute.ulValueLen as usize == ULONG_WIDTH
    })?;
    // SAFETY: a CKA_CLASS value of CK_ULONG width holds a CK_ULONG.
    unsafe { read_value::<CK_ULONG>(class.pValue as usize) }.map(widen)
}

fn field(record: &mut Record, name: &str, field: &str, value: impl std::fmt::Display) {
    record.param(&format!("{name}.{field}"), value);
}

fn version(value: CK_VERSION) -> String {
    render::version(value.major, value.minor)
}

unsafe fn mechanism(record: &mut Record, name: &str, addr: usize) {
    // SAFETY: null or a CK_MECHANISM.
    let Some(mechanism) = (unsafe { read_value::<CK_MECHANISM>(addr) }) else {
        return record.param(name, NULL_MARKER);
    };
    field(
        record,
        name,
        "mechanism",
        render::code(widen(mechanism.mechanism), translate::mechanism_name),
    );
    // SAFETY: the parameter block is readable for its declared length.
    let parameter =
        unsafe { read_bytes(mechanism.pParameter as usize, mechanism.ulParameterLen as usize) };
    field(record, name, "pParameter", render::bytes(parameter));
}

unsafe fn init_args(record: &mut Record, name: &str, addr: usize) {
    // SAFETY: null or a CK_C_INITIALIZE_ARGS.
    let Some(args) = (unsafe { read_value::<CK_C_INITIALIZE_ARGS>(addr) }) else {
        return record.param(name, NULL_MARKER);
    };
    field(record, name, "CreateMutex", render::pointer(args.CreateMutex as usize));
    field(record, name, "DestroyMutex", render::pointer(args.DestroyMutex as usize));
    field(record, name, "LockMutex", render::pointer(args.LockMutex as usize));
    field(record, name, "UnlockMutex", render::pointer(args.UnlockMutex as usize));
    field(
        record,
        name,
        "flags",
        render::flags(widen(args.flags), translate::INITIALIZE_FLAGS),
    );
    field(record, name, "pReserved", render::pointer(args.pReserved as usize));
}

unsafe fn info(record: &mut Record, name: &str, addr: usize) {
    // SAFETY: null or a CK_INFO.
    let Some(info) = (unsafe { read_value::<CK_INFO>(addr) }) else {
        return record.param(name, NULL_MARKER);
    };
    field(record, name, "cryptokiVersion", version(info.cryptokiVersion));
    field(record, name, "manufacturerID", render::padded_text(&{ info.manufacturerID }));
    field(record, name, "flags", render::flags(widen(info.flags), &[]));
    field(
        record,
        name,
        "libraryDescription",
        render::padded_text(&{ info.libraryDescription }),
    );
    field(record, name, "libraryVersion", version(info.libraryVersion));
}

unsafe fn slot_info(record: &mut Record, name: &str, addr: usize) {
    // SAFETY: null or a CK_SLOT_INFO.
    let Some(info) = (unsafe { read_value::<CK_SLOT_INFO>(addr) }) else {
        return record.param(name, NULL_MARKER);
    };
    field(
        record,
        name,
        "slotDescription",
        render::padded_text(&{ info.slotDescription }),
    );
    field(record, name, "manufacturerID", render::padded_text(&{ info.manufacturerID }));
    field(
        record,
        name,
        "flags",
        render::flags(widen(info.flags), translate::SLOT_FLAGS),
    );
    field(record, name, "hardwareVersion", version(info.hardwareVersion));
    field(record, name, "firmwareVersion", version(info.firmwareVersion));
}

unsafe fn token_info(record: &mut Record, name: &str, addr: usize) {
    // SAFETY: null or a CK_TOKEN_INFO.
    let Some(info) = (unsafe { read_value::<CK_TOKEN_INFO>(addr) }) else {
        return record.param(name, NULL_MARKER);
    };
    let unavailable = widen(CK_UNAVAILABLE_INFORMATION);
    let counter = |value: CK_ULONG, zero_is_infinite: bool| {
        render::counter(widen(value), unavailable, zero_is_infinite)
    };
    field(record, name, "label", render::padded_text(&{ info.label }));
    field(record, name, "manufacturerID", render::padded_text(&{ info.manufacturerID }));
    field(record, name, "model", render::padded_text(&{ info.model }));
    field(record, name, "serialNumber", render::padded_text(&{ info.serialNumber }));
    field(
        record,
        name,
        "flags",
        render::flags(widen(info.flags), translate::TOKEN_FLAGS),
    );
    field(record, name, "ulMaxSessionCount", counter(info.ulMaxSessionCount, true));
    field(record, name, "ulSessionCount", counter(info.ulSessionCount, false));
    field(record, name, "ulMaxRwSessionCount", counter(info.ulMaxRwSessionCount, true));
    field(record, name, "ulRwSessionCount", counter(info.ulRwSessionCount, false));
    field(record, name, "ulMaxPinLen", counter(info.ulMaxPinLen, false));
    field(record, name, "ulMinPinLen", counter(info.ulMinPinLen, false));
    field(record, name, "ulTotalPublicMemory", counter(info.ulTotalPublicMemory, false));
    field(record, name, "ulFreePublicMemory", counter(info.ulFreePublicMemory, false));
    field(record, name, "ulTotalPrivateMemory", counter(info.ulTotalPrivateMemory, false));
    field(record, name, "ulFreePrivateMemory", counter(info.ulFreePrivateMemory, false));
    field(record, name, "hardwareVersion", version(info.hardwareVersion));
    field(record, name, "firmwareVersion", version(info.firmwareVersion));
    field(record, name, "utcTime", render::padded_text(&{ info.utcTime }));
}

unsafe fn session_info(record: &mut Record, name: &str, addr: usize) {
    // SAFETY: null or a CK_SESSION_INFO.
    let Some(info) = (unsafe { read_value::<CK_SESSION_INFO>(addr) }) else {
        return record.param(name, NULL_MARKER);
    };
    field(record, name, "slotID", widen(info.slotID));
    field(
        record,
        name,
        "state",
        render::code(widen(info.state), translate::state_name),
    );
    field(
        record,
        name,
        "flags",
        render::flags(widen(info.flags), translate::SESSION_FLAGS),
    );
    field(record, name, "ulDeviceError", widen(info.ulDeviceError));
}

unsafe fn mechanism_info(record: &mut Record, name: &str, addr: usize) {
    // SAFETY: null or a CK_MECHANISM_INFO.
    let Some(info) = (unsafe { read_value::<CK_MECHANISM_INFO>(addr) }) else {
        return record.param(name, NULL_MARKER);
    };
    field(record, name, "ulMinKeySize", widen(info.ulMinKeySize));
    field(record, name, "ulMaxKeySize", widen(info.ulMaxKeySize));
    field(
        record,
        name,
        "flags",
        render::flags(widen(info.flags), translate::MECHANISM_FLAGS),
    );
}

/// Render a `CK_ULONG` array: its count, then one line per element.
unsafe fn ulong_list(
    record: &mut Record,
    name: &str,
    addr: usize,
    count: Option<usize>,
    item: impl Fn(u64) -> String,
) {
    if addr == 0 {
        return record.param(name, NULL_MARKER);
    }
    let Some(count) = count else {
        return record.param(name, render::pointer(addr));
    };
    record.param(name, format_args!("{count} entries"));
    for i in 0..count {
        // SAFETY: `count` elements start at `addr`.
        if let Some(value) = unsafe { read_value::<CK_ULONG>(addr + i * ULONG_WIDTH) } {
            record.param(&format!("{name}[{i}]"), item(widen(value)));
        }
    }
}
