//! Text rendering of Cryptoki values.
//!
//! None of these functions can fail. Malformed input (odd lengths, unknown
//! codes, invalid UTF-8) degrades to a raw rendering instead.

use std::fmt::Write as _;

use crate::translate::{
    self, AttributeKind, certificate_type_name, key_type_name, mechanism_name, object_class_name,
};

/// Rendering of an absent (null) reference.
pub const NULL_MARKER: &str = "NULL";
/// Rendering of a present but zero-length buffer.
pub const EMPTY_MARKER: &str = "<empty>";
/// Rendering of a credential when credential logging is off.
pub const REDACTED_MARKER: &str = "*** redacted ***";
/// Annotation for codes missing from the translation tables.
pub const UNRECOGNIZED: &str = "unrecognized";
/// Rendering of `CK_UNAVAILABLE_INFORMATION`.
pub const UNAVAILABLE: &str = "unavailable";

/// Uppercase hex without separators.
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
    out
}

/// Render a byte buffer: `NULL`, `<empty>`, or `N bytes: HEX`.
#[must_use]
pub fn bytes(data: Option<&[u8]>) -> String {
    match data {
        None => NULL_MARKER.to_string(),
        Some([]) => EMPTY_MARKER.to_string(),
        Some(data) => format!("{} bytes: {}", data.len(), hex(data)),
    }
}

/// Render a UTF-8 buffer: `NULL`, `<empty>`, or `N bytes: "TEXT"`.
#[must_use]
pub fn text(data: Option<&[u8]>) -> String {
    match data {
        None => NULL_MARKER.to_string(),
        Some([]) => EMPTY_MARKER.to_string(),
        Some(data) => format!("{} bytes: \"{}\"", data.len(), String::from_utf8_lossy(data)),
    }
}

/// Render an address, or `NULL` for zero.
#[must_use]
pub fn pointer(address: usize) -> String {
    if address == 0 {
        NULL_MARKER.to_string()
    } else {
        format!("0x{address:x}")
    }
}

/// Render an enumerated code as `0xHEX (NAME)` or `0xHEX (unrecognized)`.
#[must_use]
pub fn code(value: u64, lookup: fn(u64) -> Option<&'static str>) -> String {
    format!("0x{value:08X} ({})", lookup(value).unwrap_or(UNRECOGNIZED))
}

/// Render a result code.
#[must_use]
pub fn rv(value: u64) -> String {
    code(value, translate::rv_name)
}

/// Render a flag word as `0xHEX (NAME | NAME)`.
///
/// Bits missing from `table` stay visible in the hex value only.
#[must_use]
pub fn flags(value: u64, table: &[(u64, &str)]) -> String {
    let names: Vec<&str> = table
        .iter()
        .filter(|(bit, _)| value & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    format!("0x{value:08X} ({})", names.join(" | "))
}

/// Render a `CK_BBOOL`.
#[must_use]
pub fn ck_bool(value: u8) -> String {
    match value {
        0 => "CK_FALSE".to_string(),
        1 => "CK_TRUE".to_string(),
        other => format!("0x{other:02X}"),
    }
}

/// Render a `CK_VERSION`.
#[must_use]
pub fn version(major: u8, minor: u8) -> String {
    format!("{major}.{minor:02}")
}

/// Render a blank-padded `CK_UTF8CHAR` field, trimming the padding.
#[must_use]
pub fn padded_text(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    format!("\"{}\"", String::from_utf8_lossy(&field[..end]))
}

/// Render a token-info counter that may hold a sentinel value.
///
/// `unavailable` is `CK_UNAVAILABLE_INFORMATION` at the caller's `CK_ULONG`
/// width. Zero means `CK_EFFECTIVELY_INFINITE` for the session maxima only.
#[must_use]
pub fn counter(value: u64, unavailable: u64, zero_is_infinite: bool) -> String {
    if value == unavailable {
        "CK_UNAVAILABLE_INFORMATION".to_string()
    } else if zero_is_infinite && value == 0 {
        "CK_EFFECTIVELY_INFINITE".to_string()
    } else {
        value.to_string()
    }
}

/// Decode a native-endian `CK_ULONG` of either platform width.
#[must_use]
pub fn decode_ulong(bytes: &[u8]) -> Option<u64> {
    match bytes.len() {
        4 => bytes.try_into().ok().map(|b| u64::from(u32::from_ne_bytes(b))),
        8 => bytes.try_into().ok().map(u64::from_ne_bytes),
        _ => None,
    }
}

/// Render an attribute value whose kind does not need pointer chasing.
///
/// `ulong_width` is `size_of::<CK_ULONG>()` on the calling platform. Nested
/// templates are the caller's job; given one here, the raw bytes are shown.
#[must_use]
pub fn attribute_value(kind: AttributeKind, value: &[u8], ulong_width: usize) -> String {
    if value.is_empty() {
        return EMPTY_MARKER.to_string();
    }
    let enumerated = |lookup: fn(u64) -> Option<&'static str>| {
        decode_ulong(value).map_or_else(|| bytes(Some(value)), |v| code(v, lookup))
    };
    match kind {
        AttributeKind::Bool if value.len() == 1 => ck_bool(value[0]),
        AttributeKind::Ulong => {
            decode_ulong(value).map_or_else(|| bytes(Some(value)), |v| v.to_string())
        }
        AttributeKind::ObjectClass => enumerated(object_class_name),
        AttributeKind::KeyType => enumerated(key_type_name),
        AttributeKind::CertificateType => enumerated(certificate_type_name),
        AttributeKind::Mechanism => enumerated(mechanism_name),
        AttributeKind::Date => date(value),
        AttributeKind::Text => text(Some(value)),
        AttributeKind::MechanismList => mechanism_list(value, ulong_width),
        AttributeKind::Bool | AttributeKind::Template | AttributeKind::Bytes => {
            bytes(Some(value))
        }
    }
}

/// Render a `CK_DATE` as `YYYY-MM-DD`; anything malformed falls back to hex.
#[must_use]
pub fn date(value: &[u8]) -> String {
    if value.len() == 8 && value.iter().all(u8::is_ascii_digit) {
        let text = String::from_utf8_lossy(value);
        format!("{}-{}-{}", &text[..4], &text[4..6], &text[6..])
    } else {
        bytes(Some(value))
    }
}

/// Render a packed `CK_MECHANISM_TYPE` array.
#[must_use]
pub fn mechanism_list(value: &[u8], ulong_width: usize) -> String {
    if ulong_width == 0 || value.len() % ulong_width != 0 {
        return bytes(Some(value));
    }
    let names: Vec<String> = value
        .chunks_exact(ulong_width)
        .filter_map(decode_ulong)
        .map(|m| code(m, mechanism_name))
        .collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{CKM_AES_CBC, CKO_SECRET_KEY};

    #[test]
    fn null_and_empty_are_distinct() {
        assert_eq!(bytes(None), "NULL");
        assert_eq!(bytes(Some(&[])), "<empty>");
        assert_ne!(bytes(None), bytes(Some(&[])));
    }

    #[test]
    fn buffers_carry_length_and_hex() {
        assert_eq!(bytes(Some(&[0xDE, 0xAD, 0xBE, 0xEF])), "4 bytes: DEADBEEF");
        assert_eq!(hex(&[0x00, 0x0A]), "000A");
    }

    #[test]
    fn unknown_codes_keep_raw_value() {
        assert_eq!(rv(0), "0x00000000 (CKR_OK)");
        assert_eq!(rv(0x7777), "0x00007777 (unrecognized)");
        assert_eq!(
            code(0x7FFF_0001, mechanism_name),
            "0x7FFF0001 (unrecognized)"
        );
    }

    #[test]
    fn flags_name_known_bits_only() {
        let table = translate::SESSION_FLAGS;
        assert_eq!(
            flags(0x6, table),
            "0x00000006 (CKF_RW_SESSION | CKF_SERIAL_SESSION)"
        );
        assert_eq!(flags(0x104, table), "0x00000104 (CKF_SERIAL_SESSION)");
        assert_eq!(flags(0, table), "0x00000000 ()");
    }

    #[test]
    fn text_keeps_length_and_quotes() {
        assert_eq!(text(Some(b"1234")), "4 bytes: \"1234\"");
        assert_eq!(text(Some(b"")), "<empty>");
        assert_eq!(text(None), "NULL");
    }

    #[test]
    fn padded_fields_are_trimmed() {
        assert_eq!(padded_text(b"SoftHSM         "), "\"SoftHSM\"");
        assert_eq!(padded_text(b"                "), "\"\"");
        assert_eq!(padded_text(b"a b\0\0"), "\"a b\"");
    }

    #[test]
    fn counters_render_sentinels() {
        let unavailable = u64::from(u32::MAX);
        assert_eq!(counter(unavailable, unavailable, false), "CK_UNAVAILABLE_INFORMATION");
        assert_eq!(counter(0, unavailable, true), "CK_EFFECTIVELY_INFINITE");
        assert_eq!(counter(0, unavailable, false), "0");
        assert_eq!(counter(12, unavailable, true), "12");
    }

    #[test]
    fn attribute_values_by_kind() {
        assert_eq!(attribute_value(AttributeKind::Bool, &[1], 8), "CK_TRUE");
        assert_eq!(attribute_value(AttributeKind::Bool, &[1, 0], 8), "2 bytes: 0100");
        assert_eq!(
            attribute_value(AttributeKind::ObjectClass, &CKO_SECRET_KEY.to_ne_bytes(), 8),
            "0x00000004 (CKO_SECRET_KEY)"
        );
        assert_eq!(
            attribute_value(AttributeKind::Ulong, &32u32.to_ne_bytes(), 4),
            "32"
        );
        assert_eq!(attribute_value(AttributeKind::Ulong, &[1, 2, 3], 8), "3 bytes: 010203");
        assert_eq!(attribute_value(AttributeKind::Text, b"key", 8), "3 bytes: \"key\"");
        assert_eq!(attribute_value(AttributeKind::Date, b"20261016", 8), "2026-10-16");
        assert_eq!(attribute_value(AttributeKind::Date, b"2026", 8), "4 bytes: 32303236");
        assert_eq!(attribute_value(AttributeKind::Bytes, &[], 8), "<empty>");
    }

    #[test]
    fn mechanism_lists_split_by_width() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&CKM_AES_CBC.to_ne_bytes());
        raw.extend_from_slice(&0x7FFF_0001u64.to_ne_bytes());
        assert_eq!(
            mechanism_list(&raw, 8),
            "[0x00001082 (CKM_AES_CBC), 0x7FFF0001 (unrecognized)]"
        );
        assert_eq!(mechanism_list(&raw[..5], 8), "5 bytes: 8210000000");
    }
}
