//! Static code-to-name tables for Cryptoki identifiers.
//!
//! Every table is a `match` over constants, so lookups compile to jump tables
//! or binary searches. Lookups are total: a miss yields `None` and callers
//! render the raw value instead.
//!
//! Codes are carried as `u64` regardless of the platform width of
//! `CK_ULONG`; the ABI layer widens before asking.

/// Define one constant per entry and a lookup function over all of them.
///
/// Aliases (two names for one value) must not appear in the same table.
macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $vis:vis fn $lookup:ident;
        $($name:ident = $value:expr),+ $(,)?
    ) => {
        $(pub const $name: u64 = $value;)+

        $(#[$meta])*
        #[must_use]
        $vis fn $lookup(code: u64) -> Option<&'static str> {
            match code {
                $($name => Some(stringify!($name)),)+
                _ => None,
            }
        }
    };
}

/// Define one constant per flag bit and a `(bit, name)` slice for rendering.
macro_rules! flag_table {
    (
        $(#[$meta:meta])*
        $vis:vis static $table:ident;
        $($name:ident = $value:expr),+ $(,)?
    ) => {
        $(pub const $name: u64 = $value;)+

        $(#[$meta])*
        $vis static $table: &[(u64, &str)] = &[$(($name, stringify!($name))),+];
    };
}

// ---------------------------------------------------------------------------
// Result codes
// ---------------------------------------------------------------------------

code_table! {
    /// `CK_RV` names.
    pub fn rv_name;
    CKR_OK = 0x0000_0000,
    CKR_CANCEL = 0x0000_0001,
    CKR_HOST_MEMORY = 0x0000_0002,
    CKR_SLOT_ID_INVALID = 0x0000_0003,
    CKR_GENERAL_ERROR = 0x0000_0005,
    CKR_FUNCTION_FAILED = 0x0000_0006,
    CKR_ARGUMENTS_BAD = 0x0000_0007,
    CKR_NO_EVENT = 0x0000_0008,
    CKR_NEED_TO_CREATE_THREADS = 0x0000_0009,
    CKR_CANT_LOCK = 0x0000_000A,
    CKR_ATTRIBUTE_READ_ONLY = 0x0000_0010,
    CKR_ATTRIBUTE_SENSITIVE = 0x0000_0011,
    CKR_ATTRIBUTE_TYPE_INVALID = 0x0000_0012,
    CKR_ATTRIBUTE_VALUE_INVALID = 0x0000_0013,
    CKR_ACTION_PROHIBITED = 0x0000_001B,
    CKR_DATA_INVALID = 0x0000_0020,
    CKR_DATA_LEN_RANGE = 0x0000_0021,
    CKR_DEVICE_ERROR = 0x0000_0030,
    CKR_DEVICE_MEMORY = 0x0000_0031,
    CKR_DEVICE_REMOVED = 0x0000_0032,
    CKR_ENCRYPTED_DATA_INVALID = 0x0000_0040,
    CKR_ENCRYPTED_DATA_LEN_RANGE = 0x0000_0041,
    CKR_FUNCTION_CANCELED = 0x0000_0050,
    CKR_FUNCTION_NOT_PARALLEL = 0x0000_0051,
    CKR_FUNCTION_NOT_SUPPORTED = 0x0000_0054,
    CKR_KEY_HANDLE_INVALID = 0x0000_0060,
    CKR_KEY_SIZE_RANGE = 0x0000_0062,
    CKR_KEY_TYPE_INCONSISTENT = 0x0000_0063,
    CKR_KEY_NOT_NEEDED = 0x0000_0064,
    CKR_KEY_CHANGED = 0x0000_0065,
    CKR_KEY_NEEDED = 0x0000_0066,
    CKR_KEY_INDIGESTIBLE = 0x0000_0067,
    CKR_KEY_FUNCTION_NOT_PERMITTED = 0x0000_0068,
    CKR_KEY_NOT_WRAPPABLE = 0x0000_0069,
    CKR_KEY_UNEXTRACTABLE = 0x0000_006A,
    CKR_MECHANISM_INVALID = 0x0000_0070,
    CKR_MECHANISM_PARAM_INVALID = 0x0000_0071,
    CKR_OBJECT_HANDLE_INVALID = 0x0000_0082,
    CKR_OPERATION_ACTIVE = 0x0000_0090,
    CKR_OPERATION_NOT_INITIALIZED = 0x0000_0091,
    CKR_PIN_INCORRECT = 0x0000_00A0,
    CKR_PIN_INVALID = 0x0000_00A1,
    CKR_PIN_LEN_RANGE = 0x0000_00A2,
    CKR_PIN_EXPIRED = 0x0000_00A3,
    CKR_PIN_LOCKED = 0x0000_00A4,
    CKR_SESSION_CLOSED = 0x0000_00B0,
    CKR_SESSION_COUNT = 0x0000_00B1,
    CKR_SESSION_HANDLE_INVALID = 0x0000_00B3,
    CKR_SESSION_PARALLEL_NOT_SUPPORTED = 0x0000_00B4,
    CKR_SESSION_READ_ONLY = 0x0000_00B5,
    CKR_SESSION_EXISTS = 0x0000_00B6,
    CKR_SESSION_READ_ONLY_EXISTS = 0x0000_00B7,
    CKR_SESSION_READ_WRITE_SO_EXISTS = 0x0000_00B8,
    CKR_SIGNATURE_INVALID = 0x0000_00C0,
    CKR_SIGNATURE_LEN_RANGE = 0x0000_00C1,
    CKR_TEMPLATE_INCOMPLETE = 0x0000_00D0,
    CKR_TEMPLATE_INCONSISTENT = 0x0000_00D1,
    CKR_TOKEN_NOT_PRESENT = 0x0000_00E0,
    CKR_TOKEN_NOT_RECOGNIZED = 0x0000_00E1,
    CKR_TOKEN_WRITE_PROTECTED = 0x0000_00E2,
    CKR_UNWRAPPING_KEY_HANDLE_INVALID = 0x0000_00F0,
    CKR_UNWRAPPING_KEY_SIZE_RANGE = 0x0000_00F1,
    CKR_UNWRAPPING_KEY_TYPE_INCONSISTENT = 0x0000_00F2,
    CKR_USER_ALREADY_LOGGED_IN = 0x0000_0100,
    CKR_USER_NOT_LOGGED_IN = 0x0000_0101,
    CKR_USER_PIN_NOT_INITIALIZED = 0x0000_0102,
    CKR_USER_TYPE_INVALID = 0x0000_0103,
    CKR_USER_ANOTHER_ALREADY_LOGGED_IN = 0x0000_0104,
    CKR_USER_TOO_MANY_TYPES = 0x0000_0105,
    CKR_WRAPPED_KEY_INVALID = 0x0000_0110,
    CKR_WRAPPED_KEY_LEN_RANGE = 0x0000_0112,
    CKR_WRAPPING_KEY_HANDLE_INVALID = 0x0000_0113,
    CKR_WRAPPING_KEY_SIZE_RANGE = 0x0000_0114,
    CKR_WRAPPING_KEY_TYPE_INCONSISTENT = 0x0000_0115,
    CKR_RANDOM_SEED_NOT_SUPPORTED = 0x0000_0120,
    CKR_RANDOM_NO_RNG = 0x0000_0121,
    CKR_DOMAIN_PARAMS_INVALID = 0x0000_0130,
    CKR_CURVE_NOT_SUPPORTED = 0x0000_0140,
    CKR_BUFFER_TOO_SMALL = 0x0000_0150,
    CKR_SAVED_STATE_INVALID = 0x0000_0160,
    CKR_INFORMATION_SENSITIVE = 0x0000_0170,
    CKR_STATE_UNSAVEABLE = 0x0000_0180,
    CKR_CRYPTOKI_NOT_INITIALIZED = 0x0000_0190,
    CKR_CRYPTOKI_ALREADY_INITIALIZED = 0x0000_0191,
    CKR_MUTEX_BAD = 0x0000_01A0,
    CKR_MUTEX_NOT_LOCKED = 0x0000_01A1,
    CKR_NEW_PIN_MODE = 0x0000_01B0,
    CKR_NEXT_OTP = 0x0000_01B1,
    CKR_EXCEEDED_MAX_ITERATIONS = 0x0000_01B5,
    CKR_FIPS_SELF_TEST_FAILED = 0x0000_01B6,
    CKR_LIBRARY_LOAD_FAILED = 0x0000_01B7,
    CKR_PIN_TOO_WEAK = 0x0000_01B8,
    CKR_PUBLIC_KEY_INVALID = 0x0000_01B9,
    CKR_FUNCTION_REJECTED = 0x0000_0200,
    CKR_VENDOR_DEFINED = 0x8000_0000,
}

// ---------------------------------------------------------------------------
// User types and session states
// ---------------------------------------------------------------------------

code_table! {
    /// `CK_USER_TYPE` names.
    pub fn user_type_name;
    CKU_SO = 0,
    CKU_USER = 1,
    CKU_CONTEXT_SPECIFIC = 2,
}

code_table! {
    /// `CK_STATE` names.
    pub fn state_name;
    CKS_RO_PUBLIC_SESSION = 0,
    CKS_RO_USER_FUNCTIONS = 1,
    CKS_RW_PUBLIC_SESSION = 2,
    CKS_RW_USER_FUNCTIONS = 3,
    CKS_RW_SO_FUNCTIONS = 4,
}

// ---------------------------------------------------------------------------
// Object classes, key and certificate types
// ---------------------------------------------------------------------------

code_table! {
    /// `CK_OBJECT_CLASS` names.
    pub fn object_class_name;
    CKO_DATA = 0x0000_0000,
    CKO_CERTIFICATE = 0x0000_0001,
    CKO_PUBLIC_KEY = 0x0000_0002,
    CKO_PRIVATE_KEY = 0x0000_0003,
    CKO_SECRET_KEY = 0x0000_0004,
    CKO_HW_FEATURE = 0x0000_0005,
    CKO_DOMAIN_PARAMETERS = 0x0000_0006,
    CKO_MECHANISM = 0x0000_0007,
    CKO_OTP_KEY = 0x0000_0008,
    CKO_VENDOR_DEFINED = 0x8000_0000,
}

code_table! {
    /// `CK_KEY_TYPE` names.
    pub fn key_type_name;
    CKK_RSA = 0x0000_0000,
    CKK_DSA = 0x0000_0001,
    CKK_DH = 0x0000_0002,
    CKK_EC = 0x0000_0003,
    CKK_X9_42_DH = 0x0000_0004,
    CKK_KEA = 0x0000_0005,
    CKK_GENERIC_SECRET = 0x0000_0010,
    CKK_RC2 = 0x0000_0011,
    CKK_RC4 = 0x0000_0012,
    CKK_DES = 0x0000_0013,
    CKK_DES2 = 0x0000_0014,
    CKK_DES3 = 0x0000_0015,
    CKK_CAST = 0x0000_0016,
    CKK_CAST3 = 0x0000_0017,
    CKK_CAST128 = 0x0000_0018,
    CKK_RC5 = 0x0000_0019,
    CKK_IDEA = 0x0000_001A,
    CKK_SKIPJACK = 0x0000_001B,
    CKK_BATON = 0x0000_001C,
    CKK_JUNIPER = 0x0000_001D,
    CKK_CDMF = 0x0000_001E,
    CKK_AES = 0x0000_001F,
    CKK_BLOWFISH = 0x0000_0020,
    CKK_TWOFISH = 0x0000_0021,
    CKK_SECURID = 0x0000_0022,
    CKK_HOTP = 0x0000_0023,
    CKK_ACTI = 0x0000_0024,
    CKK_CAMELLIA = 0x0000_0025,
    CKK_ARIA = 0x0000_0026,
    CKK_MD5_HMAC = 0x0000_0027,
    CKK_SHA_1_HMAC = 0x0000_0028,
    CKK_RIPEMD128_HMAC = 0x0000_0029,
    CKK_RIPEMD160_HMAC = 0x0000_002A,
    CKK_SHA256_HMAC = 0x0000_002B,
    CKK_SHA384_HMAC = 0x0000_002C,
    CKK_SHA512_HMAC = 0x0000_002D,
    CKK_SHA224_HMAC = 0x0000_002E,
    CKK_SEED = 0x0000_002F,
    CKK_GOSTR3410 = 0x0000_0030,
    CKK_GOSTR3411 = 0x0000_0031,
    CKK_GOST28147 = 0x0000_0032,
    CKK_VENDOR_DEFINED = 0x8000_0000,
}

code_table! {
    /// `CK_CERTIFICATE_TYPE` names.
    pub fn certificate_type_name;
    CKC_X_509 = 0x0000_0000,
    CKC_X_509_ATTR_CERT = 0x0000_0001,
    CKC_WTLS = 0x0000_0002,
    CKC_VENDOR_DEFINED = 0x8000_0000,
}

// ---------------------------------------------------------------------------
// Mechanisms
// ---------------------------------------------------------------------------

code_table! {
    /// `CK_MECHANISM_TYPE` names.
    pub fn mechanism_name;
    CKM_RSA_PKCS_KEY_PAIR_GEN = 0x0000_0000,
    CKM_RSA_PKCS = 0x0000_0001,
    CKM_RSA_9796 = 0x0000_0002,
    CKM_RSA_X_509 = 0x0000_0003,
    CKM_MD2_RSA_PKCS = 0x0000_0004,
    CKM_MD5_RSA_PKCS = 0x0000_0005,
    CKM_SHA1_RSA_PKCS = 0x0000_0006,
    CKM_RIPEMD128_RSA_PKCS = 0x0000_0007,
    CKM_RIPEMD160_RSA_PKCS = 0x0000_0008,
    CKM_RSA_PKCS_OAEP = 0x0000_0009,
    CKM_RSA_X9_31_KEY_PAIR_GEN = 0x0000_000A,
    CKM_RSA_X9_31 = 0x0000_000B,
    CKM_SHA1_RSA_X9_31 = 0x0000_000C,
    CKM_RSA_PKCS_PSS = 0x0000_000D,
    CKM_SHA1_RSA_PKCS_PSS = 0x0000_000E,
    CKM_DSA_KEY_PAIR_GEN = 0x0000_0010,
    CKM_DSA = 0x0000_0011,
    CKM_DSA_SHA1 = 0x0000_0012,
    CKM_DSA_SHA224 = 0x0000_0013,
    CKM_DSA_SHA256 = 0x0000_0014,
    CKM_DSA_SHA384 = 0x0000_0015,
    CKM_DSA_SHA512 = 0x0000_0016,
    CKM_DH_PKCS_KEY_PAIR_GEN = 0x0000_0020,
    CKM_DH_PKCS_DERIVE = 0x0000_0021,
    CKM_X9_42_DH_KEY_PAIR_GEN = 0x0000_0030,
    CKM_X9_42_DH_DERIVE = 0x0000_0031,
    CKM_X9_42_DH_HYBRID_DERIVE = 0x0000_0032,
    CKM_X9_42_MQV_DERIVE = 0x0000_0033,
    CKM_SHA256_RSA_PKCS = 0x0000_0040,
    CKM_SHA384_RSA_PKCS = 0x0000_0041,
    CKM_SHA512_RSA_PKCS = 0x0000_0042,
    CKM_SHA256_RSA_PKCS_PSS = 0x0000_0043,
    CKM_SHA384_RSA_PKCS_PSS = 0x0000_0044,
    CKM_SHA512_RSA_PKCS_PSS = 0x0000_0045,
    CKM_SHA224_RSA_PKCS = 0x0000_0046,
    CKM_SHA224_RSA_PKCS_PSS = 0x0000_0047,
    CKM_SHA512_224 = 0x0000_0048,
    CKM_SHA512_224_HMAC = 0x0000_0049,
    CKM_SHA512_224_HMAC_GENERAL = 0x0000_004A,
    CKM_SHA512_224_KEY_DERIVATION = 0x0000_004B,
    CKM_SHA512_256 = 0x0000_004C,
    CKM_SHA512_256_HMAC = 0x0000_004D,
    CKM_SHA512_256_HMAC_GENERAL = 0x0000_004E,
    CKM_SHA512_256_KEY_DERIVATION = 0x0000_004F,
    CKM_SHA512_T = 0x0000_0050,
    CKM_SHA512_T_HMAC = 0x0000_0051,
    CKM_SHA512_T_HMAC_GENERAL = 0x0000_0052,
    CKM_SHA512_T_KEY_DERIVATION = 0x0000_0053,
    CKM_RC2_KEY_GEN = 0x0000_0100,
    CKM_RC2_ECB = 0x0000_0101,
    CKM_RC2_CBC = 0x0000_0102,
    CKM_RC2_MAC = 0x0000_0103,
    CKM_RC2_MAC_GENERAL = 0x0000_0104,
    CKM_RC2_CBC_PAD = 0x0000_0105,
    CKM_RC4_KEY_GEN = 0x0000_0110,
    CKM_RC4 = 0x0000_0111,
    CKM_DES_KEY_GEN = 0x0000_0120,
    CKM_DES_ECB = 0x0000_0121,
    CKM_DES_CBC = 0x0000_0122,
    CKM_DES_MAC = 0x0000_0123,
    CKM_DES_MAC_GENERAL = 0x0000_0124,
    CKM_DES_CBC_PAD = 0x0000_0125,
    CKM_DES2_KEY_GEN = 0x0000_0130,
    CKM_DES3_KEY_GEN = 0x0000_0131,
    CKM_DES3_ECB = 0x0000_0132,
    CKM_DES3_CBC = 0x0000_0133,
    CKM_DES3_MAC = 0x0000_0134,
    CKM_DES3_MAC_GENERAL = 0x0000_0135,
    CKM_DES3_CBC_PAD = 0x0000_0136,
    CKM_DES3_CMAC_GENERAL = 0x0000_0137,
    CKM_DES3_CMAC = 0x0000_0138,
    CKM_MD2 = 0x0000_0200,
    CKM_MD2_HMAC = 0x0000_0201,
    CKM_MD2_HMAC_GENERAL = 0x0000_0202,
    CKM_MD5 = 0x0000_0210,
    CKM_MD5_HMAC = 0x0000_0211,
    CKM_MD5_HMAC_GENERAL = 0x0000_0212,
    CKM_SHA_1 = 0x0000_0220,
    CKM_SHA_1_HMAC = 0x0000_0221,
    CKM_SHA_1_HMAC_GENERAL = 0x0000_0222,
    CKM_RIPEMD128 = 0x0000_0230,
    CKM_RIPEMD128_HMAC = 0x0000_0231,
    CKM_RIPEMD128_HMAC_GENERAL = 0x0000_0232,
    CKM_RIPEMD160 = 0x0000_0240,
    CKM_RIPEMD160_HMAC = 0x0000_0241,
    CKM_RIPEMD160_HMAC_GENERAL = 0x0000_0242,
    CKM_SHA256 = 0x0000_0250,
    CKM_SHA256_HMAC = 0x0000_0251,
    CKM_SHA256_HMAC_GENERAL = 0x0000_0252,
    CKM_SHA224 = 0x0000_0255,
    CKM_SHA224_HMAC = 0x0000_0256,
    CKM_SHA224_HMAC_GENERAL = 0x0000_0257,
    CKM_SHA384 = 0x0000_0260,
    CKM_SHA384_HMAC = 0x0000_0261,
    CKM_SHA384_HMAC_GENERAL = 0x0000_0262,
    CKM_SHA512 = 0x0000_0270,
    CKM_SHA512_HMAC = 0x0000_0271,
    CKM_SHA512_HMAC_GENERAL = 0x0000_0272,
    CKM_GENERIC_SECRET_KEY_GEN = 0x0000_0350,
    CKM_CONCATENATE_BASE_AND_KEY = 0x0000_0360,
    CKM_CONCATENATE_BASE_AND_DATA = 0x0000_0362,
    CKM_CONCATENATE_DATA_AND_BASE = 0x0000_0363,
    CKM_XOR_BASE_AND_DATA = 0x0000_0364,
    CKM_EXTRACT_KEY_FROM_KEY = 0x0000_0365,
    CKM_SSL3_PRE_MASTER_KEY_GEN = 0x0000_0370,
    CKM_SSL3_MASTER_KEY_DERIVE = 0x0000_0371,
    CKM_SSL3_KEY_AND_MAC_DERIVE = 0x0000_0372,
    CKM_TLS_PRE_MASTER_KEY_GEN = 0x0000_0374,
    CKM_TLS_MASTER_KEY_DERIVE = 0x0000_0375,
    CKM_TLS_KEY_AND_MAC_DERIVE = 0x0000_0376,
    CKM_TLS_PRF = 0x0000_0378,
    CKM_SHA1_KEY_DERIVATION = 0x0000_0392,
    CKM_SHA256_KEY_DERIVATION = 0x0000_0393,
    CKM_SHA384_KEY_DERIVATION = 0x0000_0394,
    CKM_SHA512_KEY_DERIVATION = 0x0000_0395,
    CKM_SHA224_KEY_DERIVATION = 0x0000_0396,
    CKM_PKCS5_PBKD2 = 0x0000_03B0,
    CKM_EC_KEY_PAIR_GEN = 0x0000_1040,
    CKM_ECDSA = 0x0000_1041,
    CKM_ECDSA_SHA1 = 0x0000_1042,
    CKM_ECDSA_SHA224 = 0x0000_1043,
    CKM_ECDSA_SHA256 = 0x0000_1044,
    CKM_ECDSA_SHA384 = 0x0000_1045,
    CKM_ECDSA_SHA512 = 0x0000_1046,
    CKM_ECDH1_DERIVE = 0x0000_1050,
    CKM_ECDH1_COFACTOR_DERIVE = 0x0000_1051,
    CKM_ECMQV_DERIVE = 0x0000_1052,
    CKM_ECDH_AES_KEY_WRAP = 0x0000_1053,
    CKM_RSA_AES_KEY_WRAP = 0x0000_1054,
    CKM_AES_KEY_GEN = 0x0000_1080,
    CKM_AES_ECB = 0x0000_1081,
    CKM_AES_CBC = 0x0000_1082,
    CKM_AES_MAC = 0x0000_1083,
    CKM_AES_MAC_GENERAL = 0x0000_1084,
    CKM_AES_CBC_PAD = 0x0000_1085,
    CKM_AES_CTR = 0x0000_1086,
    CKM_AES_GCM = 0x0000_1087,
    CKM_AES_CCM = 0x0000_1088,
    CKM_AES_CTS = 0x0000_1089,
    CKM_AES_CMAC = 0x0000_108A,
    CKM_AES_CMAC_GENERAL = 0x0000_108B,
    CKM_AES_XCBC_MAC = 0x0000_108C,
    CKM_AES_XCBC_MAC_96 = 0x0000_108D,
    CKM_AES_GMAC = 0x0000_108E,
    CKM_BLOWFISH_KEY_GEN = 0x0000_1090,
    CKM_BLOWFISH_CBC = 0x0000_1091,
    CKM_TWOFISH_KEY_GEN = 0x0000_1092,
    CKM_TWOFISH_CBC = 0x0000_1093,
    CKM_AES_ECB_ENCRYPT_DATA = 0x0000_1104,
    CKM_AES_CBC_ENCRYPT_DATA = 0x0000_1105,
    CKM_GOSTR3410_KEY_PAIR_GEN = 0x0000_1200,
    CKM_GOSTR3410 = 0x0000_1201,
    CKM_GOSTR3410_WITH_GOSTR3411 = 0x0000_1202,
    CKM_GOSTR3411 = 0x0000_1210,
    CKM_GOSTR3411_HMAC = 0x0000_1211,
    CKM_GOST28147_KEY_GEN = 0x0000_1220,
    CKM_GOST28147_ECB = 0x0000_1221,
    CKM_GOST28147 = 0x0000_1222,
    CKM_DSA_PARAMETER_GEN = 0x0000_2000,
    CKM_DH_PKCS_PARAMETER_GEN = 0x0000_2001,
    CKM_X9_42_DH_PARAMETER_GEN = 0x0000_2002,
    CKM_AES_OFB = 0x0000_2104,
    CKM_AES_CFB64 = 0x0000_2105,
    CKM_AES_CFB8 = 0x0000_2106,
    CKM_AES_CFB128 = 0x0000_2107,
    CKM_AES_CFB1 = 0x0000_2108,
    CKM_AES_KEY_WRAP = 0x0000_2109,
    CKM_AES_KEY_WRAP_PAD = 0x0000_210A,
    CKM_RSA_PKCS_TPM_1_1 = 0x0000_4001,
    CKM_RSA_PKCS_OAEP_TPM_1_1 = 0x0000_4002,
    CKM_VENDOR_DEFINED = 0x8000_0000,
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Marks attributes whose value is itself an attribute array.
pub const CKF_ARRAY_ATTRIBUTE: u64 = 0x4000_0000;

code_table! {
    /// `CK_ATTRIBUTE_TYPE` names.
    pub fn attribute_name;
    CKA_CLASS = 0x0000_0000,
    CKA_TOKEN = 0x0000_0001,
    CKA_PRIVATE = 0x0000_0002,
    CKA_LABEL = 0x0000_0003,
    CKA_APPLICATION = 0x0000_0010,
    CKA_VALUE = 0x0000_0011,
    CKA_OBJECT_ID = 0x0000_0012,
    CKA_CERTIFICATE_TYPE = 0x0000_0080,
    CKA_ISSUER = 0x0000_0081,
    CKA_SERIAL_NUMBER = 0x0000_0082,
    CKA_AC_ISSUER = 0x0000_0083,
    CKA_OWNER = 0x0000_0084,
    CKA_ATTR_TYPES = 0x0000_0085,
    CKA_TRUSTED = 0x0000_0086,
    CKA_CERTIFICATE_CATEGORY = 0x0000_0087,
    CKA_JAVA_MIDP_SECURITY_DOMAIN = 0x0000_0088,
    CKA_URL = 0x0000_0089,
    CKA_HASH_OF_SUBJECT_PUBLIC_KEY = 0x0000_008A,
    CKA_HASH_OF_ISSUER_PUBLIC_KEY = 0x0000_008B,
    CKA_NAME_HASH_ALGORITHM = 0x0000_008C,
    CKA_CHECK_VALUE = 0x0000_0090,
    CKA_KEY_TYPE = 0x0000_0100,
    CKA_SUBJECT = 0x0000_0101,
    CKA_ID = 0x0000_0102,
    CKA_SENSITIVE = 0x0000_0103,
    CKA_ENCRYPT = 0x0000_0104,
    CKA_DECRYPT = 0x0000_0105,
    CKA_WRAP = 0x0000_0106,
    CKA_UNWRAP = 0x0000_0107,
    CKA_SIGN = 0x0000_0108,
    CKA_SIGN_RECOVER = 0x0000_0109,
    CKA_VERIFY = 0x0000_010A,
    CKA_VERIFY_RECOVER = 0x0000_010B,
    CKA_DERIVE = 0x0000_010C,
    CKA_START_DATE = 0x0000_0110,
    CKA_END_DATE = 0x0000_0111,
    CKA_MODULUS = 0x0000_0120,
    CKA_MODULUS_BITS = 0x0000_0121,
    CKA_PUBLIC_EXPONENT = 0x0000_0122,
    CKA_PRIVATE_EXPONENT = 0x0000_0123,
    CKA_PRIME_1 = 0x0000_0124,
    CKA_PRIME_2 = 0x0000_0125,
    CKA_EXPONENT_1 = 0x0000_0126,
    CKA_EXPONENT_2 = 0x0000_0127,
    CKA_COEFFICIENT = 0x0000_0128,
    CKA_PUBLIC_KEY_INFO = 0x0000_0129,
    CKA_PRIME = 0x0000_0130,
    CKA_SUBPRIME = 0x0000_0131,
    CKA_BASE = 0x0000_0132,
    CKA_PRIME_BITS = 0x0000_0133,
    CKA_SUBPRIME_BITS = 0x0000_0134,
    CKA_VALUE_BITS = 0x0000_0160,
    CKA_VALUE_LEN = 0x0000_0161,
    CKA_EXTRACTABLE = 0x0000_0162,
    CKA_LOCAL = 0x0000_0163,
    CKA_NEVER_EXTRACTABLE = 0x0000_0164,
    CKA_ALWAYS_SENSITIVE = 0x0000_0165,
    CKA_KEY_GEN_MECHANISM = 0x0000_0166,
    CKA_MODIFIABLE = 0x0000_0170,
    CKA_COPYABLE = 0x0000_0171,
    CKA_DESTROYABLE = 0x0000_0172,
    CKA_EC_PARAMS = 0x0000_0180,
    CKA_EC_POINT = 0x0000_0181,
    CKA_SECONDARY_AUTH = 0x0000_0200,
    CKA_AUTH_PIN_FLAGS = 0x0000_0201,
    CKA_ALWAYS_AUTHENTICATE = 0x0000_0202,
    CKA_WRAP_WITH_TRUSTED = 0x0000_0210,
    CKA_WRAP_TEMPLATE = CKF_ARRAY_ATTRIBUTE | 0x0000_0211,
    CKA_UNWRAP_TEMPLATE = CKF_ARRAY_ATTRIBUTE | 0x0000_0212,
    CKA_DERIVE_TEMPLATE = CKF_ARRAY_ATTRIBUTE | 0x0000_0213,
    CKA_OTP_FORMAT = 0x0000_0220,
    CKA_OTP_LENGTH = 0x0000_0221,
    CKA_OTP_TIME_INTERVAL = 0x0000_0222,
    CKA_OTP_USER_FRIENDLY_MODE = 0x0000_0223,
    CKA_OTP_CHALLENGE_REQUIREMENT = 0x0000_0224,
    CKA_OTP_TIME_REQUIREMENT = 0x0000_0225,
    CKA_OTP_COUNTER_REQUIREMENT = 0x0000_0226,
    CKA_OTP_PIN_REQUIREMENT = 0x0000_0227,
    CKA_OTP_USER_IDENTIFIER = 0x0000_022A,
    CKA_OTP_SERVICE_IDENTIFIER = 0x0000_022B,
    CKA_OTP_SERVICE_LOGO = 0x0000_022C,
    CKA_OTP_SERVICE_LOGO_TYPE = 0x0000_022D,
    CKA_OTP_COUNTER = 0x0000_022E,
    CKA_OTP_TIME = 0x0000_022F,
    CKA_GOSTR3410_PARAMS = 0x0000_0250,
    CKA_GOSTR3411_PARAMS = 0x0000_0251,
    CKA_GOST28147_PARAMS = 0x0000_0252,
    CKA_HW_FEATURE_TYPE = 0x0000_0300,
    CKA_RESET_ON_INIT = 0x0000_0301,
    CKA_HAS_RESET = 0x0000_0302,
    CKA_PIXEL_X = 0x0000_0400,
    CKA_PIXEL_Y = 0x0000_0401,
    CKA_RESOLUTION = 0x0000_0402,
    CKA_CHAR_ROWS = 0x0000_0403,
    CKA_CHAR_COLUMNS = 0x0000_0404,
    CKA_COLOR = 0x0000_0405,
    CKA_BITS_PER_PIXEL = 0x0000_0406,
    CKA_CHAR_SETS = 0x0000_0480,
    CKA_ENCODING_METHODS = 0x0000_0481,
    CKA_MIME_TYPES = 0x0000_0482,
    CKA_MECHANISM_TYPE = 0x0000_0500,
    CKA_REQUIRED_CMS_ATTRIBUTES = 0x0000_0501,
    CKA_DEFAULT_CMS_ATTRIBUTES = 0x0000_0502,
    CKA_SUPPORTED_CMS_ATTRIBUTES = 0x0000_0503,
    CKA_ALLOWED_MECHANISMS = CKF_ARRAY_ATTRIBUTE | 0x0000_0600,
    CKA_VENDOR_DEFINED = 0x8000_0000,
}

/// How the value bytes of an attribute should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// `CK_BBOOL`.
    Bool,
    /// Plain `CK_ULONG` quantity.
    Ulong,
    ObjectClass,
    KeyType,
    CertificateType,
    /// Single `CK_MECHANISM_TYPE`.
    Mechanism,
    /// `CK_DATE` (`YYYYMMDD` characters).
    Date,
    /// UTF-8 text without terminator.
    Text,
    /// Nested `CK_ATTRIBUTE` array.
    Template,
    /// Array of `CK_MECHANISM_TYPE`.
    MechanismList,
    /// Anything else: dumped as bytes.
    Bytes,
}

/// Classify an attribute type by the shape of its value.
#[must_use]
pub fn attribute_kind(attribute: u64) -> AttributeKind {
    match attribute {
        CKA_TOKEN | CKA_PRIVATE | CKA_TRUSTED | CKA_SENSITIVE | CKA_ENCRYPT | CKA_DECRYPT
        | CKA_WRAP | CKA_UNWRAP | CKA_SIGN | CKA_SIGN_RECOVER | CKA_VERIFY
        | CKA_VERIFY_RECOVER | CKA_DERIVE | CKA_EXTRACTABLE | CKA_LOCAL
        | CKA_NEVER_EXTRACTABLE | CKA_ALWAYS_SENSITIVE | CKA_MODIFIABLE | CKA_COPYABLE
        | CKA_DESTROYABLE | CKA_SECONDARY_AUTH | CKA_ALWAYS_AUTHENTICATE
        | CKA_WRAP_WITH_TRUSTED | CKA_OTP_USER_FRIENDLY_MODE | CKA_RESET_ON_INIT
        | CKA_HAS_RESET | CKA_COLOR => AttributeKind::Bool,
        CKA_CERTIFICATE_CATEGORY | CKA_JAVA_MIDP_SECURITY_DOMAIN | CKA_MODULUS_BITS
        | CKA_PRIME_BITS | CKA_SUBPRIME_BITS | CKA_VALUE_BITS | CKA_VALUE_LEN
        | CKA_AUTH_PIN_FLAGS | CKA_OTP_FORMAT | CKA_OTP_LENGTH | CKA_OTP_TIME_INTERVAL
        | CKA_OTP_CHALLENGE_REQUIREMENT | CKA_OTP_TIME_REQUIREMENT
        | CKA_OTP_COUNTER_REQUIREMENT | CKA_OTP_PIN_REQUIREMENT | CKA_HW_FEATURE_TYPE
        | CKA_PIXEL_X | CKA_PIXEL_Y | CKA_RESOLUTION | CKA_CHAR_ROWS | CKA_CHAR_COLUMNS
        | CKA_BITS_PER_PIXEL => AttributeKind::Ulong,
        CKA_CLASS => AttributeKind::ObjectClass,
        CKA_KEY_TYPE => AttributeKind::KeyType,
        CKA_CERTIFICATE_TYPE => AttributeKind::CertificateType,
        CKA_KEY_GEN_MECHANISM | CKA_MECHANISM_TYPE | CKA_NAME_HASH_ALGORITHM => {
            AttributeKind::Mechanism
        }
        CKA_START_DATE | CKA_END_DATE => AttributeKind::Date,
        CKA_LABEL | CKA_APPLICATION | CKA_URL | CKA_CHAR_SETS | CKA_ENCODING_METHODS
        | CKA_MIME_TYPES | CKA_OTP_SERVICE_IDENTIFIER | CKA_OTP_USER_IDENTIFIER
        | CKA_OTP_SERVICE_LOGO_TYPE | CKA_OTP_TIME => AttributeKind::Text,
        CKA_WRAP_TEMPLATE | CKA_UNWRAP_TEMPLATE | CKA_DERIVE_TEMPLATE => AttributeKind::Template,
        CKA_ALLOWED_MECHANISMS => AttributeKind::MechanismList,
        _ => AttributeKind::Bytes,
    }
}

/// Returns `true` if the attribute carries secret key material.
///
/// RSA private components are always secret. `CKA_VALUE` is secret unless
/// the surrounding template names a class whose value is public (data,
/// certificates, public keys, hardware features, domain parameters,
/// mechanisms). Without a class, as in most `C_GetAttributeValue` queries,
/// it is treated as secret.
#[must_use]
pub fn is_secret_attribute(attribute: u64, class: Option<u64>) -> bool {
    match attribute {
        CKA_PRIVATE_EXPONENT | CKA_PRIME_1 | CKA_PRIME_2 | CKA_EXPONENT_1 | CKA_EXPONENT_2
        | CKA_COEFFICIENT => true,
        CKA_VALUE => !matches!(
            class,
            Some(
                CKO_DATA
                    | CKO_CERTIFICATE
                    | CKO_PUBLIC_KEY
                    | CKO_HW_FEATURE
                    | CKO_DOMAIN_PARAMETERS
                    | CKO_MECHANISM
            )
        ),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Flag words
// ---------------------------------------------------------------------------

flag_table! {
    /// `CK_SLOT_INFO.flags` bits.
    pub static SLOT_FLAGS;
    CKF_TOKEN_PRESENT = 0x0000_0001,
    CKF_REMOVABLE_DEVICE = 0x0000_0002,
    CKF_HW_SLOT = 0x0000_0004,
}

flag_table! {
    /// `CK_TOKEN_INFO.flags` bits.
    pub static TOKEN_FLAGS;
    CKF_RNG = 0x0000_0001,
    CKF_WRITE_PROTECTED = 0x0000_0002,
    CKF_LOGIN_REQUIRED = 0x0000_0004,
    CKF_USER_PIN_INITIALIZED = 0x0000_0008,
    CKF_RESTORE_KEY_NOT_NEEDED = 0x0000_0020,
    CKF_CLOCK_ON_TOKEN = 0x0000_0040,
    CKF_PROTECTED_AUTHENTICATION_PATH = 0x0000_0100,
    CKF_DUAL_CRYPTO_OPERATIONS = 0x0000_0200,
    CKF_TOKEN_INITIALIZED = 0x0000_0400,
    CKF_SECONDARY_AUTHENTICATION = 0x0000_0800,
    CKF_USER_PIN_COUNT_LOW = 0x0001_0000,
    CKF_USER_PIN_FINAL_TRY = 0x0002_0000,
    CKF_USER_PIN_LOCKED = 0x0004_0000,
    CKF_USER_PIN_TO_BE_CHANGED = 0x0008_0000,
    CKF_SO_PIN_COUNT_LOW = 0x0010_0000,
    CKF_SO_PIN_FINAL_TRY = 0x0020_0000,
    CKF_SO_PIN_LOCKED = 0x0040_0000,
    CKF_SO_PIN_TO_BE_CHANGED = 0x0080_0000,
    CKF_ERROR_STATE = 0x0100_0000,
}

flag_table! {
    /// `CK_SESSION_INFO.flags` and `C_OpenSession` flag bits.
    pub static SESSION_FLAGS;
    CKF_RW_SESSION = 0x0000_0002,
    CKF_SERIAL_SESSION = 0x0000_0004,
}

flag_table! {
    /// `CK_MECHANISM_INFO.flags` bits.
    pub static MECHANISM_FLAGS;
    CKF_HW = 0x0000_0001,
    CKF_ENCRYPT = 0x0000_0100,
    CKF_DECRYPT = 0x0000_0200,
    CKF_DIGEST = 0x0000_0400,
    CKF_SIGN = 0x0000_0800,
    CKF_SIGN_RECOVER = 0x0000_1000,
    CKF_VERIFY = 0x0000_2000,
    CKF_VERIFY_RECOVER = 0x0000_4000,
    CKF_GENERATE = 0x0000_8000,
    CKF_GENERATE_KEY_PAIR = 0x0001_0000,
    CKF_WRAP = 0x0002_0000,
    CKF_UNWRAP = 0x0004_0000,
    CKF_DERIVE = 0x0008_0000,
    CKF_EC_F_P = 0x0010_0000,
    CKF_EC_F_2M = 0x0020_0000,
    CKF_EC_ECPARAMETERS = 0x0040_0000,
    CKF_EC_NAMEDCURVE = 0x0080_0000,
    CKF_EC_UNCOMPRESS = 0x0100_0000,
    CKF_EC_COMPRESS = 0x0200_0000,
    CKF_EXTENSION = 0x8000_0000,
}

flag_table! {
    /// `CK_C_INITIALIZE_ARGS.flags` bits.
    pub static INITIALIZE_FLAGS;
    CKF_LIBRARY_CANT_CREATE_OS_THREADS = 0x0000_0001,
    CKF_OS_LOCKING_OK = 0x0000_0002,
}

flag_table! {
    /// `C_WaitForSlotEvent` flag bits.
    pub static WAIT_FLAGS;
    CKF_DONT_BLOCK = 0x0000_0001,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_codes_resolve() {
        assert_eq!(rv_name(0), Some("CKR_OK"));
        assert_eq!(rv_name(CKR_PIN_INCORRECT), Some("CKR_PIN_INCORRECT"));
        assert_eq!(rv_name(0x150), Some("CKR_BUFFER_TOO_SMALL"));
        assert_eq!(rv_name(0x8000_0000), Some("CKR_VENDOR_DEFINED"));
    }

    #[test]
    fn misses_are_none_not_errors() {
        assert_eq!(rv_name(0x0000_0004), None);
        assert_eq!(rv_name(0x8000_0001), None);
        assert_eq!(mechanism_name(0x7FFF_0001), None);
        assert_eq!(user_type_name(3), None);
        assert_eq!(state_name(99), None);
        assert_eq!(attribute_name(0x0000_0FFF), None);
    }

    #[test]
    fn mechanisms_and_attributes_resolve() {
        assert_eq!(mechanism_name(0x1082), Some("CKM_AES_CBC"));
        assert_eq!(mechanism_name(CKM_EC_KEY_PAIR_GEN), Some("CKM_EC_KEY_PAIR_GEN"));
        assert_eq!(attribute_name(0x4000_0211), Some("CKA_WRAP_TEMPLATE"));
        assert_eq!(attribute_name(CKA_CLASS), Some("CKA_CLASS"));
        assert_eq!(user_type_name(CKU_CONTEXT_SPECIFIC), Some("CKU_CONTEXT_SPECIFIC"));
        assert_eq!(state_name(3), Some("CKS_RW_USER_FUNCTIONS"));
        assert_eq!(object_class_name(4), Some("CKO_SECRET_KEY"));
        assert_eq!(key_type_name(0x1F), Some("CKK_AES"));
        assert_eq!(certificate_type_name(0), Some("CKC_X_509"));
    }

    #[test]
    fn attribute_kinds() {
        assert_eq!(attribute_kind(CKA_TOKEN), AttributeKind::Bool);
        assert_eq!(attribute_kind(CKA_VALUE_LEN), AttributeKind::Ulong);
        assert_eq!(attribute_kind(CKA_CLASS), AttributeKind::ObjectClass);
        assert_eq!(attribute_kind(CKA_LABEL), AttributeKind::Text);
        assert_eq!(attribute_kind(CKA_END_DATE), AttributeKind::Date);
        assert_eq!(attribute_kind(CKA_UNWRAP_TEMPLATE), AttributeKind::Template);
        assert_eq!(attribute_kind(CKA_ALLOWED_MECHANISMS), AttributeKind::MechanismList);
        assert_eq!(attribute_kind(CKA_MODULUS), AttributeKind::Bytes);
        assert_eq!(attribute_kind(0x8000_1234), AttributeKind::Bytes);
    }

    #[test]
    fn secret_attributes_depend_on_class() {
        assert!(is_secret_attribute(CKA_PRIVATE_EXPONENT, None));
        assert!(is_secret_attribute(CKA_VALUE, Some(CKO_SECRET_KEY)));
        assert!(is_secret_attribute(CKA_VALUE, Some(CKO_PRIVATE_KEY)));
        assert!(is_secret_attribute(CKA_VALUE, Some(CKO_OTP_KEY)));
        assert!(is_secret_attribute(CKA_VALUE, None));
        assert!(is_secret_attribute(CKA_VALUE, Some(0x8000_0001)));
        assert!(!is_secret_attribute(CKA_VALUE, Some(CKO_CERTIFICATE)));
        assert!(!is_secret_attribute(CKA_VALUE, Some(CKO_DATA)));
        assert!(!is_secret_attribute(CKA_VALUE, Some(CKO_PUBLIC_KEY)));
        assert!(!is_secret_attribute(CKA_MODULUS, Some(CKO_PRIVATE_KEY)));
    }

    #[test]
    fn flag_tables_have_unique_bits() {
        for table in [
            SLOT_FLAGS,
            TOKEN_FLAGS,
            SESSION_FLAGS,
            MECHANISM_FLAGS,
            INITIALIZE_FLAGS,
            WAIT_FLAGS,
        ] {
            let mut seen = 0u64;
            for (bit, name) in table {
                assert_eq!(bit.count_ones(), 1, "{name} is not a single bit");
                assert_eq!(seen & bit, 0, "{name} overlaps an earlier flag");
                seen |= bit;
            }
        }
    }
}
