//! Exported Cryptoki v2.40 entry points.
//!
//! One line group per function, in `CK_FUNCTION_LIST` order. Each parameter
//! carries its direction and shape; `proxy_functions!` turns the table into
//! the `extern "C"` symbols, the proxy's function list and the descriptors
//! the dispatcher renders from.

use crate::ck::*;
use crate::dispatch::Len::{Fixed, Pointee, Value};
use crate::dispatch::Shape::*;

/// Answer `C_GetFunctionList` with the proxy's own list, so that callers
/// going through the list stay intercepted.
unsafe fn own_function_list(pp_function_list: CK_FUNCTION_LIST_PTR_PTR) -> CK_RV {
    if pp_function_list.is_null() {
        return CKR_ARGUMENTS_BAD;
    }
    let list = (&raw const FUNCTION_LIST).cast_mut();
    // SAFETY: non-null out-pointer supplied by the caller.
    unsafe { pp_function_list.write_unaligned(list) };
    CKR_OK
}

proxy_functions! {
    /// Initializes the real module. `pInitArgs` is forwarded untouched.
    fn C_Initialize(pInitArgs: CK_VOID_PTR => In(InitArgs));
    fn C_Finalize(pReserved: CK_VOID_PTR => In(Pointer));
    fn C_GetInfo(pInfo: CK_INFO_PTR => Out(Info));
    /// Never forwarded: returns [`FUNCTION_LIST`] after logging.
    fn C_GetFunctionList(
        ppFunctionList: CK_FUNCTION_LIST_PTR_PTR => Out(FunctionList),
    ) => own_function_list;
    fn C_GetSlotList(
        tokenPresent: CK_BBOOL => In(Bool),
        pSlotList: CK_SLOT_ID_PTR => Out(SlotList(Pointee("pulCount"))),
        pulCount: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_GetSlotInfo(slotID: CK_SLOT_ID => In(Ulong), pInfo: CK_SLOT_INFO_PTR => Out(SlotInfo));
    fn C_GetTokenInfo(
        slotID: CK_SLOT_ID => In(Ulong),
        pInfo: CK_TOKEN_INFO_PTR => Out(TokenInfo),
    );
    fn C_GetMechanismList(
        slotID: CK_SLOT_ID => In(Ulong),
        pMechanismList: CK_MECHANISM_TYPE_PTR => Out(MechanismList(Pointee("pulCount"))),
        pulCount: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_GetMechanismInfo(
        slotID: CK_SLOT_ID => In(Ulong),
        mechanismType: CK_MECHANISM_TYPE => In(MechanismType),
        pInfo: CK_MECHANISM_INFO_PTR => Out(MechanismInfo),
    );
    fn C_InitToken(
        slotID: CK_SLOT_ID => In(Ulong),
        pPin: CK_UTF8CHAR_PTR => In(Credential(Value("ulPinLen"))),
        ulPinLen: CK_ULONG => In(Ulong),
        pLabel: CK_UTF8CHAR_PTR => In(Text(Fixed(32))),
    );
    fn C_InitPIN(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pPin: CK_UTF8CHAR_PTR => In(Credential(Value("ulPinLen"))),
        ulPinLen: CK_ULONG => In(Ulong),
    );
    fn C_SetPIN(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pOldPin: CK_UTF8CHAR_PTR => In(Credential(Value("ulOldLen"))),
        ulOldLen: CK_ULONG => In(Ulong),
        pNewPin: CK_UTF8CHAR_PTR => In(Credential(Value("ulNewLen"))),
        ulNewLen: CK_ULONG => In(Ulong),
    );
    /// `Notify` is logged by address; the real module receives it unchanged
    /// and calls it directly.
    fn C_OpenSession(
        slotID: CK_SLOT_ID => In(Ulong),
        flags: CK_FLAGS => In(SessionFlags),
        pApplication: CK_VOID_PTR => In(Pointer),
        Notify: CK_NOTIFY => In(Pointer),
        phSession: CK_SESSION_HANDLE_PTR => Out(UlongRef),
    );
    fn C_CloseSession(hSession: CK_SESSION_HANDLE => In(Ulong));
    fn C_CloseAllSessions(slotID: CK_SLOT_ID => In(Ulong));
    fn C_GetSessionInfo(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pInfo: CK_SESSION_INFO_PTR => Out(SessionInfo),
    );
    fn C_GetOperationState(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pOperationState: CK_BYTE_PTR => Out(Bytes(Pointee("pulOperationStateLen"))),
        pulOperationStateLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_SetOperationState(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pOperationState: CK_BYTE_PTR => In(Bytes(Value("ulOperationStateLen"))),
        ulOperationStateLen: CK_ULONG => In(Ulong),
        hEncryptionKey: CK_OBJECT_HANDLE => In(Ulong),
        hAuthenticationKey: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_Login(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        userType: CK_USER_TYPE => In(UserType),
        pPin: CK_UTF8CHAR_PTR => In(Credential(Value("ulPinLen"))),
        ulPinLen: CK_ULONG => In(Ulong),
    );
    fn C_Logout(hSession: CK_SESSION_HANDLE => In(Ulong));
    fn C_CreateObject(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulCount"))),
        ulCount: CK_ULONG => In(Ulong),
        phObject: CK_OBJECT_HANDLE_PTR => Out(UlongRef),
    );
    fn C_CopyObject(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        hObject: CK_OBJECT_HANDLE => In(Ulong),
        pTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulCount"))),
        ulCount: CK_ULONG => In(Ulong),
        phNewObject: CK_OBJECT_HANDLE_PTR => Out(UlongRef),
    );
    fn C_DestroyObject(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        hObject: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_GetObjectSize(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        hObject: CK_OBJECT_HANDLE => In(Ulong),
        pulSize: CK_ULONG_PTR => Out(UlongRef),
    );
    /// The template is rendered on both sides of the call, whatever the
    /// result: per-attribute errors still fill in the other attributes.
    fn C_GetAttributeValue(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        hObject: CK_OBJECT_HANDLE => In(Ulong),
        pTemplate: CK_ATTRIBUTE_PTR => InOut(AttributeQuery(Value("ulCount"))),
        ulCount: CK_ULONG => In(Ulong),
    );
    fn C_SetAttributeValue(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        hObject: CK_OBJECT_HANDLE => In(Ulong),
        pTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulCount"))),
        ulCount: CK_ULONG => In(Ulong),
    );
    fn C_FindObjectsInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulCount"))),
        ulCount: CK_ULONG => In(Ulong),
    );
    fn C_FindObjects(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        phObject: CK_OBJECT_HANDLE_PTR => Out(HandleList(Pointee("pulObjectCount"))),
        ulMaxObjectCount: CK_ULONG => In(Ulong),
        pulObjectCount: CK_ULONG_PTR => Out(UlongRef),
    );
    fn C_FindObjectsFinal(hSession: CK_SESSION_HANDLE => In(Ulong));
    fn C_EncryptInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hKey: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_Encrypt(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pData: CK_BYTE_PTR => In(Bytes(Value("ulDataLen"))),
        ulDataLen: CK_ULONG => In(Ulong),
        pEncryptedData: CK_BYTE_PTR => Out(Bytes(Pointee("pulEncryptedDataLen"))),
        pulEncryptedDataLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_EncryptUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pPart: CK_BYTE_PTR => In(Bytes(Value("ulPartLen"))),
        ulPartLen: CK_ULONG => In(Ulong),
        pEncryptedPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulEncryptedPartLen"))),
        pulEncryptedPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_EncryptFinal(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pLastEncryptedPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulLastEncryptedPartLen"))),
        pulLastEncryptedPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DecryptInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hKey: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_Decrypt(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pEncryptedData: CK_BYTE_PTR => In(Bytes(Value("ulEncryptedDataLen"))),
        ulEncryptedDataLen: CK_ULONG => In(Ulong),
        pData: CK_BYTE_PTR => Out(Bytes(Pointee("pulDataLen"))),
        pulDataLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DecryptUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pEncryptedPart: CK_BYTE_PTR => In(Bytes(Value("ulEncryptedPartLen"))),
        ulEncryptedPartLen: CK_ULONG => In(Ulong),
        pPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulPartLen"))),
        pulPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DecryptFinal(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pLastPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulLastPartLen"))),
        pulLastPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DigestInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
    );
    fn C_Digest(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pData: CK_BYTE_PTR => In(Bytes(Value("ulDataLen"))),
        ulDataLen: CK_ULONG => In(Ulong),
        pDigest: CK_BYTE_PTR => Out(Bytes(Pointee("pulDigestLen"))),
        pulDigestLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DigestUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pPart: CK_BYTE_PTR => In(Bytes(Value("ulPartLen"))),
        ulPartLen: CK_ULONG => In(Ulong),
    );
    fn C_DigestKey(hSession: CK_SESSION_HANDLE => In(Ulong), hKey: CK_OBJECT_HANDLE => In(Ulong));
    fn C_DigestFinal(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pDigest: CK_BYTE_PTR => Out(Bytes(Pointee("pulDigestLen"))),
        pulDigestLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_SignInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hKey: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_Sign(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pData: CK_BYTE_PTR => In(Bytes(Value("ulDataLen"))),
        ulDataLen: CK_ULONG => In(Ulong),
        pSignature: CK_BYTE_PTR => Out(Bytes(Pointee("pulSignatureLen"))),
        pulSignatureLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_SignUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pPart: CK_BYTE_PTR => In(Bytes(Value("ulPartLen"))),
        ulPartLen: CK_ULONG => In(Ulong),
    );
    fn C_SignFinal(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pSignature: CK_BYTE_PTR => Out(Bytes(Pointee("pulSignatureLen"))),
        pulSignatureLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_SignRecoverInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hKey: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_SignRecover(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pData: CK_BYTE_PTR => In(Bytes(Value("ulDataLen"))),
        ulDataLen: CK_ULONG => In(Ulong),
        pSignature: CK_BYTE_PTR => Out(Bytes(Pointee("pulSignatureLen"))),
        pulSignatureLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_VerifyInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hKey: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_Verify(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pData: CK_BYTE_PTR => In(Bytes(Value("ulDataLen"))),
        ulDataLen: CK_ULONG => In(Ulong),
        pSignature: CK_BYTE_PTR => In(Bytes(Value("ulSignatureLen"))),
        ulSignatureLen: CK_ULONG => In(Ulong),
    );
    fn C_VerifyUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pPart: CK_BYTE_PTR => In(Bytes(Value("ulPartLen"))),
        ulPartLen: CK_ULONG => In(Ulong),
    );
    fn C_VerifyFinal(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pSignature: CK_BYTE_PTR => In(Bytes(Value("ulSignatureLen"))),
        ulSignatureLen: CK_ULONG => In(Ulong),
    );
    fn C_VerifyRecoverInit(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hKey: CK_OBJECT_HANDLE => In(Ulong),
    );
    fn C_VerifyRecover(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pSignature: CK_BYTE_PTR => In(Bytes(Value("ulSignatureLen"))),
        ulSignatureLen: CK_ULONG => In(Ulong),
        pData: CK_BYTE_PTR => Out(Bytes(Pointee("pulDataLen"))),
        pulDataLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DigestEncryptUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pPart: CK_BYTE_PTR => In(Bytes(Value("ulPartLen"))),
        ulPartLen: CK_ULONG => In(Ulong),
        pEncryptedPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulEncryptedPartLen"))),
        pulEncryptedPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DecryptDigestUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pEncryptedPart: CK_BYTE_PTR => In(Bytes(Value("ulEncryptedPartLen"))),
        ulEncryptedPartLen: CK_ULONG => In(Ulong),
        pPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulPartLen"))),
        pulPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_SignEncryptUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pPart: CK_BYTE_PTR => In(Bytes(Value("ulPartLen"))),
        ulPartLen: CK_ULONG => In(Ulong),
        pEncryptedPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulEncryptedPartLen"))),
        pulEncryptedPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_DecryptVerifyUpdate(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pEncryptedPart: CK_BYTE_PTR => In(Bytes(Value("ulEncryptedPartLen"))),
        ulEncryptedPartLen: CK_ULONG => In(Ulong),
        pPart: CK_BYTE_PTR => Out(Bytes(Pointee("pulPartLen"))),
        pulPartLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_GenerateKey(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        pTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulCount"))),
        ulCount: CK_ULONG => In(Ulong),
        phKey: CK_OBJECT_HANDLE_PTR => Out(UlongRef),
    );
    fn C_GenerateKeyPair(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        pPublicKeyTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulPublicKeyAttributeCount"))),
        ulPublicKeyAttributeCount: CK_ULONG => In(Ulong),
        pPrivateKeyTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulPrivateKeyAttributeCount"))),
        ulPrivateKeyAttributeCount: CK_ULONG => In(Ulong),
        phPublicKey: CK_OBJECT_HANDLE_PTR => Out(UlongRef),
        phPrivateKey: CK_OBJECT_HANDLE_PTR => Out(UlongRef),
    );
    fn C_WrapKey(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hWrappingKey: CK_OBJECT_HANDLE => In(Ulong),
        hKey: CK_OBJECT_HANDLE => In(Ulong),
        pWrappedKey: CK_BYTE_PTR => Out(Bytes(Pointee("pulWrappedKeyLen"))),
        pulWrappedKeyLen: CK_ULONG_PTR => InOut(UlongRef),
    );
    fn C_UnwrapKey(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hUnwrappingKey: CK_OBJECT_HANDLE => In(Ulong),
        pWrappedKey: CK_BYTE_PTR => In(Bytes(Value("ulWrappedKeyLen"))),
        ulWrappedKeyLen: CK_ULONG => In(Ulong),
        pTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulAttributeCount"))),
        ulAttributeCount: CK_ULONG => In(Ulong),
        phKey: CK_OBJECT_HANDLE_PTR => Out(UlongRef),
    );
    fn C_DeriveKey(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pMechanism: CK_MECHANISM_PTR => In(Mechanism),
        hBaseKey: CK_OBJECT_HANDLE => In(Ulong),
        pTemplate: CK_ATTRIBUTE_PTR => In(Template(Value("ulAttributeCount"))),
        ulAttributeCount: CK_ULONG => In(Ulong),
        phKey: CK_OBJECT_HANDLE_PTR => Out(UlongRef),
    );
    fn C_SeedRandom(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        pSeed: CK_BYTE_PTR => In(Bytes(Value("ulSeedLen"))),
        ulSeedLen: CK_ULONG => In(Ulong),
    );
    fn C_GenerateRandom(
        hSession: CK_SESSION_HANDLE => In(Ulong),
        RandomData: CK_BYTE_PTR => Out(Bytes(Value("ulRandomLen"))),
        ulRandomLen: CK_ULONG => In(Ulong),
    );
    fn C_GetFunctionStatus(hSession: CK_SESSION_HANDLE => In(Ulong));
    fn C_CancelFunction(hSession: CK_SESSION_HANDLE => In(Ulong));
    /// With `CKF_DONT_BLOCK` clear this blocks inside the real module while
    /// holding the log guard; other threads' calls wait until it returns.
    fn C_WaitForSlotEvent(
        flags: CK_FLAGS => In(WaitFlags),
        pSlot: CK_SLOT_ID_PTR => Out(UlongRef),
        pReserved: CK_VOID_PTR => In(Pointer),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_list_is_complete_and_versioned() {
        let list = FUNCTION_LIST;
        assert_eq!({ list.version }, PROXY_VERSION);
        assert!({ list.C_Initialize }.is_some());
        assert!({ list.C_WaitForSlotEvent }.is_some());
        assert_eq!(
            format!("{list:?}"),
            "CK_FUNCTION_LIST { version: CK_VERSION { major: 2, minor: 40 }, present: 68 }"
        );
    }

    #[test]
    fn empty_list_has_no_entries() {
        let empty = CK_FUNCTION_LIST::EMPTY;
        assert!({ empty.C_Encrypt }.is_none());
        assert!(format!("{empty:?}").contains("present: 0"));
    }

    #[test]
    fn own_list_rejects_null_out_pointer() {
        // SAFETY: null is checked before any write.
        assert_eq!(unsafe { own_function_list(std::ptr::null_mut()) }, CKR_ARGUMENTS_BAD);
        let mut out: CK_FUNCTION_LIST_PTR = std::ptr::null_mut();
        // SAFETY: `out` is a valid out-pointer.
        assert_eq!(unsafe { own_function_list(&mut out) }, CKR_OK);
        assert!(std::ptr::eq(out.cast_const(), &raw const FUNCTION_LIST));
    }

    #[test]
    fn descriptor_order_matches_list_order() {
        assert_eq!(OPERATIONS[0].name, "C_Initialize");
        assert_eq!(OPERATIONS[3].name, "C_GetFunctionList");
        assert_eq!(OPERATIONS[67].name, "C_WaitForSlotEvent");
        assert_eq!(OpId::C_Login as usize, 18);
    }
}
