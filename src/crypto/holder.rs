use super::{CryptoError, Cryptographer};
use failure::{err_msg, Fail};
use once_cell::sync::OnceCell;

static CRYPTOGRAPHER: OnceCell<&'static dyn Cryptographer> = OnceCell::new();

#[derive(Debug, Fail)]
#[fail(display = "Cryptographer already initialized")]
pub struct SetCryptographerError(());

/// Sets the global object that will be used for cryptographic operations.
///
/// This is a convenience wrapper over [`set_cryptographer`],
/// but takes a `Box<dyn Cryptographer>` instead.
pub fn set_boxed_cryptographer(c: Box<dyn Cryptographer>) -> Result<(), SetCryptographerError> {
    // Just leak the Box. It wouldn't be freed as a `static` anyway, and we
    // never allow this to be re-assigned.
    set_cryptographer(Box::leak(c))
}

/// Sets the global object that will be used for cryptographic operations.
///
/// This function may only be called once in the lifetime of a program, and
/// must be called before any cryptography is performed when neither the `use_ring` nor the
/// `use_openssl` feature is enabled. Otherwise the first cryptographic operation installs the
/// default backend, ring taking precedence.
pub fn set_cryptographer(c: &'static dyn Cryptographer) -> Result<(), SetCryptographerError> {
    CRYPTOGRAPHER.set(c).map_err(|_| SetCryptographerError(()))
}

/// Get the installed cryptographer, auto-installing the default backend if there is one.
pub(crate) fn get_cryptographer() -> Result<&'static dyn Cryptographer, CryptoError> {
    autoinit_crypto();
    CRYPTOGRAPHER
        .get()
        .copied()
        .ok_or_else(|| CryptoError::Other(err_msg("`hawkc` cryptographer not initialized")))
}

#[cfg(feature = "use_ring")]
#[inline]
fn autoinit_crypto() {
    let _ = set_cryptographer(&super::ring::RingCryptographer);
}

#[cfg(all(feature = "use_openssl", not(feature = "use_ring")))]
#[inline]
fn autoinit_crypto() {
    let _ = set_cryptographer(&super::OpensslCryptographer);
}

#[cfg(not(any(feature = "use_openssl", feature = "use_ring")))]
#[inline]
fn autoinit_crypto() {}
