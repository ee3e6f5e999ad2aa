//! `hawkc` performs all cryptographic operations through an external implementation of the
//! `Cryptographer` trait. With the `use_ring` feature (the default) this is backed by `ring`;
//! with `use_openssl` an OpenSSL backend is available. Other backends can be installed once per
//! process with `set_cryptographer`.

use crate::algorithm::DigestAlgorithm;
use failure::{Error, Fail};

mod holder;
pub(crate) use holder::get_cryptographer;
pub use holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};

#[cfg(feature = "use_ring")]
mod ring;

#[cfg(feature = "use_openssl")]
mod openssl;

#[cfg(feature = "use_openssl")]
pub use self::openssl::OpensslCryptographer;

#[derive(Debug, Fail)]
pub enum CryptoError {
    /// The configured `Cryptographer` does not support the requested digest.
    #[fail(display = "Digest algorithm {:?} is unsupported by this Cryptographer", _0)]
    UnsupportedDigest(DigestAlgorithm),

    /// The backend failed in some other way.
    #[fail(display = "{}", _0)]
    Other(#[fail(cause)] Error),
}

/// A keyed HMAC capability.
pub trait HmacKey: Send + Sync {
    /// Sign `data`, returning the raw digest.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// An incremental digest.
pub trait Hasher: Send + Sync {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;
    fn finish(&mut self) -> Result<Vec<u8>, CryptoError>;
}

/// The cryptographic primitives `hawkc` depends on.
pub trait Cryptographer: Send + Sync + 'static {
    fn rand_bytes(&self, output: &mut [u8]) -> Result<(), CryptoError>;
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError>;
    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError>;
}
