use crate::algorithm::{Algorithm, MAX_HMAC_BYTES, MAX_HMAC_BYTES_B64};
use crate::allocator::BufferAllocator;
use crate::b64;
use crate::buffer::{with_scratch_buffer, Emit, FixedBuffer};
use crate::compare::fixed_time_equal;
use crate::error::*;
use std::sync::Arc;

/// Holds a base64-encoded MAC.
pub type MacBuffer = FixedBuffer<MAX_HMAC_BYTES_B64>;

/// HMAC the bytes produced by `base` with `key`, storing the base64 result in `out`.
///
/// The base string is built in a scratch buffer subject to the size cap of
/// `with_scratch_buffer`.
pub fn compute_mac<E: Emit>(
    algorithm: &Algorithm,
    key: &[u8],
    base: &E,
    allocator: &Arc<dyn BufferAllocator>,
    out: &mut MacBuffer,
) -> Result<()> {
    out.clear();
    let mut raw = [0u8; MAX_HMAC_BYTES];
    let len = with_scratch_buffer(base, allocator, |bytes| {
        log::trace!("base string {:?}", String::from_utf8_lossy(bytes));
        algorithm.hmac(key, bytes, &mut raw)
    })?;
    out.fill_with(|buf| b64::encode_into(&raw[..len], buf))?;
    log::debug!("computed {} MAC over {} byte digest", algorithm.name(), len);
    Ok(())
}

/// Compute the MAC of `base` and compare it to `claimed` without early exit.
pub fn verify_mac<E: Emit>(
    algorithm: &Algorithm,
    key: &[u8],
    base: &E,
    allocator: &Arc<dyn BufferAllocator>,
    scratch: &mut MacBuffer,
    claimed: &[u8],
) -> Result<bool> {
    compute_mac(algorithm, key, base, allocator, scratch)?;
    Ok(fixed_time_equal(scratch.as_bytes(), claimed))
}

#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod test {
    use super::*;
    use crate::algorithm::{SHA1, SHA256};
    use crate::allocator::SystemAllocator;
    use crate::base_string::{BaseString, MacType, TsBaseString};
    use pretty_assertions::assert_eq;

    const KEY: &[u8] = b"werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn";

    fn allocator() -> Arc<dyn BufferAllocator> {
        Arc::new(SystemAllocator)
    }

    fn base() -> BaseString<'static> {
        BaseString {
            mac_type: MacType::Header,
            ts: 1353832234,
            nonce: b"j4h3g2",
            method: b"GET",
            path: b"/resource/1?b=1&a=2",
            host: b"example.com",
            port: b"8000",
            hash: None,
            ext: Some(&b"some-app-ext-data"[..]),
        }
    }

    fn mac_of<E: Emit>(alg: &Algorithm, base: &E) -> String {
        let mut out = MacBuffer::new();
        compute_mac(alg, KEY, base, &allocator(), &mut out).unwrap();
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn sha256_known_answer() {
        assert_eq!(
            mac_of(&SHA256, &base()),
            "6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE="
        );
    }

    #[test]
    fn sha1_known_answer() {
        assert_eq!(mac_of(&SHA1, &base()), "KqOejc9yo2NAQlM29iSeYQEzwmE=");
        let no_ext = BaseString { ext: None, ..base() };
        assert_eq!(mac_of(&SHA1, &no_ext), "ic6931LDf4AXFTV+ikHjEoHh5AM=");
    }

    #[test]
    fn response_known_answer() {
        let bs = BaseString {
            mac_type: MacType::Response,
            ext: Some(&b"response-specific"[..]),
            ..base()
        };
        assert_eq!(
            mac_of(&SHA256, &bs),
            "xY6dN3Hws9o+XRICYnAcuxFOPLd1BZ7BkkJhUSpPidA="
        );
    }

    #[test]
    fn ts_known_answer() {
        assert_eq!(
            mac_of(&SHA256, &TsBaseString { ts: 1353832234 }),
            "2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0="
        );
        assert_eq!(
            mac_of(&SHA256, &TsBaseString { ts: -42 }),
            "gVggmoCIyxEneiTjRqPhHCQbAgSbJufQsgAXxInQnlo="
        );
    }

    #[test]
    fn verify() {
        let mut scratch = MacBuffer::new();
        assert!(verify_mac(
            &SHA256,
            KEY,
            &base(),
            &allocator(),
            &mut scratch,
            b"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE="
        )
        .unwrap());
        assert!(!verify_mac(
            &SHA256,
            KEY,
            &base(),
            &allocator(),
            &mut scratch,
            b"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAF="
        )
        .unwrap());
        assert!(!verify_mac(&SHA256, KEY, &base(), &allocator(), &mut scratch, b"").unwrap());
    }

    #[test]
    fn oversized_base_string() {
        let path = "/".repeat(3000);
        let bs = BaseString {
            path: path.as_bytes(),
            ..base()
        };
        let mut out = MacBuffer::new();
        let err = compute_mac(&SHA256, KEY, &bs, &allocator(), &mut out).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BufferTooLarge);
        assert!(out.is_empty());
    }
}
