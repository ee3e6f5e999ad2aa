use crate::algorithm::Algorithm;
use crate::b64;
use crate::crypto::{self, Hasher};
use crate::error::*;

/// A utility for hashing payloads. Feed your entity body to this, then pass the `finish`
/// result to a context with `set_hash`.
pub struct PayloadHasher {
    hasher: Box<dyn Hasher>,
}

impl PayloadHasher {
    /// Create a new PayloadHasher. The `content_type` should be lower-case and should
    /// not include parameters. The digest is the one underlying `algorithm`.
    pub fn new<B>(content_type: B, algorithm: &Algorithm) -> Result<Self>
    where
        B: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher {
            hasher: crypto::get_cryptographer()?.new_hasher(algorithm.digest())?,
        };
        hasher.update(b"hawk.1.payload\n")?;
        hasher.update(content_type.as_ref())?;
        hasher.update(b"\n")?;
        Ok(hasher)
    }

    /// Hash a single value and return the base64 form, ready for the `hash` parameter.
    pub fn hash<B1, B2>(content_type: B1, algorithm: &Algorithm, payload: B2) -> Result<String>
    where
        B1: AsRef<[u8]>,
        B2: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher::new(content_type, algorithm)?;
        hasher.update(payload)?;
        hasher.finish_base64()
    }

    /// Update the hash with new data.
    pub fn update<B>(&mut self, data: B) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        self.hasher.update(data.as_ref())?;
        Ok(())
    }

    /// Finish hashing and return the raw digest.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.hasher.update(b"\n")?;
        Ok(self.hasher.finish()?)
    }

    pub fn finish_base64(self) -> Result<String> {
        Ok(b64::encode(&self.finish()?))
    }
}

#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod tests {
    use super::PayloadHasher;
    use crate::algorithm::{SHA1, SHA256};
    use pretty_assertions::assert_eq;

    #[test]
    fn hash_consistency() {
        let mut hasher1 = PayloadHasher::new("text/plain", &SHA256).unwrap();
        hasher1.update("pay").unwrap();
        hasher1.update("load").unwrap();
        let hash1 = hasher1.finish().unwrap();

        let mut hasher2 = PayloadHasher::new("text/plain", &SHA256).unwrap();
        hasher2.update("payload").unwrap();
        let hash2 = hasher2.finish().unwrap();

        assert_eq!(
            hash1,
            vec![
                94, 16, 18, 216, 211, 65, 209, 208, 179, 220, 77, 56, 116, 162, 71, 244, 214, 10,
                7, 3, 156, 125, 202, 174, 255, 95, 42, 66, 142, 115, 102, 101
            ]
        );
        assert_eq!(hash2, hash1);
    }

    #[test]
    fn hash_known_answer() {
        assert_eq!(
            PayloadHasher::hash("text/plain", &SHA256, "Thank you for flying Hawk").unwrap(),
            "Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY="
        );
    }

    #[test]
    fn hash_sha1_length() {
        let mut h = PayloadHasher::new("text/plain", &SHA1).unwrap();
        h.update(b"payload").unwrap();
        assert_eq!(h.finish().unwrap().len(), 20);
    }
}
