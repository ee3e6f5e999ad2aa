use crate::crypto::CryptoError;
use failure::Fail;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Capacity of the error message buffer carried by a `Context`.
pub const ERROR_MESSAGE_CAPACITY: usize = 1024;

/// Errors produced by the engine. Each variant carries a human-readable detail.
#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[fail(display = "Parse error: {}", _0)]
    Parse(String),

    #[fail(display = "Bad authentication scheme: {}", _0)]
    BadScheme(String),

    #[fail(display = "Token validation error: {}", _0)]
    TokenValidation(String),

    #[fail(display = "Unknown algorithm: {}", _0)]
    UnknownAlgorithm(String),

    #[fail(display = "Crypto error: {}", _0)]
    Crypto(String),

    #[fail(display = "Invalid time value: {}", _0)]
    TimeValue(String),

    #[fail(display = "Out of memory: {}", _0)]
    NoMem(String),

    #[fail(display = "Required buffer too large: {}", _0)]
    BufferTooLarge(String),

    #[fail(display = "{}", _0)]
    Other(String),

    #[fail(display = "Base64 error: {}", _0)]
    Base64(String),

    #[fail(display = "Numeric overflow: {}", _0)]
    Overflow(String),
}

/// Numeric error codes, one per `Error` variant plus `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    Parse,
    BadScheme,
    TokenValidation,
    UnknownAlgorithm,
    Crypto,
    TimeValue,
    NoMem,
    BufferTooLarge,
    Other,
    Base64,
    Overflow,
}

impl Error {
    /// The code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Parse(_) => ErrorCode::Parse,
            Error::BadScheme(_) => ErrorCode::BadScheme,
            Error::TokenValidation(_) => ErrorCode::TokenValidation,
            Error::UnknownAlgorithm(_) => ErrorCode::UnknownAlgorithm,
            Error::Crypto(_) => ErrorCode::Crypto,
            Error::TimeValue(_) => ErrorCode::TimeValue,
            Error::NoMem(_) => ErrorCode::NoMem,
            Error::BufferTooLarge(_) => ErrorCode::BufferTooLarge,
            Error::Other(_) => ErrorCode::Other,
            Error::Base64(_) => ErrorCode::Base64,
            Error::Overflow(_) => ErrorCode::Overflow,
        }
    }
}

/// Get a static description of an error code.
pub fn strerror(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::Ok => "No error",
        ErrorCode::Parse => "Parse error",
        ErrorCode::BadScheme => "Authentication scheme name not Hawk",
        ErrorCode::TokenValidation => "Token cannot be validated",
        ErrorCode::UnknownAlgorithm => "Unknown algorithm",
        ErrorCode::Crypto => "Error in crypto library",
        ErrorCode::TimeValue => "Not a valid unix time value",
        ErrorCode::NoMem => "Unable to allocate memory",
        ErrorCode::BufferTooLarge => "Required buffer size is too large",
        ErrorCode::Other => "Unspecific error",
        ErrorCode::Base64 => "Unexpected string length or padding in base64 coding",
        ErrorCode::Overflow => "Number value would cause integer overflow",
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(strerror(*self))
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Base64(e.to_string())
    }
}

/// Fixed-capacity storage for the last error message of a context.
///
/// Messages longer than `ERROR_MESSAGE_CAPACITY` bytes are truncated, never rejected.
/// Truncation happens at a character boundary so the stored text stays valid UTF-8.
pub struct ErrorMessage {
    buf: [u8; ERROR_MESSAGE_CAPACITY],
    len: usize,
}

impl ErrorMessage {
    pub fn new() -> Self {
        ErrorMessage {
            buf: [0; ERROR_MESSAGE_CAPACITY],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Replace the stored message with the display form of `msg`.
    pub fn set<D: fmt::Display>(&mut self, msg: D) {
        use std::fmt::Write;
        self.len = 0;
        // the writer never fails; overflow is truncated
        let _ = write!(self, "{}", msg);
    }

    pub fn as_str(&self) -> &str {
        // only whole characters are ever copied in
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl Default for ErrorMessage {
    fn default() -> Self {
        ErrorMessage::new()
    }
}

impl fmt::Write for ErrorMessage {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = ERROR_MESSAGE_CAPACITY - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

impl fmt::Debug for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorMessage").field(&self.as_str()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_match_variants() {
        assert_eq!(Error::Parse("x".into()).code(), ErrorCode::Parse);
        assert_eq!(Error::Base64("x".into()).code(), ErrorCode::Base64);
        assert_eq!(Error::Overflow("x".into()).code(), ErrorCode::Overflow);
        assert_eq!(strerror(ErrorCode::BadScheme), "Authentication scheme name not Hawk");
    }

    #[test]
    fn display_includes_detail() {
        let e = Error::UnknownAlgorithm("md5".to_string());
        assert_eq!(e.to_string(), "Unknown algorithm: md5");
    }

    #[test]
    fn message_stored() {
        let mut m = ErrorMessage::new();
        m.set(Error::TimeValue("abc".to_string()));
        assert_eq!(m.as_str(), "Invalid time value: abc");
        m.clear();
        assert_eq!(m.as_str(), "");
    }

    #[test]
    fn message_truncated() {
        let mut m = ErrorMessage::new();
        let long = "x".repeat(ERROR_MESSAGE_CAPACITY + 100);
        m.set(&long);
        assert_eq!(m.as_str().len(), ERROR_MESSAGE_CAPACITY);
        assert!(long.starts_with(m.as_str()));
    }

    #[test]
    fn message_truncated_on_char_boundary() {
        let mut m = ErrorMessage::new();
        // 1023 ascii bytes followed by a two-byte character that does not fit
        let long = format!("{}é", "a".repeat(ERROR_MESSAGE_CAPACITY - 1));
        m.set(&long);
        assert_eq!(m.as_str().len(), ERROR_MESSAGE_CAPACITY - 1);
    }
}
