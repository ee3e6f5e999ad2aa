use crate::algorithm::Algorithm;
use crate::allocator::{Allocation, BufferAllocator, SystemAllocator};
use crate::base_string::{BaseString, MacType, TsBaseString};
use crate::buffer::{Emit, FixedBuffer};
use crate::crypto;
use crate::error::*;
use crate::header::{AuthorizationHeader, WwwAuthenticateHeader};
use crate::mac::{compute_mac, verify_mac, MacBuffer};
use crate::time;
use std::sync::Arc;

/// Number of random bytes in a generated nonce.
pub const MAX_NONCE_BYTES: usize = 6;

/// Length of a generated nonce in hex form.
pub const MAX_NONCE_HEX_BYTES: usize = 2 * MAX_NONCE_BYTES;

fn view<S: AsRef<[u8]> + ?Sized>(value: &S) -> &[u8] {
    value.as_ref()
}

/// State for creating or validating one Hawk header.
///
/// A context is configured through its setters, which borrow the caller's values for `'a`, and
/// then used either to produce a header (client requests, server responses and
/// `WWW-Authenticate` challenges) or to validate a parsed one. Parsed header fields borrow
/// from the parsed input, so that input must outlive the context as well.
///
/// Output is produced in two steps: `calculate_*_length` returns the exact size, then
/// `create_*` writes into a buffer of at least that size. Calling any setter invalidates
/// previously computed output; the length must be calculated again before the next write.
///
/// Freshness of timestamps and nonce replay are not checked. That is left to the caller.
///
/// A context records the last error that occurred in it; see `error_code` and
/// `error_message`.
pub struct Context<'a> {
    allocator: Arc<dyn BufferAllocator>,
    error: ErrorCode,
    error_message: ErrorMessage,
    offset: i64,
    mac_type: MacType,

    algorithm: Option<&'static Algorithm>,
    password: Option<&'a [u8]>,

    method: &'a [u8],
    path: &'a [u8],
    host: &'a [u8],
    port: &'a [u8],

    header_in: AuthorizationHeader<'a>,
    // mac is never set here; it lives in `hmac`
    header_out: AuthorizationHeader<'a>,
    www_authenticate_in: WwwAuthenticateHeader<'a>,
    www_authenticate_ts: Option<i64>,

    hmac: MacBuffer,
    ts_hmac: MacBuffer,
    nonce: FixedBuffer<MAX_NONCE_HEX_BYTES>,

    // timestamps of prepared output, `None` when it must be (re)computed
    prepared: Option<i64>,
    www_prepared: Option<i64>,
}

impl<'a> Context<'a> {
    /// Create an unconfigured context using the system allocator.
    pub fn new() -> Self {
        Context {
            allocator: Arc::new(SystemAllocator),
            error: ErrorCode::Ok,
            error_message: ErrorMessage::new(),
            offset: 0,
            mac_type: MacType::Header,
            algorithm: None,
            password: None,
            method: &[],
            path: &[],
            host: &[],
            port: &[],
            header_in: AuthorizationHeader::default(),
            header_out: AuthorizationHeader::default(),
            www_authenticate_in: WwwAuthenticateHeader::default(),
            www_authenticate_ts: None,
            hmac: MacBuffer::new(),
            ts_hmac: MacBuffer::new(),
            nonce: FixedBuffer::new(),
            prepared: None,
            www_prepared: None,
        }
    }

    fn invalidate(&mut self) {
        self.prepared = None;
        self.www_prepared = None;
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            log::debug!("hawk context error: {}", e);
            self.error = e.code();
            self.error_message.set(e);
        }
        result
    }

    /// Replace the allocator used for dynamically sized buffers.
    pub fn set_allocator(&mut self, allocator: Arc<dyn BufferAllocator>) {
        self.allocator = allocator;
        self.invalidate();
    }

    /// Allocate a buffer from this context's allocator. It is released when dropped.
    pub fn allocate(&mut self, size: usize) -> Result<Allocation> {
        let result = Allocation::new(&self.allocator, size);
        self.track(result)
    }

    /// Set the number of seconds added to the local clock when generating timestamps.
    pub fn set_clock_offset(&mut self, offset: i64) {
        self.offset = offset;
        self.invalidate();
    }

    /// Select whether MACs are computed for request (`Authorization`) or response
    /// (`Server-Authorization`) headers.
    pub fn set_mac_type(&mut self, mac_type: MacType) {
        self.mac_type = mac_type;
        self.invalidate();
    }

    pub fn set_algorithm(&mut self, algorithm: &'static Algorithm) {
        self.algorithm = Some(algorithm);
        self.invalidate();
    }

    /// Set the shared secret used for signing and validation.
    pub fn set_password<S: AsRef<[u8]> + ?Sized>(&mut self, password: &'a S) {
        self.password = Some(view(password));
        self.invalidate();
    }

    /// Set the request method, e.g. `GET`.
    pub fn set_method<S: AsRef<[u8]> + ?Sized>(&mut self, method: &'a S) {
        self.method = view(method);
        self.invalidate();
    }

    /// Set the request path, including any query string.
    pub fn set_path<S: AsRef<[u8]> + ?Sized>(&mut self, path: &'a S) {
        self.path = view(path);
        self.invalidate();
    }

    pub fn set_host<S: AsRef<[u8]> + ?Sized>(&mut self, host: &'a S) {
        self.host = view(host);
        self.invalidate();
    }

    /// Set the request port, in decimal.
    pub fn set_port<S: AsRef<[u8]> + ?Sized>(&mut self, port: &'a S) {
        self.port = view(port);
        self.invalidate();
    }

    /// Set the `id` parameter of outgoing headers.
    pub fn set_id<S: AsRef<[u8]> + ?Sized>(&mut self, id: &'a S) {
        self.header_out.id = Some(view(id));
        self.invalidate();
    }

    /// Set the `ext` parameter of outgoing headers.
    ///
    /// The value is signed and written exactly as given. It must already be in quoted-string
    /// form: any `"` or `\` it contains has to be escaped by the caller, and a receiver signs
    /// the escaped form it sees on the wire.
    pub fn set_ext<S: AsRef<[u8]> + ?Sized>(&mut self, ext: &'a S) {
        self.header_out.ext = Some(view(ext));
        self.invalidate();
    }

    /// Set the base64 payload hash of outgoing headers. See `PayloadHasher`.
    pub fn set_hash<S: AsRef<[u8]> + ?Sized>(&mut self, hash: &'a S) {
        self.header_out.hash = Some(view(hash));
        self.invalidate();
    }

    pub fn set_app<S: AsRef<[u8]> + ?Sized>(&mut self, app: &'a S) {
        self.header_out.app = Some(view(app));
        self.invalidate();
    }

    pub fn set_dlg<S: AsRef<[u8]> + ?Sized>(&mut self, dlg: &'a S) {
        self.header_out.dlg = Some(view(dlg));
        self.invalidate();
    }

    /// Fix the timestamp of outgoing headers instead of using the clock.
    ///
    /// For response headers this must be the timestamp of the request being answered.
    pub fn set_ts(&mut self, ts: i64) {
        self.header_out.ts = Some(ts);
        self.invalidate();
    }

    /// Fix the nonce of outgoing headers instead of generating one.
    ///
    /// For response headers this must be the nonce of the request being answered.
    pub fn set_nonce<S: AsRef<[u8]> + ?Sized>(&mut self, nonce: &'a S) {
        self.header_out.nonce = Some(view(nonce));
        self.invalidate();
    }

    /// Set the timestamp announced in `WWW-Authenticate` headers. Defaults to the current
    /// time.
    pub fn set_www_authenticate_ts(&mut self, ts: i64) {
        self.www_authenticate_ts = Some(ts);
        self.invalidate();
    }

    /// The code of the last error that occurred in this context.
    pub fn error_code(&self) -> ErrorCode {
        self.error
    }

    /// A description of the last error that occurred in this context.
    pub fn error_message(&self) -> &str {
        self.error_message.as_str()
    }

    /// The header parsed by `parse_authorization_header`.
    pub fn authorization_header_in(&self) -> &AuthorizationHeader<'a> {
        &self.header_in
    }

    /// The header parsed by `parse_www_authenticate_header`.
    pub fn www_authenticate_header_in(&self) -> &WwwAuthenticateHeader<'a> {
        &self.www_authenticate_in
    }

    /// The timestamp of the prepared outgoing header, if any.
    pub fn ts(&self) -> Option<i64> {
        self.prepared
    }

    /// The nonce of the prepared outgoing header, if any.
    pub fn nonce(&self) -> Option<&[u8]> {
        self.prepared.map(|_| self.outgoing_nonce())
    }

    /// The base64 MAC most recently computed by this context.
    pub fn mac(&self) -> &[u8] {
        self.hmac.as_bytes()
    }

    fn require_credentials(&self) -> Result<(&'static Algorithm, &'a [u8])> {
        let algorithm = self
            .algorithm
            .ok_or_else(|| Error::Other("no algorithm configured".to_string()))?;
        let password = self
            .password
            .ok_or_else(|| Error::Other("no password configured".to_string()))?;
        Ok((algorithm, password))
    }

    fn outgoing_nonce(&self) -> &[u8] {
        match self.header_out.nonce {
            Some(nonce) => nonce,
            None => self.nonce.as_bytes(),
        }
    }

    fn generate_nonce(&mut self) -> Result<()> {
        let mut raw = [0u8; MAX_NONCE_BYTES];
        crypto::get_cryptographer()?.rand_bytes(&mut raw)?;
        self.nonce.fill_with(|buf| {
            hex::encode_to_slice(&raw, &mut buf[..])
                .map_err(|e| Error::Other(format!("encoding nonce: {}", e)))?;
            Ok(MAX_NONCE_HEX_BYTES)
        })
    }

    fn prepare_authorization(&mut self) -> Result<()> {
        if self.prepared.is_some() {
            return Ok(());
        }
        let (algorithm, password) = self.require_credentials()?;
        let ts = match (self.header_out.ts, self.mac_type) {
            (Some(ts), _) => ts,
            (None, MacType::Header) => time::now(self.offset)?,
            (None, MacType::Response) => {
                return Err(Error::Other(
                    "response headers need the request timestamp".to_string(),
                ))
            }
        };
        if self.header_out.nonce.is_none() {
            if self.mac_type == MacType::Response {
                return Err(Error::Other(
                    "response headers need the request nonce".to_string(),
                ));
            }
            self.generate_nonce()?;
        }

        let nonce = match self.header_out.nonce {
            Some(nonce) => nonce,
            None => self.nonce.as_bytes(),
        };
        let base = BaseString {
            mac_type: self.mac_type,
            ts,
            nonce,
            method: self.method,
            path: self.path,
            host: self.host,
            port: self.port,
            hash: self.header_out.hash,
            ext: self.header_out.ext,
        };
        compute_mac(algorithm, password, &base, &self.allocator, &mut self.hmac)?;
        self.prepared = Some(ts);
        Ok(())
    }

    fn outgoing_header(&self) -> AuthorizationHeader<'_> {
        let h = &self.header_out;
        match self.mac_type {
            MacType::Header => AuthorizationHeader {
                id: h.id,
                ts: self.prepared,
                nonce: Some(self.outgoing_nonce()),
                mac: Some(self.hmac.as_bytes()),
                hash: h.hash,
                ext: h.ext,
                app: h.app,
                dlg: h.dlg,
            },
            // Server-Authorization carries only mac, hash and ext
            MacType::Response => AuthorizationHeader {
                mac: Some(self.hmac.as_bytes()),
                hash: h.hash,
                ext: h.ext,
                ..AuthorizationHeader::default()
            },
        }
    }

    fn authorization_header_length(&mut self) -> Result<usize> {
        self.prepare_authorization()?;
        self.outgoing_header().calculate_length()
    }

    /// Calculate the size of the header value `create_authorization_header` will write.
    ///
    /// This fixes the timestamp and nonce and computes the MAC of the outgoing header.
    pub fn calculate_authorization_header_length(&mut self) -> Result<usize> {
        let result = self.authorization_header_length();
        self.track(result)
    }

    fn write_authorization_header(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = self.authorization_header_length()?;
        if buf.len() < len {
            return Err(Error::Other(format!(
                "header needs {} bytes, buffer has {}",
                len,
                buf.len()
            )));
        }
        self.outgoing_header().write(buf)
    }

    /// Write the `Authorization` (or `Server-Authorization`) header value, including the
    /// `Hawk` scheme, to `buf` and return the number of bytes written.
    pub fn create_authorization_header(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.write_authorization_header(buf);
        self.track(result)
    }

    /// Parse an incoming `Authorization` or `Server-Authorization` header value.
    pub fn parse_authorization_header<S: AsRef<[u8]> + ?Sized>(
        &mut self,
        value: &'a S,
    ) -> Result<()> {
        self.header_in = AuthorizationHeader::default();
        let result = AuthorizationHeader::parse(view(value)).map(|header| {
            self.header_in = header;
        });
        self.track(result)
    }

    fn check_hmac(&mut self) -> Result<bool> {
        let (algorithm, password) = self.require_credentials()?;
        let h = self.header_in;
        let claimed = h
            .mac
            .ok_or_else(|| Error::Other("header has no mac".to_string()))?;

        // responses are checked against the timestamp and nonce of the request we sent
        let (ts, nonce) = match self.mac_type {
            MacType::Header => {
                if h.id.is_none() {
                    return Err(Error::Other("header has no id".to_string()));
                }
                let ts = h
                    .ts
                    .ok_or_else(|| Error::Other("header has no ts".to_string()))?;
                (ts, h.nonce.unwrap_or(&[]))
            }
            MacType::Response => match (self.header_out.ts, self.header_out.nonce) {
                (Some(ts), Some(nonce)) => (ts, nonce),
                _ => {
                    return Err(Error::Other(
                        "response validation needs the request timestamp and nonce".to_string(),
                    ))
                }
            },
        };

        let base = BaseString {
            mac_type: self.mac_type,
            ts,
            nonce,
            method: self.method,
            path: self.path,
            host: self.host,
            port: self.port,
            hash: h.hash,
            ext: h.ext,
        };
        // the working MAC buffer is reused, so prepared output is gone
        self.prepared = None;
        let valid = verify_mac(
            algorithm,
            password,
            &base,
            &self.allocator,
            &mut self.hmac,
            claimed,
        )?;
        log::debug!("mac validation for ts {}: {}", ts, valid);
        Ok(valid)
    }

    /// Validate the MAC of the header parsed by `parse_authorization_header` against this
    /// context's configuration.
    ///
    /// Returns `Ok(false)` for a well-formed header whose MAC does not match.
    pub fn validate_hmac(&mut self) -> Result<bool> {
        let result = self.check_hmac();
        self.track(result)
    }

    fn prepare_www_authenticate(&mut self) -> Result<()> {
        if self.www_prepared.is_some() {
            return Ok(());
        }
        let (algorithm, password) = self.require_credentials()?;
        let ts = match self.www_authenticate_ts {
            Some(ts) => ts,
            None => time::now(self.offset)?,
        };
        compute_mac(
            algorithm,
            password,
            &TsBaseString { ts },
            &self.allocator,
            &mut self.ts_hmac,
        )?;
        self.www_prepared = Some(ts);
        Ok(())
    }

    fn outgoing_www_authenticate_header(&self) -> WwwAuthenticateHeader<'_> {
        WwwAuthenticateHeader {
            ts: self.www_prepared,
            tsm: Some(self.ts_hmac.as_bytes()),
        }
    }

    fn www_authenticate_header_length(&mut self) -> Result<usize> {
        self.prepare_www_authenticate()?;
        self.outgoing_www_authenticate_header().calculate_length()
    }

    /// Calculate the size of the header value `create_www_authenticate_header` will write.
    pub fn calculate_www_authenticate_header_length(&mut self) -> Result<usize> {
        let result = self.www_authenticate_header_length();
        self.track(result)
    }

    fn write_www_authenticate_header(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = self.www_authenticate_header_length()?;
        if buf.len() < len {
            return Err(Error::Other(format!(
                "header needs {} bytes, buffer has {}",
                len,
                buf.len()
            )));
        }
        self.outgoing_www_authenticate_header().write(buf)
    }

    /// Write a `WWW-Authenticate` header value carrying the server time and its MAC.
    pub fn create_www_authenticate_header(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.write_www_authenticate_header(buf);
        self.track(result)
    }

    /// Parse an incoming `WWW-Authenticate` header value.
    pub fn parse_www_authenticate_header<S: AsRef<[u8]> + ?Sized>(
        &mut self,
        value: &'a S,
    ) -> Result<()> {
        self.www_authenticate_in = WwwAuthenticateHeader::default();
        let result = WwwAuthenticateHeader::parse(view(value)).map(|header| {
            self.www_authenticate_in = header;
        });
        self.track(result)
    }

    fn check_tsm(&mut self) -> Result<bool> {
        let (algorithm, password) = self.require_credentials()?;
        let h = self.www_authenticate_in;
        let ts = h
            .ts
            .ok_or_else(|| Error::Other("header has no ts".to_string()))?;
        let claimed = h
            .tsm
            .ok_or_else(|| Error::Other("header has no tsm".to_string()))?;
        self.www_prepared = None;
        verify_mac(
            algorithm,
            password,
            &TsBaseString { ts },
            &self.allocator,
            &mut self.ts_hmac,
            claimed,
        )
    }

    /// Check the `tsm` of the header parsed by `parse_www_authenticate_header`, so that its
    /// `ts` can be trusted when adjusting the clock offset.
    pub fn validate_www_authenticate_tsm(&mut self) -> Result<bool> {
        let result = self.check_tsm();
        self.track(result)
    }
}

impl<'a> Default for Context<'a> {
    fn default() -> Self {
        Context::new()
    }
}
