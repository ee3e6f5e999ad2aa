use crate::buffer::{Emit, Sink};
use crate::error::*;
use crate::parser::{check_quoted_value, parse_auth_header, AuthHeaderHandler};
use crate::time::parse_time;

/// The authentication scheme of every Hawk header.
pub const SCHEME: &str = "Hawk";

/// Representation of a Hawk `Authorization` or `Server-Authorization` header value.
///
/// All string-valued fields borrow from somewhere else: the parsed input for incoming headers,
/// or the caller's values and the context's buffers for outgoing ones. Quoted values are kept
/// exactly as they appear on the wire, escapes included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizationHeader<'a> {
    pub id: Option<&'a [u8]>,
    pub ts: Option<i64>,
    pub nonce: Option<&'a [u8]>,
    pub mac: Option<&'a [u8]>,
    pub hash: Option<&'a [u8]>,
    pub ext: Option<&'a [u8]>,
    pub app: Option<&'a [u8]>,
    pub dlg: Option<&'a [u8]>,
}

impl<'a> AuthorizationHeader<'a> {
    /// Parse a full header value, including the `Hawk` scheme. Unknown parameters are ignored;
    /// a repeated parameter is an error.
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        let mut header = AuthorizationHeader::default();
        parse_auth_header(input, &mut header)?;
        Ok(header)
    }
}

fn check_scheme(scheme: &[u8]) -> Result<()> {
    if scheme.eq_ignore_ascii_case(SCHEME.as_bytes()) {
        Ok(())
    } else {
        Err(Error::BadScheme(format!(
            "expected {}, got {:?}",
            SCHEME,
            String::from_utf8_lossy(scheme)
        )))
    }
}

fn set_once<T>(slot: &mut Option<T>, key: &[u8], value: T) -> Result<()> {
    if slot.is_some() {
        return Err(Error::Parse(format!(
            "duplicate parameter {}",
            String::from_utf8_lossy(key)
        )));
    }
    *slot = Some(value);
    Ok(())
}

fn ignore_param(key: &[u8]) -> Result<()> {
    log::debug!("ignoring unknown parameter {:?}", String::from_utf8_lossy(key));
    Ok(())
}

impl<'a> AuthHeaderHandler<'a> for AuthorizationHeader<'a> {
    fn scheme(&mut self, scheme: &'a [u8]) -> Result<()> {
        check_scheme(scheme)
    }

    fn param(&mut self, key: &'a [u8], value: &'a [u8]) -> Result<()> {
        match key {
            b"id" => set_once(&mut self.id, key, value),
            b"ts" => set_once(&mut self.ts, key, parse_time(value)?),
            b"nonce" => set_once(&mut self.nonce, key, value),
            b"mac" => set_once(&mut self.mac, key, value),
            b"hash" => set_once(&mut self.hash, key, value),
            b"ext" => set_once(&mut self.ext, key, value),
            b"app" => set_once(&mut self.app, key, value),
            b"dlg" => set_once(&mut self.dlg, key, value),
            _ => ignore_param(key),
        }
    }
}

/// Writes `key="value"` pairs after the scheme.
struct ParamWriter<'s, S: Sink> {
    sink: &'s mut S,
    first: bool,
}

impl<'s, S: Sink> ParamWriter<'s, S> {
    fn start(sink: &'s mut S) -> Result<Self> {
        sink.put(SCHEME.as_bytes())?;
        Ok(ParamWriter { sink, first: true })
    }

    fn lead(&mut self, name: &str) -> Result<()> {
        self.sink.put(if self.first { &b" "[..] } else { &b", "[..] })?;
        self.first = false;
        self.sink.put(name.as_bytes())?;
        self.sink.put(b"=\"")
    }

    fn bytes(&mut self, name: &str, value: Option<&[u8]>) -> Result<()> {
        if let Some(value) = value {
            check_quoted_value(name, value)?;
            self.lead(name)?;
            self.sink.put(value)?;
            self.sink.put(b"\"")?;
        }
        Ok(())
    }

    fn time(&mut self, name: &str, value: Option<i64>) -> Result<()> {
        if let Some(value) = value {
            self.lead(name)?;
            self.sink.put_time(value)?;
            self.sink.put(b"\"")?;
        }
        Ok(())
    }
}

impl<'a> Emit for AuthorizationHeader<'a> {
    /// Parameters are written in a fixed order: id, ts, nonce, mac, hash, ext, app, dlg.
    fn emit<S: Sink>(&self, sink: &mut S) -> Result<()> {
        let mut w = ParamWriter::start(sink)?;
        w.bytes("id", self.id)?;
        w.time("ts", self.ts)?;
        w.bytes("nonce", self.nonce)?;
        w.bytes("mac", self.mac)?;
        w.bytes("hash", self.hash)?;
        w.bytes("ext", self.ext)?;
        w.bytes("app", self.app)?;
        w.bytes("dlg", self.dlg)
    }
}

/// Representation of a Hawk `WWW-Authenticate` header value, used to tell a client the
/// server's time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WwwAuthenticateHeader<'a> {
    pub ts: Option<i64>,
    pub tsm: Option<&'a [u8]>,
}

impl<'a> WwwAuthenticateHeader<'a> {
    /// Parse a full header value, including the `Hawk` scheme.
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        let mut header = WwwAuthenticateHeader::default();
        parse_auth_header(input, &mut header)?;
        Ok(header)
    }
}

impl<'a> AuthHeaderHandler<'a> for WwwAuthenticateHeader<'a> {
    fn scheme(&mut self, scheme: &'a [u8]) -> Result<()> {
        check_scheme(scheme)
    }

    fn param(&mut self, key: &'a [u8], value: &'a [u8]) -> Result<()> {
        match key {
            b"ts" => set_once(&mut self.ts, key, parse_time(value)?),
            b"tsm" => set_once(&mut self.tsm, key, value),
            _ => ignore_param(key),
        }
    }
}

impl<'a> Emit for WwwAuthenticateHeader<'a> {
    fn emit<S: Sink>(&self, sink: &mut S) -> Result<()> {
        let mut w = ParamWriter::start(sink)?;
        w.time("ts", self.ts)?;
        w.bytes("tsm", self.tsm)
    }
}
