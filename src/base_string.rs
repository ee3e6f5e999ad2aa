//! Canonical base strings, the exact bytes over which Hawk MACs are computed.

use crate::buffer::{Emit, Sink};
use crate::error::*;

/// Which protocol tag a header base string begins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacType {
    /// `Authorization` headers sent by clients.
    Header,
    /// `Server-Authorization` headers sent by servers.
    Response,
}

impl MacType {
    fn tag(self) -> &'static [u8] {
        match self {
            MacType::Header => b"hawk.1.header",
            MacType::Response => b"hawk.1.response",
        }
    }
}

impl Default for MacType {
    fn default() -> Self {
        MacType::Header
    }
}

/// The fields of a request or response base string.
///
/// Every field is terminated by a newline, absent optional fields included, so the number of
/// lines is fixed.
#[derive(Debug, Clone, Default)]
pub struct BaseString<'a> {
    pub mac_type: MacType,
    pub ts: i64,
    pub nonce: &'a [u8],
    pub method: &'a [u8],
    pub path: &'a [u8],
    pub host: &'a [u8],
    pub port: &'a [u8],
    pub hash: Option<&'a [u8]>,
    pub ext: Option<&'a [u8]>,
}

impl<'a> Emit for BaseString<'a> {
    fn emit<S: Sink>(&self, sink: &mut S) -> Result<()> {
        sink.put(self.mac_type.tag())?;
        sink.put(b"\n")?;
        sink.put_time(self.ts)?;
        sink.put(b"\n")?;
        for field in &[self.nonce, self.method, self.path, self.host, self.port] {
            sink.put(field)?;
            sink.put(b"\n")?;
        }
        sink.put(self.hash.unwrap_or(b""))?;
        sink.put(b"\n")?;
        sink.put(self.ext.unwrap_or(b""))?;
        sink.put(b"\n")
    }
}

/// The base string of a timestamp MAC (`tsm`) in a `WWW-Authenticate` header.
#[derive(Debug, Clone, Copy)]
pub struct TsBaseString {
    pub ts: i64,
}

impl Emit for TsBaseString {
    fn emit<S: Sink>(&self, sink: &mut S) -> Result<()> {
        sink.put(b"hawk.1.ts\n")?;
        sink.put_time(self.ts)?;
        sink.put(b"\n")
    }
}
