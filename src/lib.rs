//! The `hawkc` crate is an engine for the [Hawk](https://github.com/hueniverse/hawk) HTTP
//! authentication scheme: it parses and produces `Authorization`, `Server-Authorization` and
//! `WWW-Authenticate` header values, builds the canonical base strings Hawk signs, and creates
//! and validates their MACs.
//!
//! All work is done through a [`Context`](struct.Context.html). Configure it with setters,
//! then either produce a header with the calculate-length / create pair, or parse an incoming
//! header and validate it. Values set on a context and parsed header fields are borrowed,
//! never copied.
//!
//! The engine does not check timestamp freshness or nonce replay; that policy belongs to the
//! caller.
//!
//! # Examples
//!
//! ## Hawk Client
//!
//! A client builds an `Authorization` header for its request.
//!
//! ```
//! use hawkc::{Context, SHA256};
//!
//! let mut ctx = Context::new();
//! ctx.set_algorithm(&SHA256);
//! ctx.set_id("dh37fgj492je");
//! ctx.set_password("werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn");
//! ctx.set_method("GET");
//! ctx.set_host("example.com");
//! ctx.set_port("8000");
//! ctx.set_path("/resource/1?b=1&a=2");
//! ctx.set_ts(1353832234);
//! ctx.set_nonce("j4h3g2");
//! ctx.set_ext("some-app-ext-data");
//!
//! let len = ctx.calculate_authorization_header_length().unwrap();
//! let mut header = vec![0u8; len];
//! ctx.create_authorization_header(&mut header).unwrap();
//! assert_eq!(
//!     header,
//!     &b"Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
//!        mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\", ext=\"some-app-ext-data\""[..]
//! );
//! ```
//!
//! ## Hawk Server
//!
//! A server parses the header, configures the credentials it holds for the claimed id and
//! the request it received, then validates.
//!
//! ```
//! use hawkc::{algorithm_by_name, Context};
//!
//! let header = "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
//!               ext=\"some-app-ext-data\", mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\"";
//!
//! let mut ctx = Context::new();
//! ctx.parse_authorization_header(header).unwrap();
//! assert_eq!(ctx.authorization_header_in().id, Some(&b"dh37fgj492je"[..]));
//!
//! ctx.set_algorithm(algorithm_by_name("SHA256").unwrap());
//! ctx.set_password("werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn");
//! ctx.set_method("GET");
//! ctx.set_host("example.com");
//! ctx.set_port("8000");
//! ctx.set_path("/resource/1?b=1&a=2");
//! assert!(ctx.validate_hmac().unwrap());
//! ```

mod algorithm;
mod allocator;
pub mod b64;
mod base_string;
mod buffer;
mod compare;
mod context;
pub mod crypto;
mod error;
mod header;
mod mac;
mod parser;
mod payload;
pub mod time;

pub use crate::algorithm::{
    algorithm_by_name, Algorithm, DigestAlgorithm, MAX_HMAC_BYTES, MAX_HMAC_BYTES_B64, SHA1,
    SHA256,
};
pub use crate::allocator::{Allocation, BufferAllocator, SystemAllocator};
pub use crate::base_string::{BaseString, MacType, TsBaseString};
pub use crate::buffer::{
    with_scratch_buffer, Emit, FixedBuffer, LengthCounter, Sink, SliceWriter, BASE_BUFFER_SIZE,
    MAX_DYN_BASE_BUFFER_SIZE,
};
pub use crate::compare::fixed_time_equal;
pub use crate::context::{Context, MAX_NONCE_BYTES, MAX_NONCE_HEX_BYTES};
pub use crate::error::{strerror, Error, ErrorCode, ErrorMessage, Result, ERROR_MESSAGE_CAPACITY};
pub use crate::header::{AuthorizationHeader, WwwAuthenticateHeader, SCHEME};
pub use crate::mac::{compute_mac, verify_mac, MacBuffer};
pub use crate::parser::{check_quoted_value, parse_auth_header, AuthHeaderHandler};
pub use crate::payload::PayloadHasher;
