//! A tokenizer for `Authorization` and `WWW-Authenticate` header values.
//!
//! Accepted grammar, a subset of the HTTP auth-param syntax without the `token68` form:
//!
//! ```text
//! credentials = scheme [ 1*SP param *( OWS "," OWS param ) ]
//! param       = token BWS "=" BWS quoted-string
//! ```
//!
//! Empty list elements (`, ,`) are skipped. Nothing is copied: the handler receives slices of
//! the input. Quoted values are delivered with their backslash escapes intact; removing them is
//! up to the handler.

use crate::error::*;

/// Receives the parts of a header as they are recognized.
pub trait AuthHeaderHandler<'a> {
    /// Called once with the scheme token. Returning an error aborts parsing.
    fn scheme(&mut self, scheme: &'a [u8]) -> Result<()>;

    /// Called for every parameter, in input order, duplicates and unknown keys included.
    fn param(&mut self, key: &'a [u8], value: &'a [u8]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scheme,
    Separator,
    ParamName,
    Equals,
    Quote,
    QuotedValue,
    Escape,
    AfterValue,
}

fn is_tchar(c: u8) -> bool {
    c.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&c)
}

fn is_ws(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Characters allowed unescaped inside a quoted string, other than `"` and `\`.
fn is_qdtext(c: u8) -> bool {
    matches!(c, b'\t' | b' ' | 0x21 | 0x23..=0x5b | 0x5d..=0x7e | 0x80..=0xff)
}

/// Characters allowed after a backslash.
fn is_escapable(c: u8) -> bool {
    matches!(c, b'\t' | b' ' | 0x21..=0x7e | 0x80..=0xff)
}

fn unexpected(input: &[u8], pos: usize, what: &str) -> Error {
    Error::Parse(format!(
        "unexpected character {:?} at position {} ({})",
        char::from(input[pos]),
        pos,
        what
    ))
}

/// Parse `input`, invoking `handler` for the scheme and each parameter.
pub fn parse_auth_header<'a, H>(input: &'a [u8], handler: &mut H) -> Result<()>
where
    H: AuthHeaderHandler<'a> + ?Sized,
{
    let mut state = State::Scheme;
    let mut start = 0;
    let mut key: &'a [u8] = &[];

    for (i, &c) in input.iter().enumerate() {
        state = match state {
            State::Scheme if is_tchar(c) => State::Scheme,
            State::Scheme if c == b' ' && i > 0 => {
                log::trace!("scheme {:?}", String::from_utf8_lossy(&input[..i]));
                handler.scheme(&input[..i])?;
                State::Separator
            }
            State::Scheme => return Err(unexpected(input, i, "in scheme")),

            State::Separator if is_ws(c) || c == b',' => State::Separator,
            State::Separator if is_tchar(c) => {
                start = i;
                State::ParamName
            }
            State::Separator => return Err(unexpected(input, i, "expected parameter name")),

            State::ParamName if is_tchar(c) => State::ParamName,
            State::ParamName if is_ws(c) || c == b'=' => {
                key = &input[start..i];
                if c == b'=' {
                    State::Quote
                } else {
                    State::Equals
                }
            }
            State::ParamName => return Err(unexpected(input, i, "in parameter name")),

            State::Equals if is_ws(c) => State::Equals,
            State::Equals if c == b'=' => State::Quote,
            State::Equals => return Err(unexpected(input, i, "expected '='")),

            State::Quote if is_ws(c) => State::Quote,
            State::Quote if c == b'"' => {
                start = i + 1;
                State::QuotedValue
            }
            State::Quote => return Err(unexpected(input, i, "expected '\"'")),

            State::QuotedValue if c == b'\\' => State::Escape,
            State::QuotedValue if c == b'"' => {
                handler.param(key, &input[start..i])?;
                State::AfterValue
            }
            State::QuotedValue if is_qdtext(c) => State::QuotedValue,
            State::QuotedValue => return Err(unexpected(input, i, "in quoted string")),

            State::Escape if is_escapable(c) => State::QuotedValue,
            State::Escape => return Err(unexpected(input, i, "bad escape")),

            State::AfterValue if is_ws(c) => State::AfterValue,
            State::AfterValue if c == b',' => State::Separator,
            State::AfterValue => return Err(unexpected(input, i, "expected ','")),
        };
    }

    match state {
        State::Scheme if input.is_empty() => Err(Error::Parse("empty header".to_string())),
        State::Scheme => handler.scheme(input),
        State::Separator | State::AfterValue => Ok(()),
        State::QuotedValue | State::Escape => {
            Err(Error::Parse("unterminated quoted string".to_string()))
        }
        State::ParamName | State::Equals | State::Quote => Err(Error::Parse(format!(
            "parameter {:?} has no value",
            String::from_utf8_lossy(if state == State::ParamName {
                &input[start..]
            } else {
                key
            })
        ))),
    }
}

/// Check that `value` can be placed between double quotes as-is: no bare `"`, no control
/// characters other than tab, and every backslash followed by an escapable character.
pub fn check_quoted_value(name: &str, value: &[u8]) -> Result<()> {
    let mut escaped = false;
    for &c in value {
        let ok = if escaped {
            escaped = false;
            is_escapable(c)
        } else if c == b'\\' {
            escaped = true;
            true
        } else {
            is_qdtext(c)
        };
        if !ok {
            return Err(Error::Parse(format!(
                "{} cannot be used in a quoted header value",
                name
            )));
        }
    }
    if escaped {
        return Err(Error::Parse(format!(
            "{} ends with an incomplete escape",
            name
        )));
    }
    Ok(())
}
