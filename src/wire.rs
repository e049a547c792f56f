//! Wire message layout.
//!
//! ```text
//! [ tag (64 hex) ][ iv (32 hex) ][ ciphertext (hex or base64, per engine) ]
//! ```
//!
//! The message carries no version or profile field. The decoder must
//! already know the salt and try derivation profiles itself.

use crate::auth::TAG_HEX_LEN;
use crate::crypto::IV_LEN;
use crate::error::{CodecError, Result};

/// Length of the IV's hex form.
pub const IV_HEX_LEN: usize = IV_LEN * 2;

/// A structurally valid wire message, borrowed from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireMessage<'a> {
    tag: &'a str,
    body: &'a str,
}

impl<'a> WireMessage<'a> {
    /// Split `text` into tag and body.
    ///
    /// Only structure is checked here. Bad hex or a bad tag surfaces later as
    /// an authentication failure.
    pub fn parse(text: &'a str) -> Result<Self> {
        if !text.is_ascii() {
            return Err(CodecError::MalformedMessage("non-ascii content"));
        }
        if text.len() < TAG_HEX_LEN + IV_HEX_LEN {
            return Err(CodecError::MalformedMessage("too short for tag and iv"));
        }
        if text.len() == TAG_HEX_LEN + IV_HEX_LEN {
            return Err(CodecError::MalformedMessage("missing ciphertext"));
        }
        let (tag, body) = text.split_at(TAG_HEX_LEN);
        Ok(Self { tag, body })
    }

    pub fn tag(&self) -> &'a str {
        self.tag
    }

    /// IV followed by ciphertext: the authenticated part.
    pub fn body(&self) -> &'a str {
        self.body
    }

    pub fn iv(&self) -> &'a str {
        &self.body[..IV_HEX_LEN]
    }

    pub fn ciphertext(&self) -> &'a str {
        &self.body[IV_HEX_LEN..]
    }
}

/// Join a tag and an authenticated body into wire text.
pub fn assemble(tag: &str, body: &str) -> String {
    let mut out = String::with_capacity(tag.len() + body.len());
    out.push_str(tag);
    out.push_str(body);
    out
}
