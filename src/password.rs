//! Password policy.
//!
//! The codec never prompts. A caller that wants to allow a short password
//! says so explicitly.

use crate::error::{CodecError, Result};

/// Minimum password length, in characters, unless short passwords are
/// explicitly allowed.
pub const MIN_PASSWORD_LEN: usize = 14;

/// Reject empty passwords always, and short ones unless `allow_short`.
pub fn check_password(password: &str, allow_short: bool) -> Result<()> {
    let got = password.chars().count();
    if got == 0 || (got < MIN_PASSWORD_LEN && !allow_short) {
        return Err(CodecError::PasswordTooShort {
            min: if allow_short { 1 } else { MIN_PASSWORD_LEN },
            got,
        });
    }
    Ok(())
}
