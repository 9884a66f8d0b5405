//! In-memory SSH private key decoding

use std::borrow::Cow;

use russh::keys::{PrivateKey, decode_secret_key};
use tracing::debug;

const PEM_ARMOR: &str = "-----BEGIN ";

/// Key decoding errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("private key is empty")]
    Empty,

    #[error("invalid base64 encoding")]
    InvalidBase64,

    #[error("decoded key is not valid UTF-8")]
    InvalidUtf8,

    #[error("unable to parse private key: {0}")]
    Parse(#[from] russh::keys::Error),
}

/// Decode a private key held as text
///
/// The key may be PEM/OpenSSH armored, or base64 of an armored key. An empty
/// passphrase means the key is not encrypted.
///
/// # Errors
/// Returns `KeyError` if the text is not a usable private key or the
/// passphrase does not decrypt it
pub fn decode_private_key(key: &str, passphrase: &str) -> Result<PrivateKey, KeyError> {
    let text = key_text(key)?;
    let password = (!passphrase.is_empty()).then_some(passphrase);
    Ok(decode_secret_key(&text, password)?)
}

/// Return the armored key text, unwrapping a base64 layer if there is one
fn key_text(key: &str) -> Result<Cow<'_, str>, KeyError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Empty);
    }
    if trimmed.contains(PEM_ARMOR) {
        return Ok(Cow::Borrowed(key));
    }

    debug!("private key has no PEM armor, decoding as base64");
    let decoded = base64_decode(trimmed).map_err(|_| KeyError::InvalidBase64)?;
    let text = String::from_utf8(decoded).map_err(|_| KeyError::InvalidUtf8)?;
    Ok(Cow::Owned(text))
}

fn base64_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(input)
}
