//! Stateless text encodings used by the chunk-read and text-write helpers.

use std::borrow::Cow;

/// A stateless byte-to-text transform.
///
/// Implementations are immutable: a single instance may serve any number of
/// concurrent calls. Both directions are replacement-based, so neither can
/// fail: bytes that do not form a valid character decode to U+FFFD, and
/// characters the encoding cannot express encode to a substitute byte.
pub trait TextEncoding {
    /// Decodes raw bytes into text.
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str>;

    /// Encodes text into raw bytes.
    fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]>;
}

/// UTF-8, the default encoding.
///
/// Decoding borrows the input when it is already valid UTF-8; invalid
/// sequences are replaced with U+FFFD. Encoding is the identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8;

impl TextEncoding for Utf8 {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        String::from_utf8_lossy(bytes)
    }

    fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        Cow::Borrowed(text.as_bytes())
    }
}

/// ISO-8859-1 (Latin-1).
///
/// Every byte decodes to the code point of equal value. Characters above
/// U+00FF encode to `?`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latin1;

impl TextEncoding for Latin1 {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        // ASCII coincides with UTF-8, so the common case can borrow.
        if let Ok(text) = std::str::from_utf8(bytes) {
            if text.is_ascii() {
                return Cow::Borrowed(text);
            }
        }
        Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
    }

    fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        if text.is_ascii() {
            return Cow::Borrowed(text.as_bytes());
        }
        Cow::Owned(
            text.chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        )
    }
}
