//! Encoding-safe output

use crate::config::{EncodingErrors, OutputEncoding};
use std::borrow::Cow;
use std::io::{self, Write};

/// Writes text to a byte stream in a fixed encoding.
pub struct SafeWriter<'w> {
    inner: &'w mut dyn Write,
    encoding: OutputEncoding,
    errors: EncodingErrors,
}

impl<'w> SafeWriter<'w> {
    pub fn new(inner: &'w mut dyn Write, encoding: OutputEncoding, errors: EncodingErrors) -> Self {
        Self {
            inner,
            encoding,
            errors,
        }
    }

    /// # Errors
    ///
    /// Fails on I/O errors and, with [`EncodingErrors::Strict`], on
    /// characters the encoding cannot represent.
    pub fn write_text(&mut self, text: &str) -> io::Result<()> {
        let bytes = encode(text, self.encoding, self.errors)?;
        self.inner.write_all(&bytes)
    }

    /// `text` followed by a newline.
    ///
    /// # Errors
    ///
    /// See [`SafeWriter::write_text`].
    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write_text(text)?;
        self.inner.write_all(b"\n")
    }

    /// # Errors
    ///
    /// Fails when the underlying stream does.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Encode `text`, handling unencodable characters per `errors`.
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidData`] for an unencodable character
/// under [`EncodingErrors::Strict`].
pub fn encode(text: &str, encoding: OutputEncoding, errors: EncodingErrors) -> io::Result<Cow<'_, [u8]>> {
    let limit: u32 = match encoding {
        OutputEncoding::Utf8 => return Ok(Cow::Borrowed(text.as_bytes())),
        OutputEncoding::Ascii => 0x7f,
        OutputEncoding::Latin1 => 0xff,
    };
    if text.is_ascii() {
        return Ok(Cow::Borrowed(text.as_bytes()));
    }

    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(byte) if u32::from(byte) <= limit => bytes.push(byte),
            _ => match errors {
                EncodingErrors::Strict => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("'{}' codec can't encode character {c:?}", encoding.name()),
                    ));
                }
                EncodingErrors::Replace => bytes.push(b'?'),
                EncodingErrors::Ignore => {}
            },
        }
    }
    Ok(Cow::Owned(bytes))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passes_everything() {
        let out = encode("naïve ☃", OutputEncoding::Utf8, EncodingErrors::Strict).unwrap();
        assert_eq!(out.as_ref(), "naïve ☃".as_bytes());
    }

    #[test]
    fn test_ascii_replace_and_ignore() {
        let out = encode("naïve", OutputEncoding::Ascii, EncodingErrors::Replace).unwrap();
        assert_eq!(out.as_ref(), b"na?ve");
        let out = encode("naïve", OutputEncoding::Ascii, EncodingErrors::Ignore).unwrap();
        assert_eq!(out.as_ref(), b"nave");
    }

    #[test]
    fn test_latin1_keeps_high_bytes() {
        let out = encode("naïve ☃", OutputEncoding::Latin1, EncodingErrors::Replace).unwrap();
        assert_eq!(out.as_ref(), b"na\xefve ?");
    }

    #[test]
    fn test_strict_fails() {
        let err = encode("☃", OutputEncoding::Ascii, EncodingErrors::Strict).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("'ascii' codec"));
    }

    #[test]
    fn test_write_line() {
        let mut buf = Vec::new();
        let mut writer = SafeWriter::new(&mut buf, OutputEncoding::Ascii, EncodingErrors::Replace);
        writer.write_line("é").unwrap();
        assert_eq!(buf, b"?\n");
    }
}
