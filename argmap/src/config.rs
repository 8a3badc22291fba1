//! Dispatch options and their discovery from the environment.

use std::env;

/// Character set the output streams can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl OutputEncoding {
    /// Guess from a locale string such as `en_US.UTF-8` or `C`.
    #[must_use]
    pub fn from_locale(locale: &str) -> Self {
        let lower = locale.to_ascii_lowercase();
        let codeset = lower.split('.').nth(1).map(|c| c.split('@').next().unwrap_or(c));

        match codeset {
            Some("utf-8" | "utf8") => OutputEncoding::Utf8,
            Some("iso-8859-1" | "iso8859-1" | "latin1" | "latin-1") => OutputEncoding::Latin1,
            Some("ascii" | "us-ascii" | "ansi_x3.4-1968") => OutputEncoding::Ascii,
            Some(_) => OutputEncoding::Utf8,
            None if lower == "c" || lower == "posix" => OutputEncoding::Ascii,
            None => OutputEncoding::Utf8,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OutputEncoding::Utf8 => "utf-8",
            OutputEncoding::Ascii => "ascii",
            OutputEncoding::Latin1 => "latin-1",
        }
    }
}

/// What to do with characters the output encoding cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingErrors {
    /// Fail the write.
    Strict,
    /// Write `?` instead.
    #[default]
    Replace,
    /// Drop the character.
    Ignore,
}

impl EncodingErrors {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(EncodingErrors::Strict),
            "replace" => Some(EncodingErrors::Replace),
            "ignore" => Some(EncodingErrors::Ignore),
            _ => None,
        }
    }
}

/// Options that shape one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    pub raw_output: bool,
    pub always_flush: bool,
    pub encoding: OutputEncoding,
    pub encoding_errors: EncodingErrors,
    pub skip_unknown_args: bool,
}

impl DispatchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from `ARGMAP_ALWAYS_FLUSH`, `ARGMAP_ENCODING_ERRORS` and the
    /// locale variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`DispatchOptions::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let always_flush = lookup("ARGMAP_ALWAYS_FLUSH")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"));
        let encoding_errors = lookup("ARGMAP_ENCODING_ERRORS")
            .and_then(|v| EncodingErrors::parse(&v))
            .unwrap_or_default();
        let encoding = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.is_empty()))
            .map(|locale| OutputEncoding::from_locale(&locale))
            .unwrap_or_default();

        Self {
            always_flush,
            encoding,
            encoding_errors,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn raw_output(mut self, raw: bool) -> Self {
        self.raw_output = raw;
        self
    }

    #[must_use]
    pub fn always_flush(mut self, flush: bool) -> Self {
        self.always_flush = flush;
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn encoding_errors(mut self, errors: EncodingErrors) -> Self {
        self.encoding_errors = errors;
        self
    }

    #[must_use]
    pub fn skip_unknown_args(mut self, skip: bool) -> Self {
        self.skip_unknown_args = skip;
        self
    }
}
