//! What a command returns to be rendered

use crate::value::Value;
use std::fmt;

/// A single-pass, lazily evaluated sequence of output lines.
///
/// Each element is pulled only after the previous one has been written, so a
/// failing element still leaves the earlier lines on the output stream.
pub struct LineStream(Box<dyn Iterator<Item = anyhow::Result<String>>>);

impl LineStream {
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = anyhow::Result<String>>,
        I::IntoIter: 'static,
    {
        LineStream(Box::new(iter.into_iter()))
    }
}

impl Iterator for LineStream {
    type Item = anyhow::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl fmt::Debug for LineStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LineStream(..)")
    }
}

/// The result of a command body.
#[derive(Debug)]
pub enum Output {
    /// Nothing is written.
    Empty,
    /// Written in one piece, embedded newlines included.
    Text(String),
    /// Written one line at a time.
    Lines(LineStream),
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Output::Text(text.into())
    }

    /// Lines from already computed items.
    pub fn lines<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
        I::IntoIter: 'static,
    {
        Output::Lines(LineStream::new(
            items.into_iter().map(|item| Ok(item.to_string())),
        ))
    }

    /// Lines from a fallible generator.
    pub fn stream<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = anyhow::Result<String>>,
        I::IntoIter: 'static,
    {
        Output::Lines(LineStream::new(iter))
    }
}

impl From<()> for Output {
    fn from((): ()) -> Self {
        Output::Empty
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::Text(text)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::Text(text.to_string())
    }
}

impl<T: fmt::Display + 'static> From<Vec<T>> for Output {
    fn from(items: Vec<T>) -> Self {
        Output::lines(items)
    }
}

/// `None` renders nothing, a list one line per element.
impl From<Value> for Output {
    fn from(value: Value) -> Self {
        match value {
            Value::None => Output::Empty,
            Value::List(items) => Output::lines(items),
            other => Output::Text(other.to_string()),
        }
    }
}
