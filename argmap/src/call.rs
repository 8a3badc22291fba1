//! Arguments bound for one command invocation

use crate::value::Value;
use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;

/// The bound call: positional values in signature order (variadic values
/// after the named slots) and keyword values by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
    names: Vec<String>,
}

impl CallArgs {
    /// `names` labels the leading positional slots.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self {
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            names,
        }
    }

    pub fn push(&mut self, value: Value) {
        self.args.push(value);
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = Value>) {
        self.args.extend(values);
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.kwargs.insert(name.into(), value);
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    #[must_use]
    pub fn kwargs(&self) -> &BTreeMap<String, Value> {
        &self.kwargs
    }

    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Values collected by a variadic positional parameter.
    #[must_use]
    pub fn rest(&self) -> &[Value] {
        self.args.get(self.names.len()..).unwrap_or_default()
    }

    /// Look a parameter up by name, in either the positional or keyword part.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.kwargs.get(name) {
            return Some(value);
        }
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.args.get(i))
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .with_context(|| format!("no argument named `{name}`"))
    }

    /// # Errors
    ///
    /// Fails when the argument is missing or not a string.
    pub fn str(&self, name: &str) -> Result<&str> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| anyhow!("argument `{name}` is {}, not str", value.type_name()))
    }

    /// A string argument that may be `None`.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or neither none nor a string.
    pub fn opt_str(&self, name: &str) -> Result<Option<&str>> {
        match self.require(name)? {
            Value::None => Ok(None),
            Value::Str(s) => Ok(Some(s)),
            other => Err(anyhow!("argument `{name}` is {}, not str", other.type_name())),
        }
    }

    /// # Errors
    ///
    /// Fails when the argument is missing or not an int.
    pub fn int(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value
            .as_int()
            .ok_or_else(|| anyhow!("argument `{name}` is {}, not int", value.type_name()))
    }

    /// # Errors
    ///
    /// Fails when the argument is missing or not numeric.
    pub fn float(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        value
            .as_float()
            .ok_or_else(|| anyhow!("argument `{name}` is {}, not float", value.type_name()))
    }

    /// # Errors
    ///
    /// Fails when the argument is missing or not a bool.
    pub fn bool(&self, name: &str) -> Result<bool> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| anyhow!("argument `{name}` is {}, not bool", value.type_name()))
    }

    /// # Errors
    ///
    /// Fails when the argument is missing or not a list.
    pub fn list(&self, name: &str) -> Result<&[Value]> {
        let value = self.require(name)?;
        value
            .as_list()
            .ok_or_else(|| anyhow!("argument `{name}` is {}, not list", value.type_name()))
    }
}
