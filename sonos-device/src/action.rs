//! Remote actions: the unit of control-plane communication with a device.
//!
//! An [`Action`] is a service, an action name and an ordered parameter bag
//! keyed by the exact remote argument names. An [`ActionResponse`] holds the
//! output arguments the device answered with, untransformed.

use std::fmt;

use crate::service::Service;

/// A single parameter value in an action's parameter bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Unsigned(u32),
    Signed(i32),
    Bool(bool),
    Text(String),
}

impl fmt::Display for ParamValue {
    /// Wire representation; UPnP booleans travel as `1`/`0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Unsigned(v) => write!(f, "{}", v),
            ParamValue::Signed(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<u8> for ParamValue {
    fn from(value: u8) -> Self {
        ParamValue::Unsigned(value.into())
    }
}

impl From<u16> for ParamValue {
    fn from(value: u16) -> Self {
        ParamValue::Unsigned(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Unsigned(value)
    }
}

impl From<i8> for ParamValue {
    fn from(value: i8) -> Self {
        ParamValue::Signed(value.into())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Signed(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Ordered, flat parameter bag keyed by remote argument name
///
/// Order is preserved because some devices reject arguments that arrive out
/// of the order declared in the service description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionParams {
    entries: Vec<(&'static str, ParamValue)>,
}

impl ActionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, replacing the value if the name is already present
    pub fn push(&mut self, name: &'static str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, name: &'static str, value: impl Into<ParamValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    /// Encode as SOAP argument elements in insertion order
    pub fn to_payload(&self) -> String {
        let rendered: Vec<(&str, String)> = self
            .entries
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        soap_client::encode_arguments(rendered.iter().map(|(n, v)| (*n, v.as_str())))
    }
}

/// A named remote action ready to be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub service: Service,
    pub name: &'static str,
    pub params: ActionParams,
}

impl Action {
    pub fn new(service: Service, name: &'static str, params: ActionParams) -> Self {
        Self {
            service,
            name,
            params,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.service, self.name)
    }
}

/// Output arguments returned by the device for an action, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResponse {
    values: Vec<(String, String)>,
}

impl ActionResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value of an output argument
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Output argument parsed into `T`, `None` when missing or unparsable
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<Vec<(String, String)>> for ActionResponse {
    fn from(values: Vec<(String, String)>) -> Self {
        Self { values }
    }
}
