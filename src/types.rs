// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::io;

/// Kind of metric being emitted, determining the type suffix of the payload.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MetricKind {
    Counter,
    Timing,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricKind::Counter => "c".fmt(f),
            MetricKind::Timing => "ms".fmt(f),
        }
    }
}

/// Holder for the value of a metric that knows how to display itself
///
/// Values are rendered using their natural string form, e.g. `-50.0` as a
/// float is rendered as `-50` and `0.25` as `0.25`.
///
/// The `Formatted` variant carries a value that the caller has already turned
/// into a string. Counters with a formatted value that contains the timing
/// suffix `|ms` are treated as a complete timing payload and are not given a
/// counter suffix.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Formatted(String),
}

impl MetricValue {
    /// False for NaN and infinite floats, which cannot be sent.
    pub(crate) fn is_finite(&self) -> bool {
        match *self {
            MetricValue::Float(v) => v.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Unsigned(v) => v.fmt(f),
            MetricValue::Float(v) => v.fmt(f),
            MetricValue::Formatted(ref v) => v.fmt(f),
        }
    }
}

/// A namespaced metric name and its protocol formatted value.
///
/// Written to a collector as `<key>:<payload>`, for example
/// `api.request.latency:42|ms` or `jobs.done:1|c|@0.5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    key: String,
    payload: String,
}

impl EncodedMessage {
    pub fn new<K, P>(key: K, payload: P) -> Self
    where
        K: Into<String>,
        P: Into<String>,
    {
        EncodedMessage {
            key: key.into(),
            payload: payload.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub(crate) fn append_to_payload(&mut self, suffix: &str) {
        self.payload.push_str(suffix);
    }
}

impl fmt::Display for EncodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.payload)
    }
}

/// Messages produced by a single counter or timing operation.
///
/// The messages are those selected for sending, after sampling. When sampling
/// decided not to send anything (or the client is disabled) there are no
/// messages. A message being present does not mean it was written: if the
/// connection could not be established, or a write failed and aborted the
/// rest of the operation, the error goes to the error handler of the client
/// and the messages are still listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emitted {
    messages: Vec<EncodedMessage>,
}

impl Emitted {
    pub(crate) fn new(messages: Vec<EncodedMessage>) -> Self {
        Emitted { messages }
    }

    pub(crate) fn nothing() -> Self {
        Emitted::default()
    }

    /// True if at least one message was selected for sending.
    pub fn is_sent(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn messages(&self) -> &[EncodedMessage] {
        &self.messages
    }

    /// Each message in its wire format, `<key>:<payload>`.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.messages.iter().map(|m| m.to_string())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    InvalidInput,
    IoError,
    ConfigMissing,
    ConfigInvalid,
}

/// Error generated by this library potentially wrapping another
/// type of error (exposed via the `Error` trait).
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    WithDetail(ErrorKind, &'static str, String),
    IoError(io::Error),
    YamlError(serde_yaml::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::IoError(_) => ErrorKind::IoError,
            ErrorRepr::YamlError(_) => ErrorKind::ConfigInvalid,
            ErrorRepr::WithDescription(kind, _) => kind,
            ErrorRepr::WithDetail(kind, _, _) => kind,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::IoError(ref err) => err.fmt(f),
            ErrorRepr::YamlError(ref err) => err.fmt(f),
            ErrorRepr::WithDescription(_, desc) => desc.fmt(f),
            ErrorRepr::WithDetail(_, desc, ref detail) => write!(f, "{}: {}", desc, detail),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(ref err) => Some(err),
            ErrorRepr::YamlError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    fn from(err: io::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(err),
        }
    }
}

impl From<serde_yaml::Error> for MetricError {
    fn from(err: serde_yaml::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::YamlError(err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

impl From<(ErrorKind, &'static str, String)> for MetricError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDetail(kind, desc, detail),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;
