// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::sampling::SampleRate;
use crate::types::{EncodedMessage, ErrorKind, MetricError, MetricKind, MetricResult, MetricValue};
use std::time::Duration;

const TIMING_SUFFIX: &str = "|ms";

/// Conversion trait for one or more metric names
///
/// Every counter and timing operation accepts either a single name or a
/// collection of names. When more than one name is given, the same value is
/// applied to each of them, in order.
///
/// Implemented for `str`, `String` and slices, arrays, and `Vec`s of anything
/// that can be viewed as a `&str`.
pub trait ToMetricNames {
    fn to_metric_names(&self) -> Vec<&str>;
}

impl ToMetricNames for str {
    fn to_metric_names(&self) -> Vec<&str> {
        vec![self]
    }
}

impl ToMetricNames for String {
    fn to_metric_names(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<T: AsRef<str>> ToMetricNames for [T] {
    fn to_metric_names(&self) -> Vec<&str> {
        self.iter().map(|n| n.as_ref()).collect()
    }
}

impl<T: AsRef<str>, const N: usize> ToMetricNames for [T; N] {
    fn to_metric_names(&self) -> Vec<&str> {
        self.iter().map(|n| n.as_ref()).collect()
    }
}

impl<T: AsRef<str>> ToMetricNames for Vec<T> {
    fn to_metric_names(&self) -> Vec<&str> {
        self.iter().map(|n| n.as_ref()).collect()
    }
}

impl<T: ToMetricNames + ?Sized> ToMetricNames for &T {
    fn to_metric_names(&self) -> Vec<&str> {
        (**self).to_metric_names()
    }
}

/// Conversion trait for valid values for counters
///
/// This trait must be implemented for any types that are used as counter
/// deltas (currently `i64`, `i32`, `u64`, `f64`, and pre-formatted strings).
/// It is internal to how values are formatted but exposed publicly for
/// documentation purposes.
pub trait ToCounterValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToCounterValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

impl ToCounterValue for i32 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(i64::from(self)))
    }
}

impl ToCounterValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToCounterValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        finite(MetricValue::Float(self))
    }
}

impl ToCounterValue for &str {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Formatted(self.to_string()))
    }
}

impl ToCounterValue for String {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Formatted(self))
    }
}

/// Conversion trait for valid values for timings
///
/// Timings are a number of milliseconds. `Duration` values are converted to
/// whole milliseconds; use an `f64` to report fractional milliseconds.
pub trait ToTimerValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToTimerValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToTimerValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        finite(MetricValue::Float(self))
    }
}

impl ToTimerValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        let as_millis = self.as_millis();
        if as_millis > u64::MAX as u128 {
            Err(MetricError::from((ErrorKind::InvalidInput, "u64 overflow")))
        } else {
            Ok(MetricValue::Unsigned(as_millis as u64))
        }
    }
}

fn finite(value: MetricValue) -> MetricResult<MetricValue> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricError::from((ErrorKind::InvalidInput, "metric value must be finite")))
    }
}

/// A single counter or timing update for one or more metric names.
///
/// Created per call and consumed immediately by `encode`.
#[derive(Debug, Clone)]
pub struct MetricUpdate<'a> {
    names: Vec<&'a str>,
    kind: MetricKind,
    value: MetricValue,
    sample_rate: SampleRate,
}

impl<'a> MetricUpdate<'a> {
    pub fn counter<N>(names: &'a N, value: MetricValue) -> Self
    where
        N: ToMetricNames + ?Sized,
    {
        Self::new(names, MetricKind::Counter, value)
    }

    pub fn timing<N>(names: &'a N, value: MetricValue) -> Self
    where
        N: ToMetricNames + ?Sized,
    {
        Self::new(names, MetricKind::Timing, value)
    }

    fn new<N>(names: &'a N, kind: MetricKind, value: MetricValue) -> Self
    where
        N: ToMetricNames + ?Sized,
    {
        MetricUpdate {
            names: names.to_metric_names(),
            kind,
            value,
            sample_rate: SampleRate::ALWAYS,
        }
    }

    pub fn with_sample_rate(mut self, rate: SampleRate) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn names(&self) -> &[&'a str] {
        &self.names
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn value(&self) -> &MetricValue {
        &self.value
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

/// Prefix a metric name with `<namespace>.` unless the namespace is empty.
pub fn namespaced(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        let mut key = String::with_capacity(namespace.len() + 1 + name.len());
        key.push_str(namespace);
        key.push('.');
        key.push_str(name);
        key
    }
}

/// Render the payload (value and type) of a metric without its name.
///
/// A counter whose value is a pre-formatted string already containing the
/// timing suffix is passed through unchanged. This lets a single counter
/// update carry timings, but it relies on sniffing the string: prefer
/// `MetricUpdate::timing` which carries the kind explicitly.
pub fn payload(kind: MetricKind, value: &MetricValue) -> String {
    match (kind, value) {
        (MetricKind::Counter, MetricValue::Formatted(v)) if v.contains(TIMING_SUFFIX) => v.clone(),
        _ => format!("{}|{}", value, kind),
    }
}

/// Turn an update into one message per name, preserving the order of names.
///
/// Sample rates are not applied here since whether (and how) a message is
/// annotated depends on the sampling decision made for the whole update.
pub fn encode(namespace: &str, update: &MetricUpdate<'_>) -> Vec<EncodedMessage> {
    let rendered = payload(update.kind, &update.value);
    update
        .names
        .iter()
        .map(|name| EncodedMessage::new(namespaced(namespace, name), rendered.as_str()))
        .collect()
}
