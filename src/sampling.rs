// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{EncodedMessage, ErrorKind, MetricError};
use rand::{Rng, RngCore};
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::{Mutex, PoisonError};

/// Probability that a metric is actually sent to the Statsd server.
///
/// A rate of `1` (or more) means "always send" and the metric is sent
/// without any annotation. Lower rates are sent only some of the time, and
/// when they are, every message carries the rate (`|@0.25`) so that the
/// server can scale the value back up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate(f64);

impl SampleRate {
    pub const ALWAYS: SampleRate = SampleRate(1.0);

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_always(&self) -> bool {
        self.0 >= 1.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        SampleRate::ALWAYS
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<f64> for SampleRate {
    type Error = MetricError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        if rate > 0.0 {
            Ok(SampleRate(rate))
        } else {
            // also catches NaN, which fails every comparison
            Err(MetricError::from((ErrorKind::InvalidInput, "Sample rate must be greater than 0.0")))
        }
    }
}

/// Source of the random draw that decides whether a sampled metric is sent.
///
/// Each draw is a uniform value in `[0, 1)`. A single draw is made per
/// operation and applied to every message produced by that operation, so
/// when one value is sent to several names either all of them are sent or
/// none are.
pub struct Sampler {
    source: Box<dyn Fn() -> f64 + Send + Sync + RefUnwindSafe>,
}

impl Sampler {
    /// Create a sampler backed by the thread local random number generator.
    pub fn new() -> Self {
        Self::from_fn(|| rand::thread_rng().gen::<f64>())
    }

    /// Create a sampler backed by the given random number generator.
    ///
    /// Useful for reproducible sampling, e.g. with a seeded generator.
    pub fn from_rng<R>(rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        let rng = Mutex::new(rng);
        Self::from_fn(move || rng.lock().unwrap_or_else(PoisonError::into_inner).gen::<f64>())
    }

    /// Create a sampler that uses the given function for each draw.
    pub fn from_fn<F>(source: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + RefUnwindSafe + 'static,
    {
        Sampler {
            source: Box::new(source),
        }
    }

    /// Decide whether the messages of one operation are sent.
    ///
    /// Returns the messages, annotated with the sample rate if it is below
    /// one, or `None` if the draw suppressed the whole operation.
    pub fn sample(&self, rate: SampleRate, mut messages: Vec<EncodedMessage>) -> Option<Vec<EncodedMessage>> {
        if rate.is_always() {
            return Some(messages);
        }

        let draw = (self.source)();
        if draw <= rate.value() {
            let suffix = format!("|@{}", rate);
            for message in messages.iter_mut() {
                message.append_to_payload(&suffix);
            }
            Some(messages)
        } else {
            None
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Sampler::new()
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sampler {{ source: ... }}")
    }
}
