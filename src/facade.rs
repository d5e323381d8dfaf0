// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::client::{Counted, StatsdClient, Timed};
use crate::config::Config;
use crate::encoder::{ToMetricNames, ToTimerValue};
use crate::types::{Emitted, ErrorKind, MetricResult};
use log::{info, warn};
use std::time::Instant;

/// Amount a counter is changed by.
///
/// Whole amounts are scaled and sent as integers so that large values stay
/// exact. Fractional amounts, or whole amounts whose scaled value does not
/// fit an `i64`, are sent as floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Whole(i64),
    Fractional(f64),
}

impl Amount {
    fn as_f64(self) -> f64 {
        match self {
            Amount::Whole(v) => v as f64,
            Amount::Fractional(v) => v,
        }
    }

    /// `self * factor`, negated when `negate` is set.
    fn scale(self, factor: f64, negate: bool) -> Amount {
        if let (Amount::Whole(by), Some(factor)) = (self, whole_factor(factor)) {
            let scaled = by
                .checked_mul(factor)
                .and_then(|v| if negate { v.checked_neg() } else { Some(v) });
            if let Some(v) = scaled {
                return Amount::Whole(v);
            }
        }

        let sign = if negate { -1.0 } else { 1.0 };
        let scaled = sign * self.as_f64() * factor;
        // Avoid sending "-0"
        Amount::Fractional(if scaled == 0.0 { 0.0 } else { scaled })
    }
}

fn whole_factor(factor: f64) -> Option<i64> {
    if factor.fract() == 0.0 && factor >= i64::MIN as f64 && factor < i64::MAX as f64 {
        Some(factor as i64)
    } else {
        None
    }
}

impl From<i64> for Amount {
    fn from(v: i64) -> Self {
        Amount::Whole(v)
    }
}

impl From<i32> for Amount {
    fn from(v: i32) -> Self {
        Amount::Whole(i64::from(v))
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Amount::Fractional(v)
    }
}

/// Amount and sample rate of a counter update made through `Statsd`.
///
/// A bare number converts into options with that amount and a sample rate
/// of one.
///
/// ```
/// use statsd_client::{Amount, CountOptions};
///
/// let opts = CountOptions::by(5).with_sample_rate(0.1);
/// assert_eq!(Amount::Whole(5), opts.by);
/// assert_eq!(CountOptions::by(3), CountOptions::from(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountOptions {
    pub by: Amount,
    pub sample_rate: f64,
}

impl CountOptions {
    pub fn by<V: Into<Amount>>(by: V) -> Self {
        CountOptions {
            by: by.into(),
            ..Self::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

impl Default for CountOptions {
    fn default() -> Self {
        CountOptions {
            by: Amount::Whole(1),
            sample_rate: 1.0,
        }
    }
}

impl From<i64> for CountOptions {
    fn from(by: i64) -> Self {
        Self::by(by)
    }
}

impl From<i32> for CountOptions {
    fn from(by: i32) -> Self {
        Self::by(by)
    }
}

impl From<f64> for CountOptions {
    fn from(by: f64) -> Self {
        Self::by(by)
    }
}

/// Configured entry point for emitting metrics.
///
/// Wraps a `StatsdClient` together with the configured `factor` that scales
/// every counter update. When the configuration disables metrics, every
/// operation is a no-op returning an empty `Emitted` and nothing is sent.
///
/// # Example
///
/// ```
/// use statsd_client::{Config, CountOptions, Statsd};
///
/// let config = Config::from_yaml_str("namespace: api\nfactor: 10\n").unwrap();
/// let statsd = Statsd::new(config);
///
/// statsd.decrement("queue.size", CountOptions::by(5)).unwrap();
/// let rows = statsd.time("db.query", || 42);
/// assert_eq!(42, rows);
/// ```
#[derive(Debug)]
pub enum Statsd {
    Active { client: StatsdClient, factor: f64 },
    Disabled,
}

impl Statsd {
    pub fn new(config: Config) -> Self {
        if config.is_enabled() {
            Self::from_client(config.build_client(), config.factor)
        } else {
            info!("statsd metrics disabled by configuration");
            Statsd::Disabled
        }
    }

    pub fn disabled() -> Self {
        Statsd::Disabled
    }

    pub fn from_client(client: StatsdClient, factor: f64) -> Self {
        Statsd::Active { client, factor }
    }

    /// Build from the discovered configuration file.
    ///
    /// A missing configuration results in a disabled instance. Any other
    /// configuration error is logged and also results in a disabled
    /// instance. Use `Config::discover` directly to treat these as errors.
    pub fn from_environment() -> Self {
        match Config::discover() {
            Ok(config) => Self::new(config),
            Err(e) if e.kind() == ErrorKind::ConfigMissing => {
                info!("statsd metrics disabled: {}", e);
                Statsd::Disabled
            }
            Err(e) => {
                warn!("statsd metrics disabled, invalid configuration: {}", e);
                Statsd::Disabled
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Statsd::Active { .. })
    }

    pub fn client(&self) -> Option<&StatsdClient> {
        match self {
            Statsd::Active { client, .. } => Some(client),
            Statsd::Disabled => None,
        }
    }

    /// Increase the counter(s) by `by * factor`.
    pub fn increment<N, O>(&self, names: &N, opts: O) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
        O: Into<CountOptions>,
    {
        self.count(names, opts.into(), false)
    }

    /// Decrease the counter(s) by `by * factor`.
    pub fn decrement<N, O>(&self, names: &N, opts: O) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
        O: Into<CountOptions>,
    {
        self.count(names, opts.into(), true)
    }

    pub fn inc<N, O>(&self, names: &N, opts: O) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
        O: Into<CountOptions>,
    {
        self.increment(names, opts)
    }

    pub fn dec<N, O>(&self, names: &N, opts: O) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
        O: Into<CountOptions>,
    {
        self.decrement(names, opts)
    }

    /// Record a timing in milliseconds. Timings are not scaled by `factor`.
    pub fn timing<N, T>(&self, names: &N, value: T) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
        T: ToTimerValue,
    {
        match self {
            Statsd::Active { client, .. } => client.timing(names, value),
            Statsd::Disabled => Ok(Emitted::default()),
        }
    }

    /// Run `block`, record how long it took in milliseconds, and return its
    /// result.
    ///
    /// The block is run even when metrics are disabled. Failures to record
    /// the timing are logged, never returned.
    pub fn time<N, F, R>(&self, names: &N, block: F) -> R
    where
        N: ToMetricNames + ?Sized,
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = block();
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        if let Err(e) = self.timing(names, elapsed) {
            warn!("unable to record block timing: {}", e);
        }

        result
    }

    fn count<N>(&self, names: &N, opts: CountOptions, negate: bool) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        match self {
            Statsd::Active { client, factor } => match opts.by.scale(*factor, negate) {
                Amount::Whole(delta) => client.update_stats(names, delta, opts.sample_rate),
                Amount::Fractional(delta) => client.update_stats(names, delta, opts.sample_rate),
            },
            Statsd::Disabled => Ok(Emitted::default()),
        }
    }
}
