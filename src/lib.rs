// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small, blocking Statsd client for Rust!
//!
//! statsd-client emits counters and timings to a Statsd server over UDP or
//! TCP, with optional sampling, a namespace prefix for every metric name,
//! and YAML based configuration.
//!
//! ## Features
//!
//! * Counters and timings for one or many metric names in a single call.
//! * Client side sampling with the sample rate annotated on the wire.
//! * UDP (default) or TCP transports, with a fresh socket for every send.
//! * Configuration from `~/.statsd-client.yml` or `/etc/statsd-client.yml`.
//! * A process-wide default instance for applications that want one.
//!
//! ## Install
//!
//! To make use of `statsd-client` in your project, add it as a dependency in
//! your `Cargo.toml` file.
//!
//! ```toml
//! [dependencies]
//! statsd-client = "x.y.z"
//! ```
//!
//! ## Usage
//!
//! ### Simple Use
//!
//! Create a client that will write to some imaginary metrics server and send
//! a few metrics.
//!
//! ```rust,no_run
//! use statsd_client::prelude::*;
//! use statsd_client::{StatsdClient, DEFAULT_PORT};
//!
//! let client = StatsdClient::from_udp_host("my.metrics", "metrics.example.com", DEFAULT_PORT);
//!
//! client.increment("jobs.done").unwrap();
//! client.update_stats(&["queue.size", "queue.total"], -5, 1.0).unwrap();
//! client.timing("request.latency", 42).unwrap();
//! ```
//!
//! ### Sampling
//!
//! Every operation takes an optional sample rate. With a rate below one, a
//! single random draw decides whether all metrics of the operation are sent
//! (annotated with `|@<rate>`) or none of them.
//!
//! ```rust,no_run
//! use statsd_client::prelude::*;
//! use statsd_client::{StatsdClient, DEFAULT_PORT};
//!
//! let client = StatsdClient::from_udp_host("", "localhost", DEFAULT_PORT);
//! client.increment_with_rate(&["hits", "hits.total"], 0.1).unwrap();
//! ```
//!
//! ### Configured Use
//!
//! The `Statsd` facade is built from a `Config`, usually discovered from a
//! YAML file, and scales counter updates by the configured `factor`.
//!
//! ```rust,no_run
//! use statsd_client::{CountOptions, Statsd};
//!
//! let statsd = Statsd::from_environment();
//! statsd.increment("jobs.done", CountOptions::default()).unwrap();
//! statsd.decrement("queue.size", CountOptions::by(5)).unwrap();
//!
//! let rows = statsd.time("db.query", || 42);
//! ```
//!
//! ### Error Handling
//!
//! Sending metrics is fire-and-forget. Problems connecting to or writing to
//! the server are passed to the error handler of the client, which logs them
//! using the `log` crate by default, and are never returned to the caller.
//! Only invalid input (like a sample rate that is not above zero) results
//! in an `Err`.
//!
//! ```
//! use statsd_client::prelude::*;
//! use statsd_client::{MetricError, StatsdClient, NopMetricSink};
//!
//! fn my_error_handler(err: MetricError) {
//!     eprintln!("Error sending metrics: {}", err);
//! }
//!
//! let client = StatsdClient::builder("my.prefix", NopMetricSink)
//!     .with_error_handler(my_error_handler)
//!     .build();
//!
//! assert!(client.increment_with_rate("some.counter", 0.0).is_err());
//! ```
//!
//! ### Custom Metric Sinks
//!
//! The sink used by a client is anything implementing `MetricSink`. The
//! `SpyMetricSink` is useful for tests since it hands every metric written
//! to a channel.
//!
//! ```
//! use statsd_client::prelude::*;
//! use statsd_client::{StatsdClient, SpyMetricSink};
//!
//! let (rx, sink) = SpyMetricSink::new();
//! let client = StatsdClient::from_sink("api", sink);
//! client.timing("request.latency", 42).unwrap();
//!
//! assert_eq!(b"api.request.latency:42|ms".to_vec(), rx.recv().unwrap());
//! ```

#![forbid(unsafe_code)]

pub const DEFAULT_PORT: u16 = 8125;
pub const DEFAULT_HOST: &str = "localhost";

pub use self::client::{Counted, CountedExt, MetricClient, StatsdClient, StatsdClientBuilder, Timed};

pub use self::config::Config;

pub use self::encoder::{encode, MetricUpdate, ToCounterValue, ToMetricNames, ToTimerValue};

pub use self::facade::{Amount, CountOptions, Statsd};

pub use self::sampling::{SampleRate, Sampler};

pub use self::sinks::{
    MetricConnection, MetricSink, NopMetricSink, SinkStats, SpyMetricSink, TcpMetricSink, UdpMetricSink,
};

pub use self::types::{EncodedMessage, Emitted, ErrorKind, MetricError, MetricKind, MetricResult, MetricValue};

mod client;
mod config;
mod encoder;
mod facade;
pub mod global;
pub mod prelude;
mod sampling;
mod sinks;
mod types;
