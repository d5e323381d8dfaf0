// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of statsd-client for easy glob imports
//!
//! # Example
//!
//! ```
//! use statsd_client::prelude::*;
//! use statsd_client::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
//!
//! client.increment("some.counter").unwrap();
//! client.decrement(&["some.counter", "other.counter"]).unwrap();
//! client.update_stats("some.counter", 5, 0.5).unwrap();
//! client.timing("some.timer", 23).unwrap();
//! ```

pub use crate::client::{Counted, CountedExt, MetricClient, Timed};
pub use crate::encoder::{ToCounterValue, ToMetricNames, ToTimerValue};
pub use crate::sinks::{MetricConnection, MetricSink};
