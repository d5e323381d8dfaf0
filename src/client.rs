// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::encoder::{encode, MetricUpdate, ToCounterValue, ToMetricNames, ToTimerValue};
use crate::sampling::{SampleRate, Sampler};
use crate::sinks::{MetricSink, SinkStats, TcpMetricSink, UdpMetricSink};
use crate::types::{EncodedMessage, Emitted, MetricError, MetricResult};
use log::{debug, warn};
use std::fmt;
use std::panic::RefUnwindSafe;
use std::time::Duration;

/// Trait for incrementing and decrementing counters.
///
/// Counters are simple values incremented or decremented by a client. The
/// rates at which these events occur or average values will be determined
/// by the server receiving them. Examples of counter uses include number
/// of logins to a system or requests received.
///
/// The following types are valid for counters:
/// * `i64`
/// * `i32`
/// * `u64`
/// * `f64`
/// * `&str` and `String` (pre-formatted values)
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Counted<T>
where
    T: ToCounterValue,
{
    /// Update one or more counters by an arbitrary amount, sending it only
    /// `sample_rate` of the time.
    fn update_stats<N>(&self, names: &N, delta: T, sample_rate: f64) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized;
}

/// Trait for convenience methods for counters
///
/// This trait specifically implements increment and decrement convenience
/// methods for counters with `i64` types.
pub trait CountedExt: Counted<i64> {
    /// Increment the counter(s) by 1
    fn increment<N>(&self, names: &N) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        self.increment_with_rate(names, 1.0)
    }

    /// Increment the counter(s) by 1, sending it only `sample_rate` of the time
    fn increment_with_rate<N>(&self, names: &N, sample_rate: f64) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        self.update_stats(names, 1i64, sample_rate)
    }

    /// Decrement the counter(s) by 1
    fn decrement<N>(&self, names: &N) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        self.decrement_with_rate(names, 1.0)
    }

    /// Decrement the counter(s) by 1, sending it only `sample_rate` of the time
    fn decrement_with_rate<N>(&self, names: &N, sample_rate: f64) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        self.update_stats(names, -1i64, sample_rate)
    }
}

/// Trait for recording timings in milliseconds.
///
/// Timings are a positive number of milliseconds between a start and end
/// time. Examples include time taken to render a web page or time taken
/// for a database call to return.
///
/// The following types are valid for timings:
/// * `u64`
/// * `f64`
/// * `Duration`
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Timed<T>
where
    T: ToTimerValue,
{
    /// Record a timing in milliseconds for one or more names
    fn timing<N>(&self, names: &N, time: T) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        self.timing_with_rate(names, time, 1.0)
    }

    /// Record a timing in milliseconds for one or more names, sending it
    /// only `sample_rate` of the time
    fn timing_with_rate<N>(&self, names: &N, time: T, sample_rate: f64) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized;
}

/// Trait that encompasses all other traits for sending metrics.
///
/// Useful as a bound for code that is generic over the client used to
/// send metrics.
///
/// ```
/// use statsd_client::prelude::*;
/// use statsd_client::{StatsdClient, NopMetricSink};
///
/// fn record_login<C: MetricClient>(metrics: &C) {
///     metrics.increment("logins").unwrap();
///     metrics.timing("login.time", 42).unwrap();
/// }
///
/// record_login(&StatsdClient::from_sink("prefix", NopMetricSink));
/// ```
pub trait MetricClient:
    Counted<i64> + Counted<f64> + CountedExt + Timed<u64> + Timed<f64> + Timed<Duration>
{
}

/// Builder for creating and customizing `StatsdClient` instances.
///
/// Instances of the builder should be created by calling the `::builder()`
/// method on the `StatsClient` struct.
///
/// # Example
///
/// ```
/// use statsd_client::prelude::*;
/// use statsd_client::{MetricError, StatsdClient, NopMetricSink};
///
/// fn my_error_handler(err: MetricError) {
///     println!("Metric error! {}", err);
/// }
///
/// let client = StatsdClient::builder("prefix", NopMetricSink)
///     .with_error_handler(my_error_handler)
///     .build();
///
/// client.increment("something").unwrap();
/// ```
pub struct StatsdClientBuilder {
    namespace: String,
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    sampler: Sampler,
}

impl StatsdClientBuilder {
    // Set the required fields and defaults for optional fields
    fn new<T>(namespace: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder {
            // required
            namespace: namespace.to_string(),
            sink: Box::new(sink),

            // optional with defaults
            errors: Box::new(log_error_handler),
            sampler: Sampler::new(),
        }
    }

    /// Set an error handler to use for errors encountered while sending
    ///
    /// The error handler is invoked when metrics cannot be written to the
    /// sink, for example because a connection could not be established. The
    /// error is never returned to the caller that emitted the metric.
    ///
    /// The error handler should consume the error without panicking. The
    /// default handler logs the error at `warn` level.
    pub fn with_error_handler<F>(mut self, errors: F) -> Self
    where
        F: Fn(MetricError) + Sync + Send + RefUnwindSafe + 'static,
    {
        self.errors = Box::new(errors);
        self
    }

    /// Set the sampler used to decide whether metrics with a sample rate
    /// below one are sent.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Construct a new `StatsdClient` instance based on current settings.
    pub fn build(self) -> StatsdClient {
        StatsdClient::from_builder(self)
    }
}

/// Client for Statsd that implements various traits to record metrics.
///
/// # Traits
///
/// * `Counted` for emitting counters.
/// * `CountedExt` for incrementing and decrementing counters.
/// * `Timed` for emitting timings.
/// * `MetricClient` for a combination of all of the above.
///
/// # Sending
///
/// Each operation encodes its metrics, makes a single sampling decision for
/// all of them, and then acquires a connection from the `MetricSink`, writes
/// each metric to it, and releases it. Nothing is buffered between
/// operations and nothing is retried.
///
/// Errors writing to the sink are handed to the error handler of the client
/// and are never returned: emitting metrics must not break the application
/// emitting them. The only errors returned are for invalid input, such as a
/// sample rate that is not above zero, detected before anything is sent.
///
/// # Threading
///
/// The client holds no connection between operations and can be shared
/// between threads (i.e. it is `Send` and `Sync`), typically wrapped in an
/// `Arc`.
pub struct StatsdClient {
    namespace: String,
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    sampler: Sampler,
}

impl StatsdClient {
    /// Create a new client instance that will use the given namespace for
    /// all metrics emitted to the given `MetricSink` implementation.
    ///
    /// # No-op Example
    ///
    /// ```
    /// use statsd_client::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink("my.stats", NopMetricSink);
    /// ```
    pub fn from_sink<T>(namespace: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::builder(namespace, sink).build()
    }

    /// Create a new builder with the provided namespace and metric sink.
    ///
    /// An empty namespace means metric names are sent as given, without
    /// any prefix.
    pub fn builder<T>(namespace: &str, sink: T) -> StatsdClientBuilder
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder::new(namespace, sink)
    }

    /// Create a new client that sends metrics over UDP to the given host.
    ///
    /// ```
    /// use statsd_client::prelude::*;
    /// use statsd_client::{StatsdClient, DEFAULT_HOST, DEFAULT_PORT};
    ///
    /// let client = StatsdClient::from_udp_host("my.stats", DEFAULT_HOST, DEFAULT_PORT);
    /// client.increment("jobs.done").unwrap();
    /// ```
    pub fn from_udp_host(namespace: &str, host: &str, port: u16) -> Self {
        Self::from_sink(namespace, UdpMetricSink::new(host, port))
    }

    /// Create a new client that sends metrics over TCP to the given host.
    pub fn from_tcp_host(namespace: &str, host: &str, port: u16) -> Self {
        Self::from_sink(namespace, TcpMetricSink::new(host, port))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Return I/O telemetry of the underlying sink.
    pub fn sink_stats(&self) -> SinkStats {
        self.sink.stats()
    }

    /// Encode, sample, and send a single update.
    ///
    /// No connection is acquired when there is nothing to send.
    pub fn send_update(&self, update: MetricUpdate<'_>) -> Emitted {
        let messages = encode(&self.namespace, &update);
        if messages.is_empty() {
            return Emitted::nothing();
        }

        let messages = match self.sampler.sample(update.sample_rate(), messages) {
            Some(sampled) => sampled,
            None => return Emitted::nothing(),
        };

        if let Err(e) = self.deliver(&messages) {
            (self.errors)(e);
        }

        Emitted::new(messages)
    }

    // The connection is released when it goes out of scope, on every path
    fn deliver(&self, messages: &[EncodedMessage]) -> MetricResult<()> {
        let mut conn = self.sink.connect()?;
        for message in messages {
            let line = message.to_string();
            conn.write_metric(&line)?;
            debug!("sent metric {}", line);
        }

        Ok(())
    }

    // Create a new StatsdClient by consuming the builder
    fn from_builder(builder: StatsdClientBuilder) -> Self {
        StatsdClient {
            namespace: builder.namespace,
            sink: builder.sink,
            errors: builder.errors,
            sampler: builder.sampler,
        }
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdClient {{ namespace: {:?}, sink: ..., errors: ..., sampler: ... }}",
            self.namespace,
        )
    }
}

impl<T> Counted<T> for StatsdClient
where
    T: ToCounterValue,
{
    fn update_stats<N>(&self, names: &N, delta: T, sample_rate: f64) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        let rate = SampleRate::try_from(sample_rate)?;
        let update = MetricUpdate::counter(names, delta.try_to_value()?).with_sample_rate(rate);
        Ok(self.send_update(update))
    }
}

impl CountedExt for StatsdClient {}

impl<T> Timed<T> for StatsdClient
where
    T: ToTimerValue,
{
    fn timing_with_rate<N>(&self, names: &N, time: T, sample_rate: f64) -> MetricResult<Emitted>
    where
        N: ToMetricNames + ?Sized,
    {
        let rate = SampleRate::try_from(sample_rate)?;
        let update = MetricUpdate::timing(names, time.try_to_value()?).with_sample_rate(rate);
        Ok(self.send_update(update))
    }
}

impl MetricClient for StatsdClient {}

fn log_error_handler(err: MetricError) {
    warn!("unable to send metrics: {}", err);
}

#[cfg(test)]
mod tests {
    use super::{Counted, CountedExt, StatsdClient, Timed};
    use crate::sampling::Sampler;
    use crate::sinks::{NopMetricSink, SpyMetricSink};
    use crate::types::{ErrorKind, MetricError};
    use crossbeam_channel::Receiver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn received(rx: &Receiver<Vec<u8>>) -> Vec<String> {
        rx.try_iter().map(|v| String::from_utf8(v).unwrap()).collect()
    }

    fn counting_handler(count: &Arc<AtomicUsize>) -> impl Fn(MetricError) + Send + Sync + 'static {
        let count = count.clone();
        move |_e| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_statsd_client_empty_namespace() {
        let client = StatsdClient::from_sink("", NopMetricSink);
        let res = client.increment("some.counter").unwrap();

        assert_eq!(vec!["some.counter:1|c"], res.lines().collect::<Vec<_>>());
    }

    #[test]
    fn test_statsd_client_namespace() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("api", sink);
        client.timing("request.latency", 42).unwrap();

        assert_eq!(vec!["api.request.latency:42|ms"], received(&rx));
    }

    #[test]
    fn test_statsd_client_increment_decrement() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("", sink);
        client.increment("jobs.done").unwrap();
        client.decrement("jobs.pending").unwrap();

        assert_eq!(vec!["jobs.done:1|c", "jobs.pending:-1|c"], received(&rx));
    }

    #[test]
    fn test_statsd_client_update_stats_fan_out() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("app", sink);
        let res = client.update_stats(&["a", "b", "c"], 12, 1.0).unwrap();

        assert_eq!(3, res.messages().len());
        assert_eq!(vec!["app.a:12|c", "app.b:12|c", "app.c:12|c"], received(&rx));

        // one connection for the whole operation
        assert_eq!(1, client.sink_stats().connections_opened);
        assert_eq!(1, client.sink_stats().connections_closed);
    }

    #[test]
    fn test_statsd_client_update_stats_float_delta() {
        let client = StatsdClient::from_sink("", NopMetricSink);
        let res = client.update_stats("bytes", 2.5, 1.0).unwrap();

        assert_eq!("2.5|c", res.messages()[0].payload());
    }

    #[test]
    fn test_statsd_client_update_stats_formatted_timing_not_counter() {
        let client = StatsdClient::from_sink("", NopMetricSink);
        let res = client.update_stats("render", "320|ms", 1.0).unwrap();

        assert_eq!("render:320|ms", res.messages()[0].to_string());
    }

    #[test]
    fn test_statsd_client_timing_duration() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client.timing("key", Duration::from_millis(157)).unwrap();

        assert_eq!("prefix.key:157|ms", res.messages()[0].to_string());
    }

    #[test]
    fn test_statsd_client_timing_duration_with_overflow() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client.timing("key", Duration::from_secs(u64::MAX));

        assert_eq!(ErrorKind::InvalidInput, res.unwrap_err().kind())
    }

    #[test]
    fn test_statsd_client_invalid_sample_rate_sends_nothing() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("", sink);
        let res = client.increment_with_rate("some.counter", 0.0);

        assert_eq!(ErrorKind::InvalidInput, res.unwrap_err().kind());
        assert!(received(&rx).is_empty());
        assert_eq!(0, client.sink_stats().connections_opened);
    }

    #[test]
    fn test_statsd_client_sampled_in_is_annotated() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("", sink)
            .with_sampler(Sampler::from_fn(|| 0.1))
            .build();
        client.timing_with_rate(&["a", "b"], 5, 0.5).unwrap();

        assert_eq!(vec!["a:5|ms|@0.5", "b:5|ms|@0.5"], received(&rx));
    }

    #[test]
    fn test_statsd_client_sampled_out_sends_nothing() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("", sink)
            .with_sampler(Sampler::from_fn(|| 0.9))
            .build();
        let res = client.decrement_with_rate(&["a", "b"], 0.5).unwrap();

        assert!(!res.is_sent());
        assert!(received(&rx).is_empty());
        assert_eq!(0, client.sink_stats().connections_opened);
    }

    #[test]
    fn test_statsd_client_no_names_sends_nothing() {
        let client = StatsdClient::from_sink("", NopMetricSink);
        let names: Vec<&str> = Vec::new();

        assert!(!client.increment(&names).unwrap().is_sent());
    }

    #[test]
    fn test_statsd_client_transport_error_is_not_returned() {
        let errors = Arc::new(AtomicUsize::new(0));
        let (rx, sink) = SpyMetricSink::new();
        drop(rx);

        let client = StatsdClient::builder("", sink)
            .with_error_handler(counting_handler(&errors))
            .build();
        let res = client.increment("some.counter");

        assert!(res.is_ok());
        assert_eq!(1, errors.load(Ordering::SeqCst));
        assert_eq!(1, client.sink_stats().connections_closed);
    }

    #[test]
    fn test_statsd_client_emitted_lists_selected_not_written() {
        let errors = Arc::new(AtomicUsize::new(0));
        let (rx, sink) = SpyMetricSink::new();
        drop(rx);

        let client = StatsdClient::builder("", sink)
            .with_error_handler(counting_handler(&errors))
            .build();
        let res = client.increment(&["a", "b"]).unwrap();

        // Selected for sending even though the first write failed
        assert!(res.is_sent());
        assert_eq!(vec!["a:1|c", "b:1|c"], res.lines().collect::<Vec<_>>());

        let stats = client.sink_stats();
        assert_eq!(0, stats.packets_sent);
        assert_eq!(1, stats.packets_dropped);
        assert_eq!(1, errors.load(Ordering::SeqCst));
    }

    #[test]
    fn test_statsd_client_partial_fan_out_on_error() {
        let errors = Arc::new(AtomicUsize::new(0));
        let (rx, sink) = SpyMetricSink::with_capacity(1);
        let client = StatsdClient::builder("", sink)
            .with_error_handler(counting_handler(&errors))
            .build();
        client.increment(&["first", "second", "third"]).unwrap();

        assert_eq!(vec!["first:1|c"], received(&rx));
        assert_eq!(1, errors.load(Ordering::SeqCst));

        let stats = client.sink_stats();
        assert_eq!(1, stats.connections_opened);
        assert_eq!(1, stats.connections_closed);
        assert_eq!(1, stats.packets_dropped);
    }

    #[test]
    fn test_statsd_client_debug() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        assert!(format!("{:?}", client).contains("\"prefix\""));
    }
}
