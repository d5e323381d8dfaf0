// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub connections_opened: u64,
    pub connections_closed: u64,
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub bytes_dropped: u64,
    pub packets_dropped: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SocketStats {
    connections_opened: Arc<AtomicU64>,
    connections_closed: Arc<AtomicU64>,
    bytes_sent: Arc<AtomicU64>,
    packets_sent: Arc<AtomicU64>,
    bytes_dropped: Arc<AtomicU64>,
    packets_dropped: Arc<AtomicU64>,
}

impl SocketStats {
    pub fn incr_connections_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_connections_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_bytes_sent(&self, n: u64) {
        self.bytes_sent.fetch_add(n, Ordering::Relaxed);
    }

    pub fn incr_packets_sent(&self) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_bytes_dropped(&self, n: u64) {
        self.bytes_dropped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn incr_packets_dropped(&self) {
        self.packets_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update(&self, res: io::Result<usize>, len: usize) -> io::Result<usize> {
        match res {
            Ok(written) => {
                self.incr_bytes_sent(written as u64);
                self.incr_packets_sent();
                Ok(written)
            }
            Err(e) => {
                self.incr_bytes_dropped(len as u64);
                self.incr_packets_dropped();
                Err(e)
            }
        }
    }
}

impl From<&SocketStats> for SinkStats {
    fn from(stats: &SocketStats) -> Self {
        SinkStats {
            connections_opened: stats.connections_opened.load(Ordering::Relaxed),
            connections_closed: stats.connections_closed.load(Ordering::Relaxed),
            bytes_sent: stats.bytes_sent.load(Ordering::Relaxed),
            packets_sent: stats.packets_sent.load(Ordering::Relaxed),
            bytes_dropped: stats.bytes_dropped.load(Ordering::Relaxed),
            packets_dropped: stats.packets_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Resolve anything implementing `ToSocketAddrs` to a single address,
/// preferring IPv4 addresses when a host resolves to both families.
pub(crate) fn get_addr<A: ToSocketAddrs>(addr: A) -> io::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "No socket addresses yielded"))
}

/// A connection (or connectionless socket) acquired for a single send.
///
/// Each call to `write_metric` writes exactly one metric in a single
/// datagram or write call. The connection is released when it is dropped.
pub trait MetricConnection {
    /// Write a single metric, returning the number of bytes written or
    /// an I/O error.
    fn write_metric(&mut self, metric: &str) -> io::Result<usize>;
}

/// Trait for various backends that send Statsd metrics somewhere.
///
/// A sink knows where metrics go and how to get a connection there. The
/// client acquires a fresh connection for every send operation, writes each
/// metric of that operation to it, and drops it before returning. Sinks do
/// not pool or reuse connections.
///
/// The metric strings written will be in the canonical format to be sent to
/// a Statsd server and will not include a trailing newline.
///
/// ## Counter
///
/// ``` text
/// some.counter:123|c
/// some.counter:123|c|@0.5
/// ```
///
/// ## Timing
///
/// ``` text
/// some.timer:456|ms
/// ```
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait MetricSink {
    /// Acquire a connection that metrics can be written to, or an I/O error
    /// if the connection could not be established.
    fn connect(&self) -> io::Result<Box<dyn MetricConnection + '_>>;

    /// Return I/O telemetry like connections opened and closed or bytes /
    /// packets sent or dropped.
    ///
    /// Note that not all sinks implement this method and the default
    /// implementation returns zeros.
    fn stats(&self) -> SinkStats {
        SinkStats::default()
    }
}

/// Wrapper around a connection that records what happens to it, including
/// its release when dropped.
pub(crate) struct TrackedConnection<'a, C: MetricConnection> {
    inner: C,
    stats: &'a SocketStats,
}

impl<'a, C: MetricConnection> TrackedConnection<'a, C> {
    pub(crate) fn open(inner: C, stats: &'a SocketStats) -> Self {
        stats.incr_connections_opened();
        TrackedConnection { inner, stats }
    }
}

impl<'a, C: MetricConnection> MetricConnection for TrackedConnection<'a, C> {
    fn write_metric(&mut self, metric: &str) -> io::Result<usize> {
        self.stats.update(self.inner.write_metric(metric), metric.len())
    }
}

impl<'a, C: MetricConnection> Drop for TrackedConnection<'a, C> {
    fn drop(&mut self) {
        self.stats.incr_connections_closed();
    }
}

/// Implementation of a `MetricSink` that discards all metrics.
///
/// Useful for disabling metric collection or unit tests.
#[derive(Debug, Clone)]
pub struct NopMetricSink;

struct NopConnection;

impl MetricConnection for NopConnection {
    fn write_metric(&mut self, _metric: &str) -> io::Result<usize> {
        Ok(0)
    }
}

impl MetricSink for NopMetricSink {
    fn connect(&self) -> io::Result<Box<dyn MetricConnection + '_>> {
        Ok(Box::new(NopConnection))
    }
}
