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
use std::net::{SocketAddr, UdpSocket};

use crate::sinks::core::{get_addr, MetricConnection, MetricSink, SinkStats, SocketStats, TrackedConnection};

/// Implementation of a `MetricSink` that emits metrics over UDP.
///
/// The sink holds the host and port of the Statsd server. For each send
/// operation an unconnected socket is bound to an ephemeral local port and
/// every metric of the operation is sent as its own datagram. The socket is
/// closed when the operation completes.
///
/// Sending over UDP is fire-and-forget: a metric that was written
/// successfully is not guaranteed to be received by the server.
#[derive(Debug)]
pub struct UdpMetricSink {
    host: String,
    port: u16,
    stats: SocketStats,
}

impl UdpMetricSink {
    /// Construct a new `UdpMetricSink` instance.
    ///
    /// The host is resolved each time a socket is acquired, so an
    /// unresolvable host results in transport errors when sending rather
    /// than a failure here.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use statsd_client::{UdpMetricSink, DEFAULT_PORT};
    ///
    /// let sink = UdpMetricSink::new("metrics.example.com", DEFAULT_PORT);
    /// ```
    pub fn new<S: Into<String>>(host: S, port: u16) -> UdpMetricSink {
        UdpMetricSink {
            host: host.into(),
            port,
            stats: SocketStats::default(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl MetricSink for UdpMetricSink {
    fn connect(&self) -> io::Result<Box<dyn MetricConnection + '_>> {
        let addr = get_addr((self.host.as_str(), self.port))?;
        let bind = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind)?;

        Ok(Box::new(TrackedConnection::open(
            UdpConnection { addr, socket },
            &self.stats,
        )))
    }

    fn stats(&self) -> SinkStats {
        (&self.stats).into()
    }
}

/// Socket bound for a single send operation
#[derive(Debug)]
struct UdpConnection {
    addr: SocketAddr,
    socket: UdpSocket,
}

impl MetricConnection for UdpConnection {
    fn write_metric(&mut self, metric: &str) -> io::Result<usize> {
        self.socket.send_to(metric.as_bytes(), self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::UdpMetricSink;
    use crate::sinks::core::MetricSink;
    use std::net::UdpSocket;
    use std::time::Duration;

    #[test]
    fn test_udp_metric_sink() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let port = server.local_addr().unwrap().port();

        let sink = UdpMetricSink::new("127.0.0.1", port);
        {
            let mut conn = sink.connect().unwrap();
            assert_eq!(7, conn.write_metric("buz:1|c").unwrap());
        }

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!("buz:1|c".as_bytes(), &buf[..n]);

        let stats = sink.stats();
        assert_eq!(1, stats.connections_opened);
        assert_eq!(1, stats.connections_closed);
        assert_eq!(1, stats.packets_sent);
        assert_eq!(7, stats.bytes_sent);
    }

    #[test]
    fn test_udp_metric_sink_one_datagram_per_metric() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let port = server.local_addr().unwrap().port();

        let sink = UdpMetricSink::new("127.0.0.1", port);
        {
            let mut conn = sink.connect().unwrap();
            conn.write_metric("foo:1|c").unwrap();
            conn.write_metric("bar:1|c").unwrap();
        }

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!("foo:1|c".as_bytes(), &buf[..n]);
        let n = server.recv(&mut buf).unwrap();
        assert_eq!("bar:1|c".as_bytes(), &buf[..n]);
    }

    #[test]
    fn test_udp_metric_sink_accessors() {
        let sink = UdpMetricSink::new("localhost", 8125);
        assert_eq!("localhost", sink.host());
        assert_eq!(8125, sink.port());
    }
}
