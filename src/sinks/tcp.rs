// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::sinks::core::{get_addr, MetricConnection, MetricSink, SinkStats, SocketStats, TrackedConnection};

/// Implementation of a `MetricSink` that emits metrics over TCP.
///
/// A new stream is connected to the Statsd server for each send operation
/// and closed once every metric of the operation has been written. Each
/// metric is written with its own write call. There is no retry or
/// reconnection: a failed connect or write is reported as an error for
/// that operation only.
///
/// By default connecting and writing block without a timeout. Use
/// `with_connect_timeout` and `with_write_timeout` to bound them.
#[derive(Debug)]
pub struct TcpMetricSink {
    host: String,
    port: u16,
    connect_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    stats: SocketStats,
}

impl TcpMetricSink {
    /// Construct a new `TcpMetricSink` instance.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use statsd_client::{TcpMetricSink, DEFAULT_PORT};
    ///
    /// let sink = TcpMetricSink::new("metrics.example.com", DEFAULT_PORT)
    ///     .with_connect_timeout(Duration::from_millis(250));
    /// ```
    pub fn new<S: Into<String>>(host: S, port: u16) -> TcpMetricSink {
        TcpMetricSink {
            host: host.into(),
            port,
            connect_timeout: None,
            write_timeout: None,
            stats: SocketStats::default(),
        }
    }

    /// Give up establishing a connection after the given duration.
    ///
    /// The duration must be non-zero or every connection attempt fails.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Give up writing a metric after the given duration.
    ///
    /// The duration must be non-zero or every connection attempt fails.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl MetricSink for TcpMetricSink {
    fn connect(&self) -> io::Result<Box<dyn MetricConnection + '_>> {
        let addr = get_addr((self.host.as_str(), self.port))?;
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_write_timeout(self.write_timeout)?;

        Ok(Box::new(TrackedConnection::open(TcpConnection { stream }, &self.stats)))
    }

    fn stats(&self) -> SinkStats {
        (&self.stats).into()
    }
}

/// Stream connected for a single send operation
#[derive(Debug)]
struct TcpConnection {
    stream: TcpStream,
}

impl MetricConnection for TcpConnection {
    fn write_metric(&mut self, metric: &str) -> io::Result<usize> {
        self.stream.write_all(metric.as_bytes())?;
        Ok(metric.len())
    }
}

#[cfg(test)]
mod tests {
    use super::TcpMetricSink;
    use crate::sinks::core::MetricSink;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_tcp_metric_sink() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = String::new();
            stream.read_to_string(&mut received).unwrap();
            received
        });

        let sink = TcpMetricSink::new("127.0.0.1", port).with_write_timeout(Duration::from_secs(5));
        {
            let mut conn = sink.connect().unwrap();
            assert_eq!(7, conn.write_metric("foo:1|c").unwrap());
            assert_eq!(8, conn.write_metric("bar:3|ms").unwrap());
        }

        // read_to_string only returns once the connection has been closed
        assert_eq!("foo:1|cbar:3|ms", server.join().unwrap());

        let stats = sink.stats();
        assert_eq!(1, stats.connections_opened);
        assert_eq!(1, stats.connections_closed);
        assert_eq!(2, stats.packets_sent);
    }

    #[test]
    fn test_tcp_metric_sink_connection_refused() {
        // Bind and immediately drop a listener to find a port nothing listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let sink = TcpMetricSink::new("127.0.0.1", port).with_connect_timeout(Duration::from_secs(5));
        assert!(sink.connect().is_err());

        let stats = sink.stats();
        assert_eq!(0, stats.connections_opened);
        assert_eq!(0, stats.connections_closed);
    }
}
