use statsd_client::prelude::*;
use statsd_client::StatsdClient;
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[allow(dead_code)]
pub fn run_arc_threaded_test(client: StatsdClient, num_threads: u64, iterations: u64) {
    let shared_client = Arc::new(client);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_client = Arc::clone(&shared_client);

            thread::spawn(move || {
                for i in 0..iterations {
                    local_client.update_stats("some.counter", i as i64, 1.0).unwrap();
                    local_client.increment(&["some.counter", "other.counter"]).unwrap();
                    local_client.decrement("some.counter").unwrap();
                    local_client.timing("some.timer", i).unwrap();
                    local_client.timing("some.timer", i as f64 / 2.0).unwrap();
                    thread::sleep(Duration::from_millis(1));
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
}

/// Statsd server stand-in listening on an ephemeral loopback port
#[allow(dead_code)]
pub struct UdpServer {
    socket: UdpSocket,
}

#[allow(dead_code)]
impl UdpServer {
    pub fn new() -> UdpServer {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        UdpServer { socket }
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().unwrap().port()
    }

    /// Receive the next `n` datagrams
    pub fn recv(&self, n: usize) -> Vec<String> {
        let mut buf = [0u8; 1024];
        (0..n)
            .map(|_| {
                let len = self.socket.recv(&mut buf).unwrap();
                String::from_utf8(buf[..len].to_vec()).unwrap()
            })
            .collect()
    }
}
