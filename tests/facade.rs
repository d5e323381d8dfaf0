use crossbeam_channel::Receiver;
use statsd_client::{CountOptions, SpyMetricSink, Statsd, StatsdClient};
use std::thread;
use std::time::Duration;

fn spy_statsd(namespace: &str, factor: f64) -> (Receiver<Vec<u8>>, Statsd) {
    let (rx, sink) = SpyMetricSink::new();
    (rx, Statsd::from_client(StatsdClient::from_sink(namespace, sink), factor))
}

fn received(rx: &Receiver<Vec<u8>>) -> Vec<String> {
    rx.try_iter().map(|v| String::from_utf8(v).unwrap()).collect()
}

#[test]
fn test_increment_with_defaults() {
    let (rx, statsd) = spy_statsd("", 1.0);
    statsd.increment("jobs.done", CountOptions::default()).unwrap();

    assert_eq!(vec!["jobs.done:1|c"], received(&rx));
}

#[test]
fn test_decrement_scaled_by_factor() {
    let (rx, statsd) = spy_statsd("", 10.0);
    statsd.decrement("queue.size", CountOptions::by(5)).unwrap();

    assert_eq!(vec!["queue.size:-50|c"], received(&rx));
}

#[test]
fn test_timing_with_namespace() {
    let (rx, statsd) = spy_statsd("api", 1.0);
    statsd.timing("request.latency", 42).unwrap();

    assert_eq!(vec!["api.request.latency:42|ms"], received(&rx));
}

#[test]
fn test_increment_many_names() {
    let (rx, statsd) = spy_statsd("app", 2.0);
    statsd.inc(&["logins", "logins.web"], 3).unwrap();

    assert_eq!(vec!["app.logins:6|c", "app.logins.web:6|c"], received(&rx));
}

#[test]
fn test_block_timing_returns_result() {
    let (rx, statsd) = spy_statsd("", 1.0);
    let value = statsd.time("slow.op", || {
        thread::sleep(Duration::from_millis(50));
        vec![1, 2, 3]
    });

    assert_eq!(vec![1, 2, 3], value);

    let sent = received(&rx);
    assert_eq!(1, sent.len());
    assert!(sent[0].starts_with("slow.op:"));
    assert!(sent[0].ends_with("|ms"));

    let ms: f64 = sent[0]["slow.op:".len()..sent[0].len() - "|ms".len()].parse().unwrap();
    assert!(ms >= 50.0, "elapsed {} ms", ms);
    assert!(ms < 5_000.0, "elapsed {} ms", ms);
}

#[test]
fn test_disabled_is_silent() {
    let statsd = Statsd::disabled();

    assert!(!statsd.increment("a", CountOptions::default()).unwrap().is_sent());
    assert!(!statsd.dec("a", 4).unwrap().is_sent());
    assert!(!statsd.timing("a", 1.5).unwrap().is_sent());
    assert_eq!("ok", statsd.time("a", || "ok"));
}
