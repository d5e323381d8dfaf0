// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2020-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Process-wide default `Statsd` instance and free functions using it.
//!
//! The default is created from the environment (see
//! `Statsd::from_environment`) the first time it is used, unless one was
//! installed before with `configure` or `set_default`. `reset` drops the
//! current default so that the next use creates it again.
//!
//! ```
//! use statsd_client::{global, Config, CountOptions};
//!
//! global::configure(Config::from_yaml_str("namespace: my.app").unwrap());
//! global::increment("jobs.done", CountOptions::default()).unwrap();
//!
//! let answer = global::time("compute", || 6 * 7);
//! assert_eq!(42, answer);
//! ```

use crate::config::Config;
use crate::encoder::{ToMetricNames, ToTimerValue};
use crate::facade::{CountOptions, Statsd};
use crate::types::{Emitted, MetricResult};
use std::sync::{Arc, PoisonError, RwLock};

/// Global default facade used by the free functions of this module
static HOLDER: DefaultHolder<Statsd> = DefaultHolder::new();

/// Holder for a lazily created value that can be replaced or cleared at any
/// time while being read from multiple threads.
///
/// Readers get a cloned `Arc` so a value being replaced stays alive until
/// every operation using it has completed.
#[derive(Debug, Default)]
pub(crate) struct DefaultHolder<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T> DefaultHolder<T> {
    pub(crate) const fn new() -> Self {
        DefaultHolder {
            value: RwLock::new(None),
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<T>> {
        self.value.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Get the value, creating it with `init` if there is none.
    ///
    /// `init` runs at most once per empty holder even when multiple threads
    /// race to create the value.
    pub(crate) fn get_or_init<F>(&self, init: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(v) = self.get() {
            return v;
        }

        let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);
        value.get_or_insert_with(|| Arc::new(init())).clone()
    }

    pub(crate) fn set(&self, val: T) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(val));
    }

    pub(crate) fn clear(&self) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Get the default instance, creating it from the environment if unset.
pub fn default_client() -> Arc<Statsd> {
    HOLDER.get_or_init(Statsd::from_environment)
}

/// Replace the default instance with one built from `config`.
pub fn configure(config: Config) {
    set_default(Statsd::new(config));
}

/// Replace the default instance.
pub fn set_default(statsd: Statsd) {
    HOLDER.set(statsd);
}

/// Drop the default instance so that it is created from the environment
/// again on next use.
pub fn reset() {
    HOLDER.clear();
}

/// Increment counter(s) using the default instance.
pub fn increment<N, O>(names: &N, opts: O) -> MetricResult<Emitted>
where
    N: ToMetricNames + ?Sized,
    O: Into<CountOptions>,
{
    default_client().increment(names, opts)
}

/// Decrement counter(s) using the default instance.
pub fn decrement<N, O>(names: &N, opts: O) -> MetricResult<Emitted>
where
    N: ToMetricNames + ?Sized,
    O: Into<CountOptions>,
{
    default_client().decrement(names, opts)
}

/// Record a timing using the default instance.
pub fn timing<N, T>(names: &N, value: T) -> MetricResult<Emitted>
where
    N: ToMetricNames + ?Sized,
    T: ToTimerValue,
{
    default_client().timing(names, value)
}

/// Time `block` using the default instance and return its result.
pub fn time<N, F, R>(names: &N, block: F) -> R
where
    N: ToMetricNames + ?Sized,
    F: FnOnce() -> R,
{
    default_client().time(names, block)
}

#[cfg(test)]
mod tests {
    use super::DefaultHolder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_holder_starts_empty() {
        let holder: DefaultHolder<String> = DefaultHolder::new();
        assert!(holder.get().is_none());
    }

    #[test]
    fn test_holder_get_or_init_once() {
        let holder: DefaultHolder<String> = DefaultHolder::new();
        let calls = AtomicUsize::new(0);

        let first = holder.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            "first".to_string()
        });
        let second = holder.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            "second".to_string()
        });

        assert_eq!("first", first.as_str());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(1, calls.load(Ordering::SeqCst));
    }

    #[test]
    fn test_holder_set_replaces() {
        let holder: DefaultHolder<String> = DefaultHolder::new();
        let old = holder.get_or_init(|| "old".to_string());
        holder.set("new".to_string());

        // Existing readers keep the value they were given
        assert_eq!("old", old.as_str());
        assert_eq!("new", holder.get().unwrap().as_str());
    }

    #[test]
    fn test_holder_clear_reinitializes() {
        let holder: DefaultHolder<String> = DefaultHolder::new();
        holder.get_or_init(|| "first".to_string());
        holder.clear();

        assert!(holder.get().is_none());
        assert_eq!("second", holder.get_or_init(|| "second".to_string()).as_str());
    }

    #[test]
    fn test_holder_concurrent_init() {
        let holder: Arc<DefaultHolder<usize>> = Arc::new(DefaultHolder::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut threads = Vec::new();

        for i in 0..8 {
            let holder = holder.clone();
            let calls = calls.clone();
            threads.push(thread::spawn(move || {
                *holder.get_or_init(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    i
                })
            }));
        }

        let seen: Vec<usize> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        assert_eq!(1, calls.load(Ordering::SeqCst));
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
    }
}
