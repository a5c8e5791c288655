//! A wrapper around the `prometheus` crate that provides a global registry
//! and functions that are infallible at the call site.
//!
//! Metric creation can fail (e.g. on duplicate registration), so creators
//! return a `Result` which is stored in a static. The mutation helpers
//! accept that `Result` and silently no-op on `Err`, keeping metric calls
//! out of the error paths of the code being instrumented.

use prometheus::{HistogramOpts, Opts};

pub use prometheus::{Histogram, IntCounter, IntGauge};

pub type Result<T> = std::result::Result<T, prometheus::Error>;

/// Attempts to create an `IntCounter`, returning `Err` if the registry
/// does not accept the counter (potentially due to naming conflict).
pub fn try_create_int_counter(name: &str, help: &str) -> Result<IntCounter> {
    let opts = Opts::new(name, help);
    let counter = IntCounter::with_opts(opts)?;
    prometheus::register(Box::new(counter.clone()))?;
    Ok(counter)
}

/// Attempts to create an `IntGauge`, returning `Err` if the registry
/// does not accept the gauge (potentially due to naming conflict).
pub fn try_create_int_gauge(name: &str, help: &str) -> Result<IntGauge> {
    let opts = Opts::new(name, help);
    let gauge = IntGauge::with_opts(opts)?;
    prometheus::register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

/// Attempts to create a `Histogram`, returning `Err` if the registry
/// does not accept the histogram (potentially due to naming conflict).
pub fn try_create_histogram(name: &str, help: &str) -> Result<Histogram> {
    let opts = HistogramOpts::new(name, help);
    let histogram = Histogram::with_opts(opts)?;
    prometheus::register(Box::new(histogram.clone()))?;
    Ok(histogram)
}

pub fn inc_counter(counter: &Result<IntCounter>) {
    if let Ok(counter) = counter {
        counter.inc();
    }
}

pub fn inc_counter_by(counter: &Result<IntCounter>, value: u64) {
    if let Ok(counter) = counter {
        counter.inc_by(value);
    }
}

pub fn set_gauge(gauge: &Result<IntGauge>, value: i64) {
    if let Ok(gauge) = gauge {
        gauge.set(value);
    }
}

pub fn get_int_counter_value(counter: &Result<IntCounter>) -> u64 {
    counter.as_ref().map(|counter| counter.get()).unwrap_or(0)
}
