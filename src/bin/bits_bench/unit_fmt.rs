//! Formatting of the benchmark report: time per operation, heap bytes, operation counts and
//! speedups, each with three significant digits.

use std::fmt;
use std::time::Duration;

const TIME_UNITS: &[&str] = &["ns", "μs", "ms", "s"];
const BYTE_UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
const COUNT_UNITS: &[&str] = &["", "k", "M", "G"];

/// Mean time of a single operation within one measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct PerOp {
    nanos: f64,
}

impl PerOp {
    pub fn new(elapsed: Duration, ops: usize) -> PerOp {
        PerOp { nanos: elapsed.as_nanos() as f64 / ops.max(1) as f64 }
    }

    /// How many times faster this is than `baseline`.
    pub fn speedup_over(self, baseline: PerOp) -> Speedup {
        Speedup(baseline.nanos / self.nanos)
    }
}

impl fmt::Display for PerOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (value, unit) = scale(self.nanos, 1000.0, TIME_UNITS);
        write_sig3(f, value, unit)
    }
}

pub struct Bytes(pub usize);

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < 1024 {
            return write!(f, "{}B", self.0);
        }
        let (value, unit) = scale(self.0 as f64, 1024.0, BYTE_UNITS);
        write_sig3(f, value, unit)
    }
}

pub struct Count(pub usize);

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < 1000 {
            return write!(f, "{}", self.0);
        }
        let (value, unit) = scale(self.0 as f64, 1000.0, COUNT_UNITS);
        write_sig3(f, value, unit)
    }
}

pub struct Speedup(f64);

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.0.is_finite() {
            return write!(f, "-");
        }
        write_sig3(f, self.0, "x")
    }
}

fn scale(mut value: f64, step: f64, units: &'static [&'static str]) -> (f64, &'static str) {
    let mut unit = 0;
    while value >= step && unit + 1 < units.len() {
        value /= step;
        unit += 1;
    }
    (value, units[unit])
}

fn write_sig3(f: &mut fmt::Formatter, value: f64, unit: &str) -> fmt::Result {
    let decimals = if value == 0.0 || value >= 100.0 {
        0
    } else if value >= 10.0 {
        1
    } else {
        2
    };
    write!(f, "{:.*}{}", decimals, value, unit)
}
