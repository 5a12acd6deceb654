use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

pub const MEGABYTE: f64 = (1 << 20) as f64;

#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn stop(self, total_bytes: u64) -> Metrics {
        Metrics::new(self.start.elapsed(), total_bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    elapsed: Duration,
    total_bytes: u64,
}

impl Metrics {
    pub fn new(elapsed: Duration, total_bytes: u64) -> Self {
        Self {
            elapsed,
            total_bytes,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Throughput in MB/s. Zero when no time has elapsed.
    pub fn bandwidth(&self) -> f64 {
        let secs = self.elapsed_secs();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_bytes as f64 / (MEGABYTE * secs)
    }

    pub fn report(&self, mut writer: impl Write) -> io::Result<()> {
        writeln!(writer, "Time Elapsed: {:.2} s", self.elapsed_secs())?;
        writeln!(writer, "Bandwidth: {:.2} MB/s", self.bandwidth())?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bandwidth_formula() {
        let metrics = Metrics::new(Duration::from_millis(500), 3 * (1 << 20));
        assert!((metrics.bandwidth() - 6.0).abs() < 1e-9);

        let metrics = Metrics::new(Duration::from_secs_f64(0.37), 12_345);
        let expected = 12_345.0 / (1_048_576.0 * 0.37);
        assert!((metrics.bandwidth() - expected).abs() < 1e-9);
    }

    #[test]
    fn bandwidth_is_never_negative() {
        for (nanos, bytes) in [(1, 0), (1, u64::MAX), (999_999_999, 1), (7, 42)] {
            let metrics = Metrics::new(Duration::from_nanos(nanos), bytes);
            assert!(metrics.bandwidth() >= 0.0);
        }
    }

    #[test]
    fn zero_elapsed_reports_zero_bandwidth() {
        let metrics = Metrics::new(Duration::ZERO, 1024);
        assert_eq!(metrics.bandwidth(), 0.0);
    }

    #[test]
    fn report_writes_two_lines() {
        let metrics = Metrics::new(Duration::from_millis(1250), 1 << 20);
        let mut out = Vec::new();
        metrics.report(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Time Elapsed: 1.25 s\nBandwidth: 0.80 MB/s\n"
        );
    }

    #[test]
    fn stopwatch_counts_forward() {
        let watch = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(5));
        let metrics = watch.stop(10);
        assert!(metrics.elapsed_secs() >= 0.005);
        assert_eq!(metrics.total_bytes(), 10);
    }
}
