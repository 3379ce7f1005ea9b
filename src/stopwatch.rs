//! Elapsed-time measurement for the run summary line.

use std::time::Instant;

pub struct Stopwatch {
    start: Option<Instant>,
    elapsed: Option<std::time::Duration>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Stopwatch { start: None, elapsed: None }
    }

    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        if let Some(start) = self.start {
            self.elapsed = Some(start.elapsed());
        }
    }

    pub fn elapsed_milliseconds(&self) -> f64 {
        self.elapsed.map(|d| d.as_secs_f64() * 1000.0).unwrap_or(0.0)
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
