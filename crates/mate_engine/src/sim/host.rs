use std::collections::VecDeque;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use super::position::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Capabilities the simulation borrows from whoever embeds it.
pub trait Host {
    /// Uniform integer in `[0, max_exclusive)`; `0` when `max_exclusive` is `0`.
    fn random_int(&mut self, max_exclusive: u32) -> u32;

    /// Monotonic clock in milliseconds.
    fn now(&self) -> f64;

    fn measure_viewport(&mut self) -> Viewport;

    fn log(&mut self, level: LogLevel, message: &str) {
        forward_to_tracing(level, message);
    }
}

pub fn forward_to_tracing(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug!(detail = message, "mate_log"),
        LogLevel::Info => info!(detail = message, "mate_log"),
        LogLevel::Warn => warn!(detail = message, "mate_log"),
        LogLevel::Error => error!(detail = message, "mate_log"),
    }
}

/// Production host: entropy or seeded `StdRng`, wall clock, and a viewport
/// the embedder updates when its window changes.
#[derive(Debug)]
pub struct SystemHost {
    rng: StdRng,
    started: Instant,
    viewport: Viewport,
}

impl SystemHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            started: Instant::now(),
            viewport,
        }
    }

    pub fn with_seed(seed: u64, viewport: Viewport) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            started: Instant::now(),
            viewport,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

impl Host for SystemHost {
    fn random_int(&mut self, max_exclusive: u32) -> u32 {
        if max_exclusive == 0 {
            return 0;
        }
        self.rng.gen_range(0..max_exclusive)
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn measure_viewport(&mut self) -> Viewport {
        self.viewport
    }
}

/// Replayable host: draws come from a fixed script (cycled, reduced modulo
/// the requested range), time only moves when told to, and log lines are
/// kept for inspection.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    script: Vec<u32>,
    cursor: usize,
    now_ms: f64,
    viewport: Viewport,
    logged: VecDeque<(LogLevel, String)>,
}

const SCRIPTED_LOG_CAPACITY: usize = 256;

impl ScriptedHost {
    pub fn new(script: Vec<u32>, viewport: Viewport) -> Self {
        Self {
            script,
            cursor: 0,
            now_ms: 0.0,
            viewport,
            logged: VecDeque::new(),
        }
    }

    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn advance_clock(&mut self, delta_ms: f64) {
        self.now_ms += delta_ms;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn draws_taken(&self) -> usize {
        self.cursor
    }

    pub fn logged(&self) -> impl Iterator<Item = (LogLevel, &str)> + '_ {
        self.logged
            .iter()
            .map(|(level, message)| (*level, message.as_str()))
    }

    pub fn take_logged(&mut self) -> Vec<(LogLevel, String)> {
        self.logged.drain(..).collect()
    }
}

impl Host for ScriptedHost {
    fn random_int(&mut self, max_exclusive: u32) -> u32 {
        if max_exclusive == 0 || self.script.is_empty() {
            return 0;
        }
        let raw = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        raw % max_exclusive
    }

    fn now(&self) -> f64 {
        self.now_ms
    }

    fn measure_viewport(&mut self) -> Viewport {
        self.viewport
    }

    fn log(&mut self, level: LogLevel, message: &str) {
        forward_to_tracing(level, message);
        if self.logged.len() == SCRIPTED_LOG_CAPACITY {
            self.logged.pop_front();
        }
        self.logged.push_back((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_draws_cycle_and_wrap() {
        let mut host = ScriptedHost::new(vec![3, 7, 12], Viewport::default());
        assert_eq!(host.random_int(10), 3);
        assert_eq!(host.random_int(10), 7);
        assert_eq!(host.random_int(10), 2);
        assert_eq!(host.random_int(10), 3);
        assert_eq!(host.random_int(0), 0);
        assert_eq!(host.draws_taken(), 4);
    }

    #[test]
    fn scripted_host_captures_logs() {
        let mut host = ScriptedHost::new(Vec::new(), Viewport::default());
        host.log(LogLevel::Error, "boom");
        assert_eq!(host.random_int(5), 0);
        let logged = host.logged().collect::<Vec<_>>();
        assert_eq!(logged, vec![(LogLevel::Error, "boom")]);
        assert_eq!(host.take_logged().len(), 1);
        assert_eq!(host.logged().count(), 0);
    }

    #[test]
    fn seeded_system_hosts_agree() {
        let mut a = SystemHost::with_seed(42, Viewport::default());
        let mut b = SystemHost::with_seed(42, Viewport::default());
        for _ in 0..32 {
            let draw = a.random_int(100);
            assert!(draw < 100);
            assert_eq!(draw, b.random_int(100));
        }
        assert_eq!(a.random_int(0), 0);
    }
}
