//! Task metadata, per-task statistics and the periodic gate

/// Static description of a periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMetadata {
    /// Human-readable task name for logging
    pub name: &'static str,
    /// Target execution rate in Hz
    pub rate_hz: u32,
}

impl TaskMetadata {
    pub const fn new(name: &'static str, rate_hz: u32) -> Self {
        Self { name, rate_hz }
    }

    /// Task period in microseconds; zero rate means run on every poll
    #[inline]
    pub const fn period_us(&self) -> u64 {
        if self.rate_hz == 0 {
            0
        } else {
            1_000_000 / self.rate_hz as u64
        }
    }

    /// Check if the measured period is within 5% of the target
    #[inline]
    pub fn is_period_acceptable(&self, actual_period_us: u64) -> bool {
        let target = self.period_us();
        let tolerance = target / 20;
        actual_period_us >= target.saturating_sub(tolerance)
            && actual_period_us <= target.saturating_add(tolerance)
    }
}

/// Runtime statistics for a single task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of times the task ran
    pub execution_count: u32,
    /// Last measured period in microseconds
    pub last_period_us: u64,
    /// Longest period observed in microseconds
    pub max_period_us: u64,
    /// Runs whose period exceeded the 5% tolerance
    pub late_runs: u32,
}

impl TaskStats {
    fn record(&mut self, meta: &TaskMetadata, period_us: u64) {
        self.execution_count = self.execution_count.saturating_add(1);
        self.last_period_us = period_us;
        if period_us > self.max_period_us {
            self.max_period_us = period_us;
        }
        if period_us > meta.period_us() && !meta.is_period_acceptable(period_us) {
            self.late_runs = self.late_runs.saturating_add(1);
        }
    }
}

/// Rate gate for one task in a cooperative loop
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTask {
    meta: TaskMetadata,
    last_run_us: Option<u64>,
    stats: TaskStats,
}

impl PeriodicTask {
    pub const fn new(meta: TaskMetadata) -> Self {
        Self {
            meta,
            last_run_us: None,
            stats: TaskStats {
                execution_count: 0,
                last_period_us: 0,
                max_period_us: 0,
                late_runs: 0,
            },
        }
    }

    pub fn metadata(&self) -> &TaskMetadata {
        &self.meta
    }

    pub fn stats(&self) -> TaskStats {
        self.stats
    }

    /// Whether the task should run at `now_us`
    pub fn is_due(&self, now_us: u64) -> bool {
        match self.last_run_us {
            None => true,
            Some(last) => now_us.saturating_sub(last) >= self.meta.period_us(),
        }
    }

    /// Mark the task as run if due and return the elapsed time in seconds
    ///
    /// The first run reports the nominal period as its elapsed time.
    pub fn poll(&mut self, now_us: u64) -> Option<f32> {
        if !self.is_due(now_us) {
            return None;
        }
        let elapsed_us = match self.last_run_us {
            None => self.meta.period_us(),
            Some(last) => {
                let period = now_us.saturating_sub(last);
                self.stats.record(&self.meta, period);
                period
            }
        };
        self.last_run_us = Some(now_us);
        Some(elapsed_us as f32 / 1_000_000.0)
    }

    /// Forget the last run so the next poll fires immediately
    pub fn reset(&mut self) {
        self.last_run_us = None;
        self.stats = TaskStats::default();
    }
}
