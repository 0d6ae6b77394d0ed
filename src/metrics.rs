/// Counters and wait-time samples accumulated as a side effect of state
/// transitions.
///
/// All counters are monotonic. `arrivals` counts every arrival event, balked
/// or not, so `arrivals == balked + admitted` holds by construction;
/// `completed <= started <= arrivals` always. One wait duration is recorded
/// per customer that starts service, in service-start order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    pub arrivals: u64,
    pub balked: u64,
    pub started: u64,
    pub completed: u64,
    wait_times: Vec<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self) {
        self.arrivals += 1;
    }

    pub fn record_balk(&mut self) {
        self.balked += 1;
    }

    /// Record a service start together with the minutes the customer waited.
    pub fn record_start(&mut self, wait_min: f64) {
        self.started += 1;
        self.wait_times.push(wait_min);
    }

    pub fn record_completion(&mut self) {
        self.completed += 1;
    }

    /// Wait samples in the order service started.
    pub fn wait_times(&self) -> &[f64] {
        &self.wait_times
    }

    /// Arithmetic mean of the wait samples, 0 when none were recorded.
    pub fn mean_wait(&self) -> f64 {
        if self.wait_times.is_empty() {
            return 0.0;
        }
        self.wait_times.iter().sum::<f64>() / self.wait_times.len() as f64
    }

    /// 95th-percentile wait by the nearest-rank method, 0 when no samples
    /// were recorded.
    pub fn p95_wait(&self) -> f64 {
        percentile_nearest_rank(&self.wait_times, 0.95)
    }
}

/// Nearest-rank percentile over an unsorted sample set: the element at index
/// `ceil(q * n) - 1` of the sorted samples, 0 for an empty set.
///
/// Deliberately the plain nearest-rank formula, noisy as it is for small
/// sample counts, so outputs stay comparable across implementations.
fn percentile_nearest_rank(samples: &[f64], q: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Read-only snapshot of a finished run, computed once from the metrics and
/// the server pool and never mutated afterward.
///
/// Persisting this anywhere (CSV, JSON, a database) is entirely the caller's
/// responsibility; with the `serde` feature enabled the type derives
/// `Serialize`/`Deserialize` to make that straightforward.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Total arrival events, including customers who balked.
    pub arrivals: u64,
    /// Customers turned away by the capacity limit.
    pub balked: u64,
    /// Customers who began service.
    pub started: u64,
    /// Customers whose service finished within the horizon.
    pub completed: u64,
    /// Mean wait in the line, minutes.
    pub avg_wait_min: f64,
    /// Nearest-rank 95th-percentile wait, minutes.
    pub p95_wait_min: f64,
    /// Time-weighted average line length over the horizon.
    pub avg_queue_len: f64,
    /// Per-ATM busy fraction of the horizon, each in `[0, 1]`, indexed by
    /// machine id.
    pub utilization: Vec<f64>,
    /// Simulated length of the run, minutes.
    pub horizon_min: f64,
    /// Number of machines in the pool.
    pub atms: usize,
}
