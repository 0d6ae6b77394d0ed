use crate::observe::NullObserver;
use crate::{
    ArrivalProcess, Atm, EventQueue, Metrics, Observer, RunSummary, ServiceTimes, Timeslice,
    WaitingLine,
};

use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Construction parameters for one simulation run.
///
/// Times are minutes except the arrival rate, which is customers per hour and
/// converted once at construction. Validation happens in [`Simulation::new()`],
/// before any simulated time elapses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Number of ATMs in the pool. Zero is a valid degenerate configuration:
    /// the line fills up (to capacity, if any) and nothing ever starts.
    pub atms: usize,
    /// Simulated length of the run, minutes.
    pub horizon_min: f64,
    /// Poisson arrival rate, customers per hour. Must be > 0.
    pub arrival_rate_per_hour: f64,
    /// Target mean service duration, minutes. Must be > 0.
    pub service_mean_min: f64,
    /// Service-time coefficient of variation; zero means deterministic
    /// service.
    pub service_cv: f64,
    /// Maximum number of customers the line will hold; arrivals beyond it
    /// balk. `None` disables balking entirely.
    pub max_queue: Option<usize>,
    /// Seed for the random source. Fixing it makes the run fully
    /// reproducible; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Minimum spacing between [`Observer::on_timeslice`] snapshots, minutes.
    /// `None` disables timeslice emission.
    pub timeslice_dt_min: Option<f64>,
}

/// Payload carried by scheduled events.
///
/// These are the only two event kinds in the system: the arrival stream is
/// self-renewing through `Arrival`, and every service start schedules the
/// matching `Departure` with the identities of the machine and customer
/// involved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEvent {
    Arrival,
    Departure { atm_id: usize, customer_id: u64 },
}

/// The queueing/service state machine driven by the event loop: waiting line,
/// ATM pool, stochastic sources, and the metrics they feed.
///
/// Kept separate from the scheduler so that event handlers can borrow the
/// facility and the queue independently.
#[derive(Debug)]
struct Facility {
    line: WaitingLine,
    atms: Vec<Atm>,
    arrivals: ArrivalProcess,
    service: ServiceTimes,
    metrics: Metrics,
    rng: Pcg64,
    max_queue: Option<usize>,
    horizon_min: f64,
}

impl Facility {
    /// Arrival handling: count the arrival, admit or balk, try to start
    /// service, then keep the Poisson stream alive by scheduling the next
    /// arrival while it still lands within the horizon.
    fn handle_arrival<O: Observer>(
        &mut self,
        scheduler: &mut EventQueue<SimEvent>,
        observer: &mut O,
    ) -> crate::Result<()> {
        let now = scheduler.now();
        let customer = self.arrivals.mint(now);
        self.metrics.record_arrival();
        observer.on_arrival(now, &customer);

        let at_capacity = self.max_queue.is_some_and(|cap| self.line.len() >= cap);
        if at_capacity {
            self.metrics.record_balk();
            observer.on_balk(now, &customer);
        } else {
            self.line.enqueue(customer);
            self.line.sample(now);
            self.assign_idle_atms(scheduler, observer)?;
        }

        let gap = self.arrivals.next_delay(&mut self.rng);
        if now + gap <= self.horizon_min {
            scheduler.schedule(gap, SimEvent::Arrival)?;
        }
        Ok(())
    }

    /// Departure handling: count the completion, free the machine, and let a
    /// waiting customer (if any) take its place immediately.
    fn handle_departure<O: Observer>(
        &mut self,
        scheduler: &mut EventQueue<SimEvent>,
        atm_id: usize,
        customer_id: u64,
        observer: &mut O,
    ) -> crate::Result<()> {
        let now = scheduler.now();
        self.metrics.record_completion();
        self.atms[atm_id].busy = false;
        observer.on_departure(now, atm_id, customer_id);
        self.line.sample(now);
        self.assign_idle_atms(scheduler, observer)
    }

    /// Greedy assignment, invoked after every arrival and every departure:
    /// while the line is non-empty and an idle machine exists, the head
    /// customer starts service and the matching departure is scheduled.
    fn assign_idle_atms<O: Observer>(
        &mut self,
        scheduler: &mut EventQueue<SimEvent>,
        observer: &mut O,
    ) -> crate::Result<()> {
        let now = scheduler.now();
        while !self.line.is_empty() {
            let idle = match self.atms.iter().position(|atm| !atm.busy) {
                Some(idx) => idx,
                None => break,
            };
            let customer = match self.line.dequeue() {
                Some(customer) => customer,
                None => break,
            };
            self.line.sample(now);

            // floor at zero to absorb floating-point jitter
            let wait_min = (now - customer.arrival_time).max(0.0);
            let service_min = self.service.next_duration(&mut self.rng);

            let atm = &mut self.atms[idle];
            atm.busy = true;
            atm.busy_time += service_min;

            self.metrics.record_start(wait_min);
            observer.on_service_start(now, idle, &customer, wait_min, service_min);
            scheduler.schedule(
                service_min,
                SimEvent::Departure {
                    atm_id: idle,
                    customer_id: customer.id,
                },
            )?;
        }
        Ok(())
    }

    fn snapshot(&self, now: f64) -> Timeslice {
        Timeslice {
            now,
            queue_len: self.line.len(),
            in_service: self.atms.iter().filter(|atm| atm.busy).count(),
            completed: self.metrics.completed,
            balked: self.metrics.balked,
            atm_busy: self.atms.iter().map(|atm| atm.busy).collect(),
        }
    }

    fn summarize(&self, horizon_min: f64) -> RunSummary {
        let span = horizon_min.max(1e-12);
        RunSummary {
            arrivals: self.metrics.arrivals,
            balked: self.metrics.balked,
            started: self.metrics.started,
            completed: self.metrics.completed,
            avg_wait_min: self.metrics.mean_wait(),
            p95_wait_min: self.metrics.p95_wait(),
            avg_queue_len: self.line.average_len(horizon_min),
            utilization: self
                .atms
                .iter()
                .map(|atm| (atm.busy_time / span).min(1.0))
                .collect(),
            horizon_min,
            atms: self.atms.len(),
        }
    }
}

/// A complete simulation instance: configuration, facility state, and the
/// event scheduler, wired together and ready to run.
///
/// The expected workflow is:
///
/// 1. Build a [`SimConfig`].
/// 2. Pass it to [`new()`]; handle any configuration error.
/// 3. Call [`run()`], or [`run_with()`] to receive [`Observer`] notifications.
/// 4. Read the returned [`RunSummary`].
///
/// Independent instances share no state, so parameter sweeps may construct
/// and run many of them in parallel, one per thread.
///
/// [`new()`]: Simulation::new
/// [`run()`]: Simulation::run
/// [`run_with()`]: Simulation::run_with
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    facility: Facility,
    scheduler: EventQueue<SimEvent>,
}

impl Simulation {
    /// Validate the configuration and build a ready-to-run instance.
    ///
    /// # Errors
    ///
    /// Fails fast with the matching [`Error`] variant when the horizon is
    /// negative or non-finite, the arrival rate or mean service time is not
    /// strictly positive, or the coefficient of variation is negative. No
    /// simulated time elapses before these checks.
    ///
    /// [`Error`]: crate::Error
    pub fn new(config: SimConfig) -> crate::Result<Self> {
        if !config.horizon_min.is_finite() || config.horizon_min < 0.0 {
            return Err(crate::Error::InvalidHorizon {
                horizon_min: config.horizon_min,
            });
        }
        let arrivals = ArrivalProcess::new(config.arrival_rate_per_hour)?;
        let service = ServiceTimes::new(config.service_mean_min, config.service_cv)?;
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_rng(&mut rand::rng()),
        };

        let facility = Facility {
            line: WaitingLine::new(),
            atms: (0..config.atms).map(Atm::new).collect(),
            arrivals,
            service,
            metrics: Metrics::new(),
            rng,
            max_queue: config.max_queue,
            horizon_min: config.horizon_min,
        };
        Ok(Self {
            config,
            facility,
            scheduler: EventQueue::new(),
        })
    }

    /// Run to the horizon with no observer attached.
    ///
    /// # Errors
    ///
    /// See [`run_with()`].
    ///
    /// [`run_with()`]: Simulation::run_with
    pub fn run(&mut self) -> crate::Result<RunSummary> {
        self.run_with(&mut NullObserver)
    }

    /// Run to the horizon, delivering notifications to `observer`.
    ///
    /// Sequence: seed the occupancy sampler at `t = 0`, schedule the first
    /// arrival after one exponential gap, drain the scheduler until the next
    /// pending event would exceed the horizon, take a final occupancy sample
    /// at exactly the horizon, and derive the summary. The summary is a
    /// value object; nothing in the instance is mutated after it is built.
    ///
    /// # Errors
    ///
    /// The only failures that can surface here are scheduling errors, and
    /// every internally computed delay is non-negative by construction; the
    /// signature stays fallible so the `?`-based handlers compose.
    pub fn run_with<O: Observer>(&mut self, observer: &mut O) -> crate::Result<RunSummary> {
        let horizon_min = self.config.horizon_min;
        let facility = &mut self.facility;

        facility.line.sample(0.0);
        let first_gap = facility.arrivals.next_delay(&mut facility.rng);
        self.scheduler.schedule(first_gap, SimEvent::Arrival)?;

        let slice_dt = self.config.timeslice_dt_min;
        let mut last_slice: Option<f64> = None;
        self.scheduler.run_until(horizon_min, |scheduler, event| {
            match event {
                SimEvent::Arrival => facility.handle_arrival(scheduler, observer)?,
                SimEvent::Departure { atm_id, customer_id } => {
                    facility.handle_departure(scheduler, atm_id, customer_id, observer)?;
                },
            }
            if let Some(dt) = slice_dt {
                let now = scheduler.now();
                if last_slice.map_or(true, |t| now - t >= dt - 1e-9) {
                    observer.on_timeslice(&facility.snapshot(now));
                    last_slice = Some(now);
                }
            }
            Ok(())
        })?;

        facility.line.sample(horizon_min);
        Ok(facility.summarize(horizon_min))
    }

    /// The configuration this instance was built from.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The current simulated time, minutes.
    pub fn clock(&self) -> f64 {
        self.scheduler.now()
    }

    /// Counters and wait samples accumulated so far.
    pub fn metrics(&self) -> &Metrics {
        &self.facility.metrics
    }

    /// The waiting line, including its occupancy samples.
    pub fn line(&self) -> &WaitingLine {
        &self.facility.line
    }

    /// The ATM pool.
    pub fn atms(&self) -> &[Atm] {
        &self.facility.atms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig {
            atms: 2,
            horizon_min: 120.0,
            arrival_rate_per_hour: 30.0,
            service_mean_min: 3.0,
            service_cv: 0.5,
            max_queue: Some(8),
            seed: Some(1234),
            timeslice_dt_min: None,
        }
    }

    #[test]
    fn invalid_horizon_is_rejected() {
        let mut bad = config();
        bad.horizon_min = -5.0;
        assert!(matches!(
            Simulation::new(bad),
            Err(crate::Error::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn invalid_rate_is_rejected_before_any_time_elapses() {
        let mut bad = config();
        bad.arrival_rate_per_hour = 0.0;
        assert!(matches!(
            Simulation::new(bad),
            Err(crate::Error::InvalidRate { .. })
        ));
    }

    #[test]
    fn clock_ends_exactly_at_horizon() {
        let mut sim = Simulation::new(config()).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(120.0, sim.clock());
        assert_eq!(120.0, summary.horizon_min);
    }

    #[test]
    fn counters_nest_properly() {
        let mut sim = Simulation::new(config()).unwrap();
        let summary = sim.run().unwrap();

        assert!(summary.completed <= summary.started);
        assert!(summary.started <= summary.arrivals);
        assert!(summary.arrivals > 0, "two hours at 30/hour should see arrivals");
    }

    #[test]
    fn zero_atms_serve_nobody() {
        let mut cfg = config();
        cfg.atms = 0;
        cfg.max_queue = None;
        let mut sim = Simulation::new(cfg).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(0, summary.started);
        assert_eq!(0, summary.completed);
        assert!(summary.utilization.is_empty());
        assert!(summary.avg_queue_len > 0.0, "line should only ever grow");
        assert_eq!(summary.arrivals as usize, sim.line().len());
    }

    #[test]
    fn zero_capacity_balks_every_arrival() {
        let mut cfg = config();
        cfg.atms = 1;
        cfg.max_queue = Some(0);
        cfg.arrival_rate_per_hour = 240.0;
        let mut sim = Simulation::new(cfg).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(summary.arrivals, summary.balked);
        assert_eq!(0, summary.started);
        assert_eq!(0.0, summary.avg_queue_len);
    }

    #[test]
    fn unlimited_capacity_never_balks() {
        let mut cfg = config();
        cfg.max_queue = None;
        cfg.arrival_rate_per_hour = 600.0;
        let mut sim = Simulation::new(cfg).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(0, summary.balked);
    }

    #[test]
    fn identical_seeds_give_identical_summaries() {
        let mut first = Simulation::new(config()).unwrap();
        let mut second = Simulation::new(config()).unwrap();

        assert_eq!(first.run().unwrap(), second.run().unwrap());
    }

    #[test]
    fn p95_on_a_run_with_no_service_is_zero() {
        let mut cfg = config();
        cfg.atms = 0;
        cfg.max_queue = None;
        let mut sim = Simulation::new(cfg).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(0.0, summary.p95_wait_min);
        assert_eq!(0.0, summary.avg_wait_min);
    }
}
