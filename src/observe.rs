use crate::Customer;

/// Periodic snapshot of facility state, emitted through
/// [`Observer::on_timeslice`] at the configured sampling interval.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeslice {
    /// Simulated time of the snapshot, minutes.
    pub now: f64,
    /// Customers waiting in the line.
    pub queue_len: usize,
    /// Customers currently being served.
    pub in_service: usize,
    /// Completions so far.
    pub completed: u64,
    /// Balks so far.
    pub balked: u64,
    /// Busy flag per ATM, indexed by machine id.
    pub atm_busy: Vec<bool>,
}

/// Observation hooks a caller may register with [`Simulation::run_with()`].
///
/// Every method is a pure notification with a default no-op body: the core's
/// correctness does not depend on any hook being registered, and hooks must
/// not be used to influence the run. They exist so that formatting, printing,
/// and file writing stay entirely outside the core; the bundled demos build a
/// stdout event log and a CSV reporter on nothing but this trait.
///
/// Each hook receives the current simulated time (minutes) and the identifiers
/// of the entities involved.
///
/// [`Simulation::run_with()`]: crate::Simulation::run_with
#[allow(unused_variables)]
pub trait Observer {
    /// A customer arrived, before any admission decision.
    fn on_arrival(&mut self, now: f64, customer: &Customer) {}

    /// An arriving customer found the line at capacity and left.
    fn on_balk(&mut self, now: f64, customer: &Customer) {}

    /// A customer reached an ATM. `wait_min` is the time spent in line and
    /// `service_min` the duration just drawn for this service.
    fn on_service_start(&mut self, now: f64, atm_id: usize, customer: &Customer, wait_min: f64, service_min: f64) {}

    /// A customer's service finished and the ATM went idle.
    fn on_departure(&mut self, now: f64, atm_id: usize, customer_id: u64) {}

    /// Periodic facility snapshot, at most one per configured interval.
    fn on_timeslice(&mut self, slice: &Timeslice) {}
}

/// The no-op observer used by [`Simulation::run()`].
///
/// [`Simulation::run()`]: crate::Simulation::run
#[derive(Debug, Default)]
pub(crate) struct NullObserver;

impl Observer for NullObserver {}
