/// A customer moving through the facility.
///
/// Plain value record with no behavior: it exists from the arrival event that
/// mints it until it departs or balks, after which only aggregated metrics
/// retain any trace of it. Ids are unique and monotonically assigned by
/// [`ArrivalProcess`].
///
/// [`ArrivalProcess`]: crate::ArrivalProcess
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Customer {
    /// Unique, monotonically assigned identity.
    pub id: u64,
    /// Simulated time (minutes) at which the customer arrived.
    pub arrival_time: f64,
}

/// One automated teller machine in the service pool.
///
/// The pool is created once at simulation start and identities are stable for
/// the whole run. `busy` toggles true on service start and false on departure;
/// `busy_time` only ever grows, accruing the full service duration at the
/// moment service starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Atm {
    /// Stable index of this machine within the pool.
    pub id: usize,
    /// Whether a customer is currently being served here.
    pub busy: bool,
    /// Total minutes of service this machine has dispensed.
    pub busy_time: f64,
}

impl Atm {
    /// A fresh, idle machine with no accumulated service time.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            busy: false,
            busy_time: 0.0,
        }
    }
}
