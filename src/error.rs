/// Errors that may be encountered while configuring
/// or scheduling a simulation.
///
/// Every variant is a fail-fast configuration error:
/// it is raised before any simulated time elapses and
/// is never recovered internally. A run either
/// completes to its horizon or fails here; there is no
/// mid-run failure mode, since all state transitions
/// are local in-memory operations. An error is fatal
/// only to the run instance that raised it and does
/// not affect other, independent instances.
///
/// Degenerate random draws (a uniform sample landing
/// on a distribution boundary) are deliberately absent
/// from this taxonomy: they are handled locally by
/// resampling and never surface to the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A negative or non-finite delay was passed to
    /// [`EventQueue::schedule()`]. Likely a logical bug
    /// at the call site, e.g. subtracting instead of
    /// adding an offset to the current time.
    ///
    /// [`EventQueue::schedule()`]: crate::EventQueue::schedule
    InvalidDelay { delay: f64 },
    /// The arrival rate was not a finite, strictly
    /// positive number of customers per hour.
    InvalidRate { rate_per_hour: f64 },
    /// The mean service time was not a finite,
    /// strictly positive number of minutes.
    InvalidServiceMean { mean_min: f64 },
    /// The service-time coefficient of variation was
    /// negative or non-finite. Zero is accepted and
    /// makes service deterministic.
    InvalidServiceCv { cv: f64 },
    /// The simulation horizon was negative or
    /// non-finite.
    InvalidHorizon { horizon_min: f64 },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidDelay { delay } => {
                write!(f, "event delay must be non-negative and finite, got {delay}")
            },
            Self::InvalidRate { rate_per_hour } => {
                write!(f, "arrival rate must be > 0 customers/hour, got {rate_per_hour}")
            },
            Self::InvalidServiceMean { mean_min } => {
                write!(f, "mean service time must be > 0 minutes, got {mean_min}")
            },
            Self::InvalidServiceCv { cv } => {
                write!(f, "service-time coefficient of variation must be >= 0, got {cv}")
            },
            Self::InvalidHorizon { horizon_min } => {
                write!(f, "simulation horizon must be >= 0 minutes, got {horizon_min}")
            },
        }
    }
}

impl std::error::Error for Error {}

/// [`std::result::Result`] specialized to [`atmsim::Error`].
///
/// A type alias that simplifies the signatures of various functions in atmsim.
///
/// [`atmsim::Error`]: Error
pub type Result<T> = std::result::Result<T, Error>;
