//! # Overview
//!
//! atmsim is a discrete-event simulation of a single-queue, multi-server service
//! facility: customers arrive according to a Poisson process, join one FIFO line
//! (or balk when the line is at capacity), and are served by a pool of identical
//! ATMs whose service durations follow a log-normal distribution. Time advances
//! only to the timestamps of pending events, never on a fixed tick.
//!
//! The crate is organized around a small kernel and the state machine it drives:
//!
//! * [`EventQueue`] is the kernel: a priority queue of events ordered by
//!   `(time, insertion sequence)` that owns the simulated clock and drains
//!   itself up to a horizon. The insertion-sequence tie-break makes
//!   same-instant event ordering deterministic.
//! * [`ArrivalProcess`] and [`ServiceTimes`] are the two stochastic sources,
//!   both driven by a single seeded generator so that a run is fully
//!   reproducible: identical configuration and seed yield an identical event
//!   sequence and an identical [`RunSummary`].
//! * [`WaitingLine`] holds queued customers and records `(time, length)`
//!   samples at every length-changing instant, from which a time-weighted
//!   average queue length is integrated.
//! * [`Simulation`] is the composition root: it validates a [`SimConfig`],
//!   wires the pieces together, runs to the horizon, and produces an immutable
//!   [`RunSummary`].
//!
//! The core performs no I/O. Anything a caller wants to log or persist is
//! delivered through the [`Observer`] hook trait as pure notifications; the
//! bundled demos show a stdout event log and a CSV/JSON batch reporter built
//! entirely on those hooks.
//!
//! # Features
//!
//! atmsim offers one feature, `serde`, which derives `Serialize`/`Deserialize`
//! on [`SimConfig`], [`RunSummary`], and [`Timeslice`] so that configurations
//! and results can be exchanged as JSON or similar. It is disabled by default
//! to avoid a potentially unnecessary dependency.

mod arrivals;
mod entities;
mod error;
mod metrics;
mod observe;
mod queue;
mod scheduler;
mod service;
mod sim;

pub use arrivals::ArrivalProcess;
pub use entities::{Atm, Customer};
pub use error::{Error, Result};
pub use metrics::{Metrics, RunSummary};
pub use observe::{Observer, Timeslice};
pub use queue::WaitingLine;
pub use scheduler::EventQueue;
pub use service::ServiceTimes;
pub use sim::{SimConfig, SimEvent, Simulation};
