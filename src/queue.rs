use crate::Customer;

use std::collections::VecDeque;

/// The facility's single FIFO waiting line, with time-weighted occupancy
/// sampling on the side.
///
/// Customers are owned by the line while queued and handed back out of
/// [`dequeue()`] when an ATM picks them up. Alongside the queue itself the
/// line records `(time, length)` samples from which [`average_len()`]
/// integrates a time-weighted average over the run.
///
/// [`dequeue()`]: WaitingLine::dequeue
/// [`average_len()`]: WaitingLine::average_len
#[derive(Debug, Default)]
pub struct WaitingLine {
    queue: VecDeque<Customer>,
    samples: Vec<(f64, usize)>,
}

impl WaitingLine {
    /// An empty line with no recorded samples.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a customer to the tail of the line.
    pub fn enqueue(&mut self, customer: Customer) {
        self.queue.push_back(customer);
    }

    /// Remove and return the customer at the head of the line, if any.
    pub fn dequeue(&mut self) -> Option<Customer> {
        self.queue.pop_front()
    }

    /// Current number of waiting customers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the line is currently empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Record a `(time, length)` occupancy sample at the current instant.
    pub fn sample(&mut self, now: f64) {
        self.samples.push((now, self.queue.len()));
    }

    /// Recorded occupancy samples, in append order.
    pub fn samples(&self) -> &[(f64, usize)] {
        &self.samples
    }

    /// Time-weighted average line length over `[0, horizon]`.
    ///
    /// The samples define a piecewise-constant step function: each interval
    /// between consecutive samples contributes `(t1 - t0) * length_at_t0` to
    /// the integrated area, the current length stands in as a synthetic
    /// trailing sample when the last recorded one precedes `horizon`, and the
    /// area is divided by `horizon`.
    ///
    /// Correctness precondition: [`sample()`] must have been called at every
    /// length-changing instant, plus at `t = 0` and at the horizon. Gaps in
    /// sampling silently flatten the estimate; this is a documented limitation
    /// of the estimator, not something the method tries to detect. Returns 0
    /// when no samples were recorded.
    ///
    /// [`sample()`]: WaitingLine::sample
    pub fn average_len(&self, horizon: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let mut area = 0.0;
        for pair in self.samples.windows(2) {
            let (t0, len0) = pair[0];
            let (t1, _) = pair[1];
            area += (t1 - t0) * len0 as f64;
        }
        if let Some(&(last_t, _)) = self.samples.last() {
            if last_t < horizon {
                area += (horizon - last_t) * self.queue.len() as f64;
            }
        }
        area / horizon.max(1e-12)
    }
}
