use ordered_float::OrderedFloat;

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Helper struct for the event queue. Holds the payload alongside the data
/// necessary to sort events within the priority queue, namely the execution
/// time and a record of the event's insertion sequence.
///
/// The implementation of [`Ord`] on this struct cares first about the
/// execution time, comparing the insertion sequences only to break ties. Two
/// events scheduled for the identical time therefore execute in submission
/// order, which is what keeps a run deterministic; replacing this with an
/// unordered or hash-based structure would break that guarantee.
#[derive(Debug)]
struct EventHolder<E> {
    time: OrderedFloat<f64>,
    seq: u64,
    event: E,
}

impl<E> PartialEq for EventHolder<E> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.time == other.time
    }
}

impl<E> Eq for EventHolder<E> {}

impl<E> PartialOrd for EventHolder<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for EventHolder<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            unequal => unequal,
        }
    }
}

/// Priority queue of scheduled events; the kernel of the simulation.
///
/// Events execute in ascending order of execution time, with ties broken by
/// the order in which they were scheduled. The queue owns the simulated clock:
/// time is a non-decreasing number of minutes that advances only to the
/// execution time of the next dequeued event, never on a fixed tick.
///
/// The queue is generic over the payload type so the kernel stays independent
/// of what an event *means*; the driver supplies a plain enum and matches on
/// it in the handler passed to [`run_until()`].
///
/// [`run_until()`]: EventQueue::run_until
#[derive(Debug)]
pub struct EventQueue<E> {
    events: BinaryHeap<Reverse<EventHolder<E>>>,
    now: f64,
    events_added: u64,
}

impl<E> EventQueue<E> {
    /// Construct an empty queue with the clock set to zero.
    pub fn new() -> Self {
        Self {
            events: BinaryHeap::new(),
            now: 0.0,
            events_added: 0,
        }
    }

    /// The current simulated time, in minutes.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether any events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Schedule an event `delay` minutes from now.
    ///
    /// The event is immutable once scheduled: its execution time and its
    /// position in the tie-break order are fixed at this point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDelay`] if `delay` is negative or non-finite,
    /// with no modification to the queue. A negative delay would rewind the
    /// clock and almost certainly indicates a logical bug at the call site.
    ///
    /// [`Error::InvalidDelay`]: crate::Error::InvalidDelay
    pub fn schedule(&mut self, delay: f64, event: E) -> crate::Result<()> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(crate::Error::InvalidDelay { delay });
        }

        let seq = self.next_seq();
        self.events.push(Reverse(EventHolder {
            time: OrderedFloat(self.now + delay),
            seq,
            event,
        }));
        Ok(())
    }

    /// Helper to make sure the insertion-sequence counter advances the same
    /// way for every scheduling call.
    fn next_seq(&mut self) -> u64 {
        let seq = self.events_added;
        self.events_added += 1;
        seq
    }

    /// Pop the next event if its execution time does not exceed `horizon`.
    /// An event past the horizon stays in the queue untouched.
    fn pop_due(&mut self, horizon: f64) -> Option<EventHolder<E>> {
        let due = matches!(self.events.peek(), Some(Reverse(h)) if h.time.into_inner() <= horizon);
        if due {
            self.events.pop().map(|held| held.0)
        } else {
            None
        }
    }

    /// Execute events one at a time, in ascending `(time, sequence)` order,
    /// until the next pending event lies beyond `horizon` or the queue runs
    /// dry.
    ///
    /// For each dispatched event the clock first advances to the event's
    /// execution time, then `handler` receives exclusive access to the queue
    /// (so it may schedule follow-up events) along with the payload. Events
    /// scheduled past the horizon are never dispatched; whatever remains in
    /// the queue at loop exit is implicitly dropped with it.
    ///
    /// After the loop the clock is forced exactly to `horizon`, whether or not
    /// any event landed there, so that time-weighted statistics have a
    /// well-defined upper bound.
    ///
    /// # Errors
    ///
    /// Any error returned by `handler` aborts the loop and is passed back to
    /// the caller unchanged, with the clock left at the failing event's time.
    pub fn run_until<F>(&mut self, horizon: f64, mut handler: F) -> crate::Result<()>
    where
        F: FnMut(&mut Self, E) -> crate::Result<()>,
    {
        while let Some(held) = self.pop_due(horizon) {
            self.now = held.time.into_inner();
            handler(self, held.event)?;
        }
        self.now = horizon;
        Ok(())
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Display for EventQueue<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventQueue with {} scheduled events at current time {:.6}",
            self.events.len(),
            self.now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut EventQueue<u32>, horizon: f64) -> Vec<(f64, u32)> {
        let mut seen = Vec::new();
        queue
            .run_until(horizon, |q, value| {
                seen.push((q.now(), value));
                Ok(())
            })
            .unwrap();
        seen
    }

    #[test]
    fn events_execute_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule(4.0, 1).unwrap();
        queue.schedule(0.5, 2).unwrap();
        queue.schedule(2.0, 3).unwrap();

        let seen = drain(&mut queue, 10.0);
        assert_eq!(vec![(0.5, 2), (2.0, 3), (4.0, 1)], seen);
    }

    #[test]
    fn simultaneous_events_execute_in_submission_order() {
        let mut queue = EventQueue::new();
        for value in 0..5 {
            queue.schedule(1.0, value).unwrap();
        }

        let seen: Vec<u32> = drain(&mut queue, 10.0).into_iter().map(|(_, v)| v).collect();
        assert_eq!(vec![0, 1, 2, 3, 4], seen);
    }

    #[test]
    fn negative_delay_is_rejected() {
        let mut queue = EventQueue::new();
        assert_eq!(
            Err(crate::Error::InvalidDelay { delay: -1.0 }),
            queue.schedule(-1.0, 0),
        );
        assert!(queue.is_empty(), "rejected event must not be enqueued");
    }

    #[test]
    fn nan_delay_is_rejected() {
        let mut queue = EventQueue::new();
        assert!(queue.schedule(f64::NAN, 0).is_err());
    }

    #[test]
    fn events_past_horizon_are_not_dispatched() {
        let mut queue = EventQueue::new();
        queue.schedule(1.0, 1).unwrap();
        queue.schedule(5.0, 2).unwrap();
        queue.schedule(11.0, 3).unwrap();

        let seen = drain(&mut queue, 10.0);
        assert_eq!(vec![(1.0, 1), (5.0, 2)], seen);
        assert_eq!(1, queue.len(), "future event should remain unconsumed");
    }

    #[test]
    fn clock_is_forced_to_horizon_at_termination() {
        let mut queue = EventQueue::new();
        queue.schedule(3.0, 1).unwrap();

        drain(&mut queue, 10.0);
        assert_eq!(10.0, queue.now());

        let empty: Vec<(f64, u32)> = drain(&mut queue, 25.0);
        assert!(empty.is_empty());
        assert_eq!(25.0, queue.now());
    }

    #[test]
    fn dispatched_times_never_decrease() {
        let mut queue = EventQueue::new();
        for delay in [7.0, 1.0, 3.0, 3.0, 0.0, 9.5] {
            queue.schedule(delay, 0).unwrap();
        }

        let times: Vec<f64> = drain(&mut queue, 100.0).into_iter().map(|(t, _)| t).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "clock moved backward: {times:?}");
    }

    #[test]
    fn handler_may_schedule_follow_up_events() {
        let mut queue = EventQueue::new();
        queue.schedule(1.0, 0u32).unwrap();

        let mut fired = Vec::new();
        queue
            .run_until(5.5, |q, generation| {
                fired.push((q.now(), generation));
                q.schedule(1.0, generation + 1)
            })
            .unwrap();

        // one firing per minute until the next would land past the horizon
        assert_eq!(vec![(1.0, 0), (2.0, 1), (3.0, 2), (4.0, 3), (5.0, 4)], fired);
        assert_eq!(5.5, queue.now());
    }

    #[test]
    fn handler_error_aborts_the_loop() {
        let mut queue = EventQueue::new();
        queue.schedule(1.0, 1).unwrap();
        queue.schedule(2.0, 2).unwrap();

        let result = queue.run_until(10.0, |q, _| q.schedule(-1.0, 0));
        assert!(result.is_err());
        assert_eq!(1.0, queue.now(), "clock should stop at the failing event");
    }
}
