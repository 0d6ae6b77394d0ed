use crate::Customer;

use rand::Rng;
use rand_distr::{Distribution, Exp};

/// Poisson arrival stream: exponentially distributed inter-arrival gaps at a
/// constant rate, which makes the process memoryless and stationary by
/// construction.
///
/// The rate is supplied in customers per hour and converted once to a
/// per-minute lambda, since the simulation clock runs in minutes. The process
/// also mints each arriving [`Customer`], handing out unique, monotonically
/// increasing ids.
///
/// The stream is self-renewing: the arrival handler draws the next gap with
/// [`next_delay()`] each time it fires and reschedules itself only while the
/// next arrival would still land within the horizon.
///
/// [`next_delay()`]: ArrivalProcess::next_delay
#[derive(Debug)]
pub struct ArrivalProcess {
    delay_distr: Exp<f64>,
    lambda_per_min: f64,
    next_id: u64,
}

impl ArrivalProcess {
    /// Build a process arriving at `rate_per_hour` customers per hour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRate`] unless the rate is finite and strictly
    /// positive.
    ///
    /// [`Error::InvalidRate`]: crate::Error::InvalidRate
    pub fn new(rate_per_hour: f64) -> crate::Result<Self> {
        if !rate_per_hour.is_finite() || rate_per_hour <= 0.0 {
            return Err(crate::Error::InvalidRate { rate_per_hour });
        }
        let lambda_per_min = rate_per_hour / 60.0;
        let delay_distr =
            Exp::new(lambda_per_min).map_err(|_| crate::Error::InvalidRate { rate_per_hour })?;
        Ok(Self {
            delay_distr,
            lambda_per_min,
            next_id: 1,
        })
    }

    /// Arrival intensity in customers per minute.
    pub fn lambda_per_min(&self) -> f64 {
        self.lambda_per_min
    }

    /// Draw the next inter-arrival gap, in minutes, with mean `1 / lambda`.
    ///
    /// A uniform draw landing exactly on a boundary of the unit interval
    /// would make the underlying logarithmic transform degenerate (a zero or
    /// infinite gap); such draws are discarded and resampled locally, so the
    /// returned gap is always finite and strictly positive.
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> f64 {
        loop {
            let delay = self.delay_distr.sample(rng);
            if delay.is_finite() && delay > 0.0 {
                return delay;
            }
        }
    }

    /// Mint the customer arriving at simulated time `now`.
    pub fn mint(&mut self, now: f64) -> Customer {
        let id = self.next_id;
        self.next_id += 1;
        Customer {
            id,
            arrival_time: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn non_positive_rate_is_rejected() {
        assert!(matches!(
            ArrivalProcess::new(0.0),
            Err(crate::Error::InvalidRate { .. })
        ));
        assert!(ArrivalProcess::new(-4.0).is_err());
        assert!(ArrivalProcess::new(f64::NAN).is_err());
    }

    #[test]
    fn rate_converts_to_per_minute_lambda() {
        let process = ArrivalProcess::new(60.0).unwrap();
        assert!((process.lambda_per_min() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn customer_ids_are_unique_and_monotonic() {
        let mut process = ArrivalProcess::new(30.0).unwrap();
        let a = process.mint(0.5);
        let b = process.mint(1.5);
        let c = process.mint(1.5);

        assert_eq!(1, a.id);
        assert_eq!(2, b.id);
        assert_eq!(3, c.id);
        assert_eq!(0.5, a.arrival_time);
    }

    #[test]
    fn gaps_are_positive_and_average_near_the_mean() {
        let process = ArrivalProcess::new(60.0).unwrap(); // mean gap 1 minute
        let mut rng = Pcg64::seed_from_u64(7);

        let draws = 20_000;
        let mut total = 0.0;
        for _ in 0..draws {
            let gap = process.next_delay(&mut rng);
            assert!(gap > 0.0 && gap.is_finite());
            total += gap;
        }
        let mean = total / draws as f64;
        assert!((mean - 1.0).abs() < 0.05, "sample mean {mean} too far from 1.0");
    }
}
