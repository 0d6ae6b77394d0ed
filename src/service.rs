use rand::Rng;
use rand_distr::{Distribution, LogNormal};

/// Log-normal service durations, parameterized by a target mean and a
/// coefficient of variation (standard deviation over mean).
///
/// The underlying normal parameters are derived once at construction:
/// `sigma^2 = ln(1 + cv^2)` and `mu = ln(mean) - sigma^2 / 2`, which makes the
/// sampled durations have exactly the requested mean. A coefficient of
/// variation of zero collapses the distribution to a point mass at the mean,
/// i.e. deterministic service.
#[derive(Debug)]
pub struct ServiceTimes {
    duration_distr: LogNormal<f64>,
    mean_min: f64,
    cv: f64,
}

impl ServiceTimes {
    /// Build a sampler with the given mean duration (minutes) and coefficient
    /// of variation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidServiceMean`] unless the mean is finite and
    /// strictly positive, and [`Error::InvalidServiceCv`] unless the
    /// coefficient of variation is finite and non-negative.
    ///
    /// [`Error::InvalidServiceMean`]: crate::Error::InvalidServiceMean
    /// [`Error::InvalidServiceCv`]: crate::Error::InvalidServiceCv
    pub fn new(mean_min: f64, cv: f64) -> crate::Result<Self> {
        if !mean_min.is_finite() || mean_min <= 0.0 {
            return Err(crate::Error::InvalidServiceMean { mean_min });
        }
        if !cv.is_finite() || cv < 0.0 {
            return Err(crate::Error::InvalidServiceCv { cv });
        }

        let sigma_squared = (1.0 + cv * cv).ln();
        let mu = mean_min.ln() - sigma_squared / 2.0;
        let duration_distr = LogNormal::new(mu, sigma_squared.sqrt())
            .map_err(|_| crate::Error::InvalidServiceCv { cv })?;
        Ok(Self {
            duration_distr,
            mean_min,
            cv,
        })
    }

    /// Target mean duration, in minutes.
    pub fn mean_min(&self) -> f64 {
        self.mean_min
    }

    /// Configured coefficient of variation.
    pub fn cv(&self) -> f64 {
        self.cv
    }

    /// Draw one service duration, in minutes.
    ///
    /// Degenerate draws at the boundaries of the underlying uniform source
    /// are resampled locally; the returned duration is always finite and
    /// strictly positive.
    pub fn next_duration<R: Rng>(&self, rng: &mut R) -> f64 {
        loop {
            let duration = self.duration_distr.sample(rng);
            if duration.is_finite() && duration > 0.0 {
                return duration;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn non_positive_mean_is_rejected() {
        assert!(matches!(
            ServiceTimes::new(0.0, 0.5),
            Err(crate::Error::InvalidServiceMean { .. })
        ));
        assert!(ServiceTimes::new(-2.0, 0.5).is_err());
        assert!(ServiceTimes::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn negative_cv_is_rejected() {
        assert!(matches!(
            ServiceTimes::new(1.0, -0.1),
            Err(crate::Error::InvalidServiceCv { .. })
        ));
        assert!(ServiceTimes::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn zero_cv_gives_deterministic_durations() {
        let service = ServiceTimes::new(0.5, 0.0).unwrap();
        let mut rng = Pcg64::seed_from_u64(3);

        for _ in 0..100 {
            let duration = service.next_duration(&mut rng);
            assert!((duration - 0.5).abs() < 1e-9, "expected 0.5, got {duration}");
        }
    }

    #[test]
    fn sample_mean_tracks_the_configured_mean() {
        let service = ServiceTimes::new(4.0, 0.75).unwrap();
        let mut rng = Pcg64::seed_from_u64(42);

        let draws = 50_000;
        let mut total = 0.0;
        for _ in 0..draws {
            let duration = service.next_duration(&mut rng);
            assert!(duration > 0.0 && duration.is_finite());
            total += duration;
        }
        let mean = total / draws as f64;
        assert!((mean - 4.0).abs() < 0.15, "sample mean {mean} too far from 4.0");
    }
}
