//! Randomized bug injection.

use rand::Rng;

use crate::domain::ports::BugInjector;

/// Flips a biased coin per request.
#[derive(Debug, Clone, Copy)]
pub struct RandomBugInjector {
    probability: f64,
}

impl RandomBugInjector {
    /// `probability` is clamped to `[0.0, 1.0]`; NaN counts as zero.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    pub const fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomBugInjector {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl BugInjector for RandomBugInjector {
    fn decide(&self) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_are_deterministic() {
        let never = RandomBugInjector::new(0.0);
        let always = RandomBugInjector::new(1.0);
        for _ in 0..100 {
            assert!(!never.decide());
            assert!(always.decide());
        }
    }

    #[test]
    fn test_probability_is_clamped() {
        assert!((RandomBugInjector::new(1.7).probability() - 1.0).abs() < f64::EPSILON);
        assert!(RandomBugInjector::new(-0.2).probability().abs() < f64::EPSILON);
        assert!(RandomBugInjector::new(f64::NAN).probability().abs() < f64::EPSILON);
    }

    #[test]
    fn test_coin_flip_produces_both_outcomes() {
        let injector = RandomBugInjector::default();
        let flawed = (0..1000).filter(|_| injector.decide()).count();
        assert!(flawed > 300 && flawed < 700, "got {flawed} flawed out of 1000");
    }
}
