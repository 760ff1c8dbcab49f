/// Append-only per-iteration training histories.
///
/// `errors` holds `Σ|a3 - y|` for every backprop step; `correctness` holds
/// 1.0 when the step's prediction matched the label and 0.0 otherwise.
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    errors: Vec<f64>,
    correctness: Vec<f64>,
}

impl MetricsTracker {
    pub fn new() -> MetricsTracker {
        MetricsTracker::default()
    }

    pub fn record(&mut self, error: f64, correct: bool) {
        self.errors.push(error);
        self.correctness.push(if correct { 1.0 } else { 0.0 });
    }

    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    pub fn correctness(&self) -> &[f64] {
        &self.correctness
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Mean error over the last `window` iterations.
    pub fn average_error(&self, window: usize) -> f64 {
        running_average(window, &self.errors)
    }

    /// Fraction of correct predictions over the last `window` iterations.
    pub fn average_accuracy(&self, window: usize) -> f64 {
        running_average(window, &self.correctness)
    }
}

/// Mean of the last `min(window, history.len())` values. An empty history
/// (or a zero window) averages to 0.0.
pub fn running_average(window: usize, history: &[f64]) -> f64 {
    let n = window.min(history.len());
    if n == 0 {
        return 0.0;
    }
    history[history.len() - n..].iter().sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_history_averages_everything() {
        let h = [1.0, 2.0, 3.0];
        assert_eq!(running_average(1000, &h), 2.0);
    }

    #[test]
    fn long_history_averages_the_tail() {
        let h: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        assert_eq!(running_average(4, &h), (7.0 + 8.0 + 9.0 + 10.0) / 4.0);
        assert_eq!(running_average(10, &h), 5.5);
    }

    #[test]
    fn empty_history_is_guarded() {
        assert_eq!(running_average(1000, &[]), 0.0);
        assert_eq!(running_average(0, &[1.0]), 0.0);
        assert_eq!(MetricsTracker::new().average_accuracy(5000), 0.0);
    }

    #[test]
    fn record_appends_to_both_histories() {
        let mut m = MetricsTracker::new();
        m.record(0.4, true);
        m.record(1.2, false);
        assert_eq!(m.errors(), &[0.4, 1.2]);
        assert_eq!(m.correctness(), &[1.0, 0.0]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.average_accuracy(1), 0.0);
        assert_eq!(m.average_accuracy(2), 0.5);
        assert!((m.average_error(2) - 0.8).abs() < 1e-12);
    }
}
