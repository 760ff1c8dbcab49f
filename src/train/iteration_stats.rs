/// Running averages reported after every training iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    /// Iteration counter before it is advanced; starts at 0.
    pub iteration: usize,
    pub avg_error_short: f64,
    pub avg_error_long: f64,
    pub avg_accuracy_short: f64,
    pub avg_accuracy_long: f64,
    /// `avg_accuracy_short / avg_accuracy_long`, or `None` while the long
    /// average is still zero.
    pub ratio: Option<f64>,
}
