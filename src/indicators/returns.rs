// =============================================================================
// Simple and cumulative returns (percent)
// =============================================================================

/// Bar-over-bar return: (close_t / close_{t-1} - 1) * 100. Row 0 is `None`.
pub fn daily_return(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev != 0.0 {
            out[i] = Some((closes[i] / prev - 1.0) * 100.0);
        }
    }
    out
}

/// Return since the first close: (close_t / close_0 - 1) * 100.
pub fn cumulative_return(closes: &[f64]) -> Vec<Option<f64>> {
    match closes.first() {
        Some(&first) if first != 0.0 => closes
            .iter()
            .map(|c| Some((c / first - 1.0) * 100.0))
            .collect(),
        _ => vec![None; closes.len()],
    }
}
