// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
//   ROC = ((close - close_n) / close_n) * 100

/// ROC series aligned with `closes`; the first value sits at index `period`.
/// A zero reference close yields `None` for that row.
pub fn roc_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 {
        return out;
    }

    for i in period..closes.len() {
        let prev = closes[i - period];
        if prev != 0.0 {
            out[i] = Some(((closes[i] - prev) / prev) * 100.0);
        }
    }
    out
}
