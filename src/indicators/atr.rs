// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the smoothed average of TR:
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
// =============================================================================

use super::true_range;

/// ATR series aligned with the input bars (slices must share a length).
///
/// The first TR needs a previous close, so the first ATR value sits at index
/// `period`. Fewer than `period + 1` bars => all `None`.
pub fn atr_series(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = close.len().min(high.len()).min(low.len());
    let mut out = vec![None; close.len()];
    if period == 0 || n < period + 1 {
        return out;
    }

    // tr[k] belongs to bar k + 1.
    let tr: Vec<f64> = (1..n)
        .map(|i| true_range(high[i], low[i], close[i - 1]))
        .collect();

    let seed = tr[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return out;
    }
    out[period] = Some(seed);

    let period_f = period as f64;
    let mut atr = seed;
    for (k, &value) in tr.iter().enumerate().skip(period) {
        atr = (atr * (period_f - 1.0) + value) / period_f;
        if !atr.is_finite() {
            break;
        }
        out[k + 1] = Some(atr);
    }

    out
}
