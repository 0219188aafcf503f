// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
// =============================================================================

use super::true_range;

/// ADX series aligned with the input bars.
///
/// The first DX value lands on bar `period` (after `period` bar-to-bar
/// transitions); ADX is seeded with the mean of the first `period` DX values,
/// so the first ADX value sits at index `2 * period - 1`.
pub fn adx_series(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = close.len().min(high.len()).min(low.len());
    let mut out = vec![None; close.len()];
    if period == 0 || n < 2 * period {
        return out;
    }

    // --- Steps 1 & 2: per-transition +DM, -DM, TR (index k => bar k + 1) ---
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    let mut tr = Vec::with_capacity(n - 1);

    for i in 1..n {
        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];

        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
        tr.push(true_range(high[i], low[i], close[i - 1]));
    }

    // --- Step 3: initial Wilder sums -----------------------------------------
    let period_f = period as f64;
    let mut smooth_plus: f64 = plus_dm[..period].iter().sum();
    let mut smooth_minus: f64 = minus_dm[..period].iter().sum();
    let mut smooth_tr: f64 = tr[..period].iter().sum();

    // --- Steps 4 & 5: DX per bar, starting at bar `period` -------------------
    let mut dx_values: Vec<f64> = Vec::with_capacity(n - period);
    match compute_dx(smooth_plus, smooth_minus, smooth_tr) {
        Some(dx) => dx_values.push(dx),
        None => return out,
    }
    for k in period..tr.len() {
        smooth_plus = smooth_plus - smooth_plus / period_f + plus_dm[k];
        smooth_minus = smooth_minus - smooth_minus / period_f + minus_dm[k];
        smooth_tr = smooth_tr - smooth_tr / period_f + tr[k];

        match compute_dx(smooth_plus, smooth_minus, smooth_tr) {
            Some(dx) => dx_values.push(dx),
            None => break,
        }
    }

    if dx_values.len() < period {
        return out;
    }

    // --- Step 6: ADX ----------------------------------------------------------
    // dx_values[j] belongs to bar `period + j`.
    let seed = dx_values[..period].iter().sum::<f64>() / period_f;
    if !seed.is_finite() {
        return out;
    }
    out[2 * period - 1] = Some(seed);

    let mut adx = seed;
    for (j, &dx) in dx_values.iter().enumerate().skip(period) {
        adx = (adx * (period_f - 1.0) + dx) / period_f;
        if !adx.is_finite() {
            break;
        }
        out[period + j] = Some(adx);
    }

    out
}

/// DX from smoothed +DM, -DM, and TR. `None` on a zero or non-finite range.
fn compute_dx(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> Option<f64> {
    if smooth_tr == 0.0 {
        return None;
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return Some(0.0);
    }

    let dx = ((plus_di - minus_di).abs() / di_sum) * 100.0;
    dx.is_finite().then_some(dx)
}
