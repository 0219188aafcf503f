// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running total of volume, added on bars that did not close lower than the
// previous bar and subtracted on bars that did. The first bar counts as an
// up bar, so OBV_0 = volume_0.

pub fn obv_series(close: &[f64], volume: &[f64]) -> Vec<Option<f64>> {
    let n = close.len().min(volume.len());
    let mut out = vec![None; close.len()];

    let mut total = 0.0;
    for i in 0..n {
        let down = i > 0 && close[i] < close[i - 1];
        total += if down { -volume[i] } else { volume[i] };
        if !total.is_finite() {
            break;
        }
        out[i] = Some(total);
    }
    out
}
