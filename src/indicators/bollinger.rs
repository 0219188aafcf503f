// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA(period), upper/lower = middle ± k·σ (population σ).
// Band width is the normalised distance: (upper - lower) / middle * 100.

/// Bands for a single window.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

/// Bands computed over the trailing `period` values of `window`.
///
/// Returns `None` when the window is too short, the middle band is zero, or
/// the width is non-finite.
pub fn calculate_bollinger(window: &[f64], period: usize, num_std: f64) -> Option<BollingerResult> {
    if period == 0 || window.len() < period {
        return None;
    }

    let tail = &window[window.len() - period..];
    let middle = tail.iter().sum::<f64>() / period as f64;
    if middle == 0.0 {
        return None;
    }

    let variance = tail.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let spread = num_std * variance.sqrt();

    let upper = middle + spread;
    let lower = middle - spread;
    let width = (upper - lower) / middle * 100.0;

    width.is_finite().then_some(BollingerResult {
        upper,
        middle,
        lower,
        width,
    })
}

/// Rolling bands, one entry per close (`None` for the first `period - 1`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub width: Vec<Option<f64>>,
}

pub fn bollinger_series(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let mut series = BollingerSeries::default();
    for end in 1..=closes.len() {
        let bands = calculate_bollinger(&closes[..end], period, num_std);
        series.upper.push(bands.as_ref().map(|b| b.upper));
        series.middle.push(bands.as_ref().map(|b| b.middle));
        series.lower.push(bands.as_ref().map(|b| b.lower));
        series.width.push(bands.as_ref().map(|b| b.width));
    }
    series
}
