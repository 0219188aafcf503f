// =============================================================================
// Exponential Moving Average (EMA) and MACD
// =============================================================================
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = value_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` values
// and sits at index `period - 1`.
//
// MACD:
//   line      = EMA_fast - EMA_slow
//   signal    = EMA_signal(line)
//   histogram = line - signal
// =============================================================================

/// EMA series aligned with `values`.
///
/// # Edge cases
/// - `period == 0` or `values.len() < period` => all `None`
/// - A non-finite intermediate value ends the series; later rows stay `None`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let multiplier = 2.0 / (period + 1) as f64;

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return out;
    }
    out[period - 1] = Some(seed);

    let mut prev = seed;
    for (i, &value) in values.iter().enumerate().skip(period) {
        let ema = value * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        out[i] = Some(ema);
        prev = ema;
    }

    out
}

/// EMA over the contiguous run of `Some` values that starts at the first
/// populated row. Used for the MACD signal line, whose input has a warm-up.
fn ema_of_populated(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let Some(start) = series.iter().position(Option::is_some) else {
        return vec![None; series.len()];
    };

    let run: Vec<f64> = series[start..].iter().map_while(|v| *v).collect();

    let mut out = vec![None; start];
    out.extend(ema_series(&run, period));
    out.resize(series.len(), None);
    out
}

/// The three MACD series, each aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal_line = ema_of_populated(&line, signal);

    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}
