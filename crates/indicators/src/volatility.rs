use crate::error::{IndicatorError, check_lengths, check_period};
use crate::moving_average::{ema, sma};

/// Sample standard deviation (n - 1 divisor) over the trailing `period`
/// values. NaN while fewer than two values are available.
pub fn rolling_std(values: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_period("rolling_std", period)?;

    Ok((0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            let window = &values[start..=i];
            let n = window.len();
            if n < 2 {
                return f64::NAN;
            }
            let mean = window.iter().sum::<f64>() / n as f64;
            let sum_sq: f64 = window.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (n - 1) as f64).sqrt()
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bollinger bands: `middle = SMA(period)`, bands at `middle ± k·stdev`.
pub fn bollinger_bands(
    closes: &[f64],
    period: usize,
    k: f64,
) -> Result<BollingerSeries, IndicatorError> {
    let middle = sma(closes, period)?;
    let std = rolling_std(closes, period)?;

    let upper = middle.iter().zip(&std).map(|(m, s)| m + k * s).collect();
    let lower = middle.iter().zip(&std).map(|(m, s)| m - k * s).collect();

    Ok(BollingerSeries { upper, middle, lower })
}

/// True range. The first bar has no previous close and uses `high - low`.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Result<Vec<f64>, IndicatorError> {
    check_lengths(&[highs.len(), lows.len(), closes.len()])?;

    Ok((0..highs.len())
        .map(|i| {
            let range = highs[i] - lows[i];
            if i == 0 {
                return range;
            }
            let prev_close = closes[i - 1];
            range
                .max((highs[i] - prev_close).abs())
                .max((lows[i] - prev_close).abs())
        })
        .collect())
}

/// Average true range: EMA of the true range.
pub fn atr(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<Vec<f64>, IndicatorError> {
    check_period("atr", period)?;
    let tr = true_range(highs, lows, closes)?;
    ema(&tr, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_std_is_sample_deviation() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8).unwrap();
        assert!(out[0].is_nan());
        // population std of this set is 2, sample std is sqrt(32/7)
        assert!((out[7] - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn bands_are_symmetric_around_the_middle() {
        let closes = [10.0, 11.0, 12.0, 11.0, 10.0];
        let bands = bollinger_bands(&closes, 3, 2.0).unwrap();
        assert!(bands.upper[0].is_nan());
        for i in 1..closes.len() {
            let up = bands.upper[i] - bands.middle[i];
            let down = bands.middle[i] - bands.lower[i];
            assert!((up - down).abs() < 1e-12);
            assert!(up >= 0.0);
        }
        assert!((bands.middle[4] - 11.0).abs() < 1e-12);
    }

    #[test]
    fn true_range_uses_previous_close_gaps() {
        let tr = true_range(&[10.0, 15.0], &[8.0, 14.0], &[9.0, 14.5]).unwrap();
        assert_eq!(tr[0], 2.0);
        assert_eq!(tr[1], 6.0);
    }

    #[test]
    fn atr_smooths_true_range() {
        let out = atr(&[10.0, 15.0], &[8.0, 14.0], &[9.0, 14.5], 3).unwrap();
        assert_eq!(out[0], 2.0);
        assert!((out[1] - 4.0).abs() < 1e-12);
    }
}
