use crate::error::{IndicatorError, check_lengths, check_period};
use crate::moving_average::{ema, sma};
use ta::Next;
use ta::indicators::{Maximum, Minimum};

/// Relative strength index.
///
/// Price deltas start at zero for the first element; gains and losses are
/// averaged over the trailing `period` deltas (shorter at the start). When
/// the average loss is zero the RSI is 100.
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_period("rsi", period)?;

    let deltas: Vec<f64> = closes
        .iter()
        .enumerate()
        .map(|(i, c)| if i == 0 { 0.0 } else { c - closes[i - 1] })
        .collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    Ok((0..closes.len())
        .map(|i| {
            let avg_gain = trailing_mean(&gains, i, period);
            let avg_loss = trailing_mean(&losses, i, period);
            if avg_loss == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
            }
        })
        .collect())
}

// Summed directly so that a window of zeros averages to exactly zero.
fn trailing_mean(values: &[f64], index: usize, period: usize) -> f64 {
    let start = (index + 1).saturating_sub(period);
    let window = &values[start..=index];
    window.iter().sum::<f64>() / window.len() as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// `macd = EMA(fast) - EMA(slow)`, `signal = EMA(macd, signal)`.
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdSeries, IndicatorError> {
    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema(&line, signal)?;
    let histogram = line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    Ok(MacdSeries {
        macd: line,
        signal: signal_line,
        histogram,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Stochastic oscillator. `%K` is 50 when the high-low range is flat.
pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Result<StochasticSeries, IndicatorError> {
    check_period("stochastic %K", k_period)?;
    check_period("stochastic %D", d_period)?;
    check_lengths(&[highs.len(), lows.len(), closes.len()])?;

    let mut highest = Maximum::new(k_period)?;
    let mut lowest = Minimum::new(k_period)?;

    let k: Vec<f64> = closes
        .iter()
        .zip(highs.iter().zip(lows))
        .map(|(close, (high, low))| {
            let hh = highest.next(*high);
            let ll = lowest.next(*low);
            let range = hh - ll;
            if range == 0.0 {
                50.0
            } else {
                (close - ll) / range * 100.0
            }
        })
        .collect();
    let d = sma(&k, d_period)?;

    Ok(StochasticSeries { k, d })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_is_100_without_losses() {
        let out = rsi(&[1.0, 2.0, 3.0, 4.0], 14).unwrap();
        assert!(out.iter().all(|v| *v == 100.0));

        let flat = rsi(&[5.0, 5.0, 5.0], 2).unwrap();
        assert_eq!(flat, vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn rsi_balances_gains_and_losses() {
        // deltas: 0, +2, -2 -> avg gain 1, avg loss 1 over the last two
        let out = rsi(&[10.0, 12.0, 10.0], 2).unwrap();
        assert!((out[2] - 50.0).abs() < 1e-9);

        let falling = rsi(&[10.0, 9.0, 8.0], 2).unwrap();
        assert!(falling[2].abs() < 1e-9);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let out = macd(&closes, 12, 26, 9).unwrap();
        assert_eq!(out.macd.len(), closes.len());
        assert_eq!(out.macd[0], 0.0);
        for i in 0..closes.len() {
            assert!((out.histogram[i] - (out.macd[i] - out.signal[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn stochastic_defaults_to_50_on_flat_range() {
        let out = stochastic(&[5.0, 5.0], &[5.0, 5.0], &[5.0, 5.0], 3, 2).unwrap();
        assert_eq!(out.k, vec![50.0, 50.0]);
        assert_eq!(out.d, vec![50.0, 50.0]);
    }

    #[test]
    fn stochastic_positions_close_in_range() {
        let highs = [10.0, 12.0, 14.0];
        let lows = [8.0, 9.0, 10.0];
        let closes = [9.0, 11.0, 14.0];
        let out = stochastic(&highs, &lows, &closes, 3, 3).unwrap();
        assert!((out.k[0] - 50.0).abs() < 1e-9);
        assert!((out.k[2] - 100.0).abs() < 1e-9);
        assert!(stochastic(&highs, &lows[..2], &closes, 3, 3).is_err());
    }
}
