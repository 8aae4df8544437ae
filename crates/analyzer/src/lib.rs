use crate::error::AnalyzerError;
use configuration::AnalysisConfig;
use optimizer::RunSummary;
use rust_decimal::Decimal;
use serde::Serialize;

pub mod error;

/// A run summary together with its analysis score and 1-based rank.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRun {
    pub rank: usize,
    pub score: Decimal,
    pub summary: RunSummary,
}

/// The main analysis engine.
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Filters, scores, and ranks the runs of a grid.
    ///
    /// Runs with equal scores keep their grid order.
    pub fn run(&self, runs: &[RunSummary]) -> Result<Vec<RankedRun>, AnalyzerError> {
        self.validate_weights()?;

        // 1. Fetch
        if runs.is_empty() {
            return Err(AnalyzerError::NoRunsFound);
        }

        // 2. Filter
        let filtered = self.filter_runs(runs);
        if filtered.is_empty() {
            tracing::warn!(runs = runs.len(), "Every run was filtered out");
            return Ok(vec![]); // Return empty if all were filtered out
        }

        // 3. Score
        let mut scored = self.score_runs(filtered);

        // 4. Rank
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        for (index, ranked) in scored.iter_mut().enumerate() {
            ranked.rank = index + 1;
        }

        Ok(scored)
    }

    fn validate_weights(&self) -> Result<(), AnalyzerError> {
        let w = &self.config.scoring_weights;
        let weights = [w.weight_total_return, w.weight_win_rate, w.weight_sharpe];
        if weights.iter().any(|weight| weight.is_sign_negative()) {
            return Err(AnalyzerError::InvalidWeights("weights must not be negative".to_string()));
        }
        if weights.iter().all(|weight| weight.is_zero()) {
            return Err(AnalyzerError::InvalidWeights("at least one weight must be positive".to_string()));
        }
        Ok(())
    }

    /// Applies hard filters to remove unacceptable runs.
    fn filter_runs<'a>(&self, runs: &'a [RunSummary]) -> Vec<&'a RunSummary> {
        let filters = &self.config.filters;
        runs.iter()
            .filter(|r| {
                let passes_trades = r.total_trades >= filters.min_total_trades;
                let passes_drawdown = r.max_drawdown_pct.abs() <= filters.max_drawdown_pct;
                passes_trades && passes_drawdown
            })
            .collect()
    }

    /// Normalizes and applies the weighted scoring function to each run.
    fn score_runs(&self, runs: Vec<&RunSummary>) -> Vec<RankedRun> {
        // Find min/max for normalization
        let (min_ret, max_ret) = find_min_max(&runs, |r| r.total_return_pct);
        let (min_wr, max_wr) = find_min_max(&runs, |r| r.win_rate_pct);
        let (min_sr, max_sr) = find_min_max(&runs, |r| r.sharpe_ratio);

        let w = &self.config.scoring_weights;
        runs.into_iter()
            .map(|r| {
                let score = normalize(r.total_return_pct, min_ret, max_ret) * w.weight_total_return
                    + normalize(r.win_rate_pct, min_wr, max_wr) * w.weight_win_rate
                    + normalize(r.sharpe_ratio, min_sr, max_sr) * w.weight_sharpe;

                RankedRun { rank: 0, score, summary: r.clone() }
            })
            .collect()
    }
}

/// A helper function to find the min and max of a specific metric.
fn find_min_max<F>(runs: &[&RunSummary], accessor: F) -> (Decimal, Decimal)
where
    F: Fn(&RunSummary) -> Decimal,
{
    runs.iter()
        .map(|r| accessor(*r))
        .fold((Decimal::MAX, Decimal::MIN), |(min, max), val| (min.min(val), max.max(val)))
}

/// Normalizes a value to a 0.0-1.0 scale.
fn normalize(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    if min == max {
        return Decimal::ONE; // Avoid division by zero if all values are the same
    }
    (value - min) / (max - min)
}
