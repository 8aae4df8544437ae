//! # Optimizer
//!
//! Runs one backtest per (symbol, strategy, parameter set) of a grid and
//! summarises the results. Runs share nothing mutable: each job builds its
//! own strategy, lot sizer, executor and backtester, so the grid is spread
//! across a `rayon` pool without locks.

use crate::error::OptimizerError;
use crate::generator::{ParameterSet, apply_overrides, generate_parameter_sets, space_for_strategy};
use backtester::Backtester;
use configuration::{Config, OptimizerConfig};
use core_types::{Candle, StrategyId};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod error;
pub mod export;
pub mod generator;
pub mod summary;

pub use summary::RunSummary;

/// A single grid point.
#[derive(Debug, Clone)]
struct Job {
    run: usize,
    symbol: String,
    strategy: StrategyId,
    parameters: ParameterSet,
}

/// What a finished optimisation produced.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub job_id: Uuid,
    /// Successful runs, in grid order.
    pub summaries: Vec<RunSummary>,
    pub failed_runs: usize,
}

pub struct Optimizer {
    job_id: Uuid,
    config: OptimizerConfig,
    base_config: Config,
    show_progress: bool,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig, base_config: Config) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            config,
            base_config,
            show_progress: false,
        }
    }

    pub fn with_progress_bar(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Loads `<data_dir>/<symbol>.csv` for every symbol and runs the grid.
    pub fn run(&self) -> Result<OptimizationOutcome, OptimizerError> {
        let mut data = BTreeMap::new();
        for symbol in &self.config.base_config.symbols {
            let path = self.config.base_config.data_dir.join(format!("{}.csv", symbol));
            let (candles, _) = market_data::load_candles_csv(&path)?;
            data.insert(symbol.clone(), candles);
        }
        self.run_with_data(&data)
    }

    /// Runs the grid over already loaded candle series, keyed by symbol.
    pub fn run_with_data(
        &self,
        data: &BTreeMap<String, Vec<Candle>>,
    ) -> Result<OptimizationOutcome, OptimizerError> {
        let span = tracing::info_span!("optimization", job_id = %self.job_id);
        let _entered = span.enter();

        let jobs = self.build_jobs()?;
        let total_runs = jobs.len();
        tracing::info!(
            runs = total_runs,
            threads = rayon::current_num_threads(),
            "Starting optimization"
        );

        let progress_bar = if self.show_progress {
            let bar = ProgressBar::new(total_runs as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                    .progress_chars("=>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        // `collect` on an indexed parallel iterator keeps the job order.
        let results: Vec<Result<RunSummary, OptimizerError>> = jobs
            .par_iter()
            .map(|job| {
                let outcome = self.execute_job(job, data);
                progress_bar.inc(1);
                outcome
            })
            .collect();
        progress_bar.finish_with_message("Optimization runs complete.");

        let mut summaries = Vec::with_capacity(total_runs);
        let mut failed_runs = 0;
        for (job, result) in jobs.iter().zip(results) {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    failed_runs += 1;
                    tracing::warn!(
                        run = job.run,
                        symbol = %job.symbol,
                        strategy = %job.strategy,
                        error = %e,
                        "Backtest run failed"
                    );
                }
            }
        }

        tracing::info!(completed = summaries.len(), failed = failed_runs, "Optimization finished");
        Ok(OptimizationOutcome { job_id: self.job_id, summaries, failed_runs })
    }

    fn build_jobs(&self) -> Result<Vec<Job>, OptimizerError> {
        let base = &self.config.base_config;

        let mut per_strategy = Vec::with_capacity(base.strategies.len());
        for &strategy in &base.strategies {
            let space = space_for_strategy(&self.config.parameter_space, &self.base_config, strategy)?;
            per_strategy.push((strategy, generate_parameter_sets(&space)?));
        }

        let mut jobs = Vec::new();
        for symbol in &base.symbols {
            for (strategy, sets) in &per_strategy {
                for parameters in sets {
                    jobs.push(Job {
                        run: jobs.len(),
                        symbol: symbol.clone(),
                        strategy: *strategy,
                        parameters: parameters.clone(),
                    });
                }
            }
        }
        Ok(jobs)
    }

    fn execute_job(
        &self,
        job: &Job,
        data: &BTreeMap<String, Vec<Candle>>,
    ) -> Result<RunSummary, OptimizerError> {
        let candles = data
            .get(&job.symbol)
            .ok_or(backtester::error::BacktestError::DataUnavailable)?;

        let mut config = apply_overrides(&self.base_config, job.strategy, &job.parameters)?;
        config.backtest.symbol = job.symbol.clone();
        config.backtest.interval = self.config.base_config.interval;

        let mut backtester = Backtester::from_config(&config)?;
        let result = backtester.run(candles)?;
        Ok(RunSummary::from_result(job.run, job.parameters.clone(), &result))
    }
}
