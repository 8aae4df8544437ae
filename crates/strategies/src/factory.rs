use crate::Strategy;
use crate::bollinger_breakout::BollingerBreakout;
use crate::error::StrategyError;
use crate::hybrid_smart::HybridSmart;
use crate::macd_crossover::MacdCrossover;
use crate::multi_signal::MultiSignal;
use crate::proximity_bollinger::ProximityBollinger;
use crate::rsi_reversion::RsiReversion;
use configuration::Strategies;
use core_types::StrategyId;

/// Creates a new strategy instance based on the provided ID and parameter sets.
///
/// Every call returns a fresh instance with empty internal state, so each
/// backtest run should call this rather than reuse a strategy.
pub fn create_strategy(
    id: StrategyId,
    params: &Strategies,
) -> Result<Box<dyn Strategy>, StrategyError> {
    // The compiler will error here if a new StrategyId is added but not handled.
    let strategy: Box<dyn Strategy> = match id {
        StrategyId::Rsi => Box::new(RsiReversion::new(params.rsi.clone())?),
        StrategyId::Macd => Box::new(MacdCrossover::new(params.macd.clone())?),
        StrategyId::Bollinger => Box::new(BollingerBreakout::new(params.bollinger.clone())?),
        StrategyId::ProximityBollinger => {
            Box::new(ProximityBollinger::new(params.proximity_bollinger.clone())?)
        }
        StrategyId::MultiSignal => Box::new(MultiSignal::new(params.multi_signal.clone())?),
        StrategyId::HybridSmart => Box::new(HybridSmart::new(params.hybrid_smart.clone())?),
    };
    Ok(strategy)
}
