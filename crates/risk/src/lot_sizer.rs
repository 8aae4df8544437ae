use crate::RiskManager;
use crate::error::RiskError;
use configuration::{Dca, Simulation};
use core_types::OrderRequest;
use rust_decimal::{Decimal, RoundingStrategy};

/// Budgets are truncated to this many decimal places so that `max_lots`
/// budgets never add up to more than the committed capital.
const BUDGET_DECIMALS: u32 = 8;

/// Splits `initial_capital * capital_fraction` into `max_lots` equal budgets.
#[derive(Debug, Clone)]
pub struct EqualLotSizer {
    lot_budget: Decimal,
    max_lots: u32,
}

impl EqualLotSizer {
    /// Creates a new `EqualLotSizer` with the given configuration parameters.
    pub fn new(simulation: &Simulation, dca: &Dca) -> Result<Self, RiskError> {
        if simulation.initial_capital <= Decimal::ZERO {
            return Err(RiskError::InvalidParameters(
                "initial_capital must be positive".to_string(),
            ));
        }
        if simulation.capital_fraction <= Decimal::ZERO || simulation.capital_fraction > Decimal::ONE {
            return Err(RiskError::InvalidParameters(
                "capital_fraction must be in (0, 1]".to_string(),
            ));
        }
        if dca.max_lots == 0 {
            return Err(RiskError::InvalidParameters("max_lots must be at least 1".to_string()));
        }

        let committed = simulation.initial_capital * simulation.capital_fraction;
        let lot_budget = (committed / Decimal::from(dca.max_lots))
            .round_dp_with_strategy(BUDGET_DECIMALS, RoundingStrategy::ToZero);
        if lot_budget.is_zero() {
            return Err(RiskError::BudgetTooSmall(simulation.initial_capital));
        }

        tracing::debug!(%lot_budget, max_lots = dca.max_lots, "Lot sizing configured");
        Ok(Self { lot_budget, max_lots: dca.max_lots })
    }

    pub fn lot_budget(&self) -> Decimal {
        self.lot_budget
    }
}

impl RiskManager for EqualLotSizer {
    fn size_entry(&self, cash: Decimal) -> Option<OrderRequest> {
        if cash < self.lot_budget {
            tracing::debug!(%cash, lot_budget = %self.lot_budget, "Insufficient cash for lot");
            return None;
        }
        Some(OrderRequest::Buy { notional: self.lot_budget })
    }

    fn max_lots(&self) -> u32 {
        self.max_lots
    }
}
