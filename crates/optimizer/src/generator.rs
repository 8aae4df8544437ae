use crate::error::OptimizerError;
use configuration::{Config, ParameterRange, ParameterSpace};
use core_types::StrategyId;
use itertools::Itertools;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// One point of the grid: `section.name` to the value it overrides.
pub type ParameterSet = BTreeMap<String, Value>;

/// Generates every unique combination of parameters from the defined parameter space.
///
/// Combinations are produced in a fixed order (parameters sorted by section
/// then name, values in the order they are listed), so job numbering is
/// reproducible. An empty space yields a single empty set: the base config.
pub fn generate_parameter_sets(space: &ParameterSpace) -> Result<Vec<ParameterSet>, OptimizerError> {
    let entries = space.entries();
    if entries.is_empty() {
        return Ok(vec![ParameterSet::new()]);
    }

    // 1. Convert all parameter ranges into concrete lists of values.
    let mut names = Vec::with_capacity(entries.len());
    let mut value_lists = Vec::with_capacity(entries.len());
    for (name, range) in entries {
        let values = expand_range(&name, range)?;
        if values.is_empty() {
            return Err(OptimizerError::ParameterGeneration(format!(
                "'{}' produces no values",
                name
            )));
        }
        names.push(name);
        value_lists.push(values);
    }

    // 2. Use itertools::multi_cartesian_product to generate all combinations.
    let combinations = value_lists
        .into_iter()
        .multi_cartesian_product()
        .map(|product| names.iter().cloned().zip(product).collect::<ParameterSet>())
        .collect();

    Ok(combinations)
}

fn expand_range(name: &str, range: &ParameterRange) -> Result<Vec<Value>, OptimizerError> {
    let values = match range {
        ParameterRange::DiscreteBool(vals) => vals.iter().map(|&v| json!(v)).collect(),
        ParameterRange::DiscreteInt(vals) => vals.iter().map(|&v| json!(v)).collect(),
        ParameterRange::DiscreteDecimal(vals) => vals.iter().map(|v| json!(v)).collect(),
        ParameterRange::LinearInt { start, end, step } => {
            if *step <= 0 {
                return Err(OptimizerError::ParameterGeneration(format!(
                    "Step for '{}' must be positive.",
                    name
                )));
            }
            (*start..=*end).step_by(*step as usize).map(|v| json!(v)).collect()
        }
        ParameterRange::LinearDecimal { start, end, step } => {
            if step.is_sign_negative() || step.is_zero() {
                return Err(OptimizerError::ParameterGeneration(format!(
                    "Step for '{}' must be positive.",
                    name
                )));
            }
            let mut vals = Vec::new();
            let mut current = *start;
            while current <= *end {
                vals.push(json!(current.normalize()));
                current += *step;
            }
            vals
        }
    };
    Ok(values)
}

/// Restricts the `strategy` section of `space` to the parameters `strategy`
/// actually has, so a shared grid does not multiply runs with values the
/// strategy would ignore.
pub fn space_for_strategy(
    space: &ParameterSpace,
    base: &Config,
    strategy: StrategyId,
) -> Result<ParameterSpace, OptimizerError> {
    let strategies = serde_json::to_value(&base.strategies)?;
    let table = strategies.get(strategy.as_str()).and_then(Value::as_object);

    let mut filtered = space.clone();
    filtered
        .strategy
        .retain(|name, _| table.is_some_and(|params| params.contains_key(name)));
    Ok(filtered)
}

/// Returns a copy of `base` with `overrides` applied and validated.
///
/// `dca.*` and `simulation.*` keys address those sections; `strategy.*` keys
/// address the parameter table of `strategy`. Unknown names are rejected.
pub fn apply_overrides(
    base: &Config,
    strategy: StrategyId,
    overrides: &ParameterSet,
) -> Result<Config, OptimizerError> {
    let mut root = serde_json::to_value(base)?;

    for (key, value) in overrides {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| OptimizerError::UnknownParameter(key.clone()))?;
        let table = match section {
            "dca" => root.get_mut("dca"),
            "simulation" => root.get_mut("simulation"),
            "strategy" => root
                .get_mut("strategies")
                .and_then(|strategies| strategies.get_mut(strategy.as_str())),
            _ => None,
        }
        .and_then(Value::as_object_mut)
        .ok_or_else(|| OptimizerError::UnknownParameter(key.clone()))?;

        match table.get_mut(name) {
            Some(slot) => *slot = value.clone(),
            None => return Err(OptimizerError::UnknownParameter(key.clone())),
        }
    }

    let mut config: Config = serde_json::from_value(root)?;
    config.backtest.strategy = strategy;
    config.validate()?;
    Ok(config)
}
