//! Strategy identity and typed parameters.
//!
//! At the boundary strategies arrive as an id plus an untyped name → number
//! mapping. `StrategyConfig::from_params` turns that into one typed variant
//! per strategy family; everything downstream works with the typed form.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::QuantError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MaCross,
    Rsi,
    Macd,
    Bollinger,
    DualThrust,
    Turtle,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::MaCross,
        StrategyKind::Rsi,
        StrategyKind::Macd,
        StrategyKind::Bollinger,
        StrategyKind::DualThrust,
        StrategyKind::Turtle,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::MaCross => "ma_cross",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
            StrategyKind::Bollinger => "bollinger",
            StrategyKind::DualThrust => "dual_thrust",
            StrategyKind::Turtle => "turtle",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::MaCross => "moving-average crossover",
            StrategyKind::Rsi => "RSI oversold/overbought thresholds",
            StrategyKind::Macd => "MACD line / signal line crossover",
            StrategyKind::Bollinger => "Bollinger band breakout",
            StrategyKind::DualThrust => "Dual Thrust range breakout",
            StrategyKind::Turtle => "Turtle channel breakout",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.id() == normalized)
            .ok_or_else(|| QuantError::UnknownStrategy(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    MaCross {
        fast_period: usize,
        slow_period: usize,
    },
    Rsi {
        period: usize,
        oversold: f64,
        overbought: f64,
    },
    Macd {
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    },
    Bollinger {
        period: usize,
        num_std: f64,
    },
    DualThrust {
        lookback: usize,
        k1: f64,
        k2: f64,
    },
    Turtle {
        entry_period: usize,
        exit_period: usize,
    },
}

impl StrategyConfig {
    /// The documented defaults for a strategy family.
    pub fn default_for(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::MaCross => StrategyConfig::MaCross {
                fast_period: 5,
                slow_period: 20,
            },
            StrategyKind::Rsi => StrategyConfig::Rsi {
                period: 14,
                oversold: 30.0,
                overbought: 70.0,
            },
            StrategyKind::Macd => StrategyConfig::Macd {
                fast_period: 12,
                slow_period: 26,
                signal_period: 9,
            },
            StrategyKind::Bollinger => StrategyConfig::Bollinger {
                period: 20,
                num_std: 2.0,
            },
            StrategyKind::DualThrust => StrategyConfig::DualThrust {
                lookback: 5,
                k1: 0.5,
                k2: 0.5,
            },
            StrategyKind::Turtle => StrategyConfig::Turtle {
                entry_period: 20,
                exit_period: 10,
            },
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::MaCross { .. } => StrategyKind::MaCross,
            StrategyConfig::Rsi { .. } => StrategyKind::Rsi,
            StrategyConfig::Macd { .. } => StrategyKind::Macd,
            StrategyConfig::Bollinger { .. } => StrategyKind::Bollinger,
            StrategyConfig::DualThrust { .. } => StrategyKind::DualThrust,
            StrategyConfig::Turtle { .. } => StrategyKind::Turtle,
        }
    }

    /// Build a typed config from a strategy id and named numeric parameters.
    ///
    /// Missing parameters take their defaults. Unknown names are ignored with
    /// a warning. The result is validated before it is returned.
    pub fn from_params(id: &str, params: &HashMap<String, f64>) -> Result<Self, QuantError> {
        let kind: StrategyKind = id.parse()?;
        let mut config = StrategyConfig::default_for(kind);
        let strategy = kind.id();

        let mut names: Vec<&String> = params.keys().collect();
        names.sort();

        for name in names {
            let value = params[name];
            match (&mut config, name.as_str()) {
                (StrategyConfig::MaCross { fast_period, .. }, "fast_period")
                | (StrategyConfig::Macd { fast_period, .. }, "fast_period") => {
                    *fast_period = period_param(strategy, name, value)?;
                }
                (StrategyConfig::MaCross { slow_period, .. }, "slow_period")
                | (StrategyConfig::Macd { slow_period, .. }, "slow_period") => {
                    *slow_period = period_param(strategy, name, value)?;
                }
                (StrategyConfig::Macd { signal_period, .. }, "signal_period") => {
                    *signal_period = period_param(strategy, name, value)?;
                }
                (StrategyConfig::Rsi { period, .. }, "period")
                | (StrategyConfig::Bollinger { period, .. }, "period") => {
                    *period = period_param(strategy, name, value)?;
                }
                (StrategyConfig::Rsi { oversold, .. }, "oversold") => *oversold = value,
                (StrategyConfig::Rsi { overbought, .. }, "overbought") => *overbought = value,
                (StrategyConfig::Bollinger { num_std, .. }, "num_std") => *num_std = value,
                (StrategyConfig::DualThrust { lookback, .. }, "lookback") => {
                    *lookback = period_param(strategy, name, value)?;
                }
                (StrategyConfig::DualThrust { k1, .. }, "k1") => *k1 = value,
                (StrategyConfig::DualThrust { k2, .. }, "k2") => *k2 = value,
                (StrategyConfig::Turtle { entry_period, .. }, "entry_period") => {
                    *entry_period = period_param(strategy, name, value)?;
                }
                (StrategyConfig::Turtle { exit_period, .. }, "exit_period") => {
                    *exit_period = period_param(strategy, name, value)?;
                }
                _ => tracing::warn!(strategy, param = %name, "ignoring unknown strategy parameter"),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges. Called by `from_params` and again before any
    /// simulation, so hand-built configs are covered too.
    pub fn validate(&self) -> Result<(), QuantError> {
        let strategy = self.kind().id();
        let positive = |param: &str, value: usize| {
            if value == 0 {
                Err(QuantError::invalid_param(strategy, param, "must be >= 1"))
            } else {
                Ok(())
            }
        };

        match *self {
            StrategyConfig::MaCross {
                fast_period,
                slow_period,
            } => {
                positive("fast_period", fast_period)?;
                positive("slow_period", slow_period)?;
                if fast_period >= slow_period {
                    return Err(QuantError::invalid_param(
                        strategy,
                        "fast_period",
                        format!("must be less than slow_period ({})", slow_period),
                    ));
                }
            }
            StrategyConfig::Rsi {
                period,
                oversold,
                overbought,
            } => {
                positive("period", period)?;
                if !(0.0..=100.0).contains(&oversold) {
                    return Err(QuantError::invalid_param(
                        strategy,
                        "oversold",
                        "must be within [0, 100]",
                    ));
                }
                if !(0.0..=100.0).contains(&overbought) {
                    return Err(QuantError::invalid_param(
                        strategy,
                        "overbought",
                        "must be within [0, 100]",
                    ));
                }
                if overbought <= oversold {
                    return Err(QuantError::invalid_param(
                        strategy,
                        "overbought",
                        format!("must exceed oversold ({})", oversold),
                    ));
                }
            }
            StrategyConfig::Macd {
                fast_period,
                slow_period,
                signal_period,
            } => {
                positive("fast_period", fast_period)?;
                positive("slow_period", slow_period)?;
                positive("signal_period", signal_period)?;
                if fast_period >= slow_period {
                    return Err(QuantError::invalid_param(
                        strategy,
                        "fast_period",
                        format!("must be less than slow_period ({})", slow_period),
                    ));
                }
            }
            StrategyConfig::Bollinger { period, num_std } => {
                if period < 2 {
                    return Err(QuantError::invalid_param(
                        strategy,
                        "period",
                        "must be >= 2",
                    ));
                }
                if !(num_std > 0.0 && num_std.is_finite()) {
                    return Err(QuantError::invalid_param(strategy, "num_std", "must be > 0"));
                }
            }
            StrategyConfig::DualThrust { lookback, k1, k2 } => {
                positive("lookback", lookback)?;
                for (param, k) in [("k1", k1), ("k2", k2)] {
                    if !(k >= 0.0 && k.is_finite()) {
                        return Err(QuantError::invalid_param(strategy, param, "must be >= 0"));
                    }
                }
            }
            StrategyConfig::Turtle {
                entry_period,
                exit_period,
            } => {
                positive("entry_period", entry_period)?;
                positive("exit_period", exit_period)?;
            }
        }
        Ok(())
    }
}

fn period_param(strategy: &str, param: &str, value: f64) -> Result<usize, QuantError> {
    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
        return Err(QuantError::invalid_param(
            strategy,
            param,
            format!("must be an integer >= 1, got {}", value),
        ));
    }
    Ok(value as usize)
}
