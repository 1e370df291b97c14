//! Trade recommendation derived from a trend verdict and optional risk
//! metrics.

use serde::Serialize;

use super::risk::RiskMetrics;
use super::trend::{Trend, TrendResult};

/// Confidence (percent) a verdict needs before it is acted on.
const ACTION_CONFIDENCE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Buy,
    SellOrAvoid,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub symbol: String,
    pub action: Action,
    /// Suggested position size, percent of portfolio, as (min, max).
    pub position_size_pct: (f64, f64),
    pub entry_range: Option<PriceRange>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

pub fn recommend(symbol: &str, trend: &TrendResult, risk: Option<&RiskMetrics>) -> Recommendation {
    let confidence = trend.confidence;
    let price = trend.current_price;
    let mut reasoning = Vec::new();

    let mut rec = Recommendation {
        symbol: symbol.to_string(),
        action: Action::Hold,
        position_size_pct: (5.0, 10.0),
        entry_range: None,
        stop_loss: None,
        take_profit: None,
        confidence,
        reasoning: Vec::new(),
    };

    match trend.trend {
        Trend::Bullish if confidence > ACTION_CONFIDENCE => {
            let pct = (10.0 + confidence * 0.3).min(30.0);
            rec.action = Action::Buy;
            rec.position_size_pct = (pct, pct);
            rec.entry_range = Some(PriceRange {
                low: price * 0.98,
                high: price,
            });
            rec.stop_loss = Some(price * 0.95);
            rec.take_profit = Some(price * 1.15);
            reasoning.push("multiple indicators are bullish".to_string());
            if confidence > 60.0 {
                reasoning.push("signal strength is high".to_string());
            }
        }
        Trend::Bearish if confidence > ACTION_CONFIDENCE => {
            rec.action = Action::SellOrAvoid;
            rec.position_size_pct = (0.0, 0.0);
            reasoning.push("multiple indicators are bearish".to_string());
        }
        _ => {
            reasoning.push("signals unclear, probe with a small position".to_string());
        }
    }

    if let Some(risk) = risk.filter(|r| r.max_drawdown > 0.20) {
        reasoning.push(format!(
            "note: high historical max drawdown ({:.1}%)",
            risk.max_drawdown * 100.0
        ));
    }

    rec.reasoning = reasoning;
    rec
}
