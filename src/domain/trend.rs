//! Multi-factor trend scoring.
//!
//! Five independent rules each add points to either the bull or the bear
//! score (never both). The verdict needs a 15-point margin; anything closer
//! is neutral. The attached price projection is a plain least-squares line
//! through the last 20 closes, extended forward. It is a naive trend
//! extrapolation, not a forecast.

use std::fmt;

use serde::Serialize;

use crate::domain::error::QuantError;
use crate::domain::indicator::{macd_default, rsi, sma};
use crate::domain::ohlcv::{self, PriceBar};
use crate::domain::signal::SignalKind;

pub const MIN_TREND_BARS: usize = 30;
pub const DEFAULT_HORIZON: usize = 5;
const REGRESSION_WINDOW: usize = 20;
const VERDICT_MARGIN: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
            Trend::Neutral => write!(f, "neutral"),
        }
    }
}

/// One rule's contribution to the score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendFactor {
    pub name: String,
    #[serde(rename = "type")]
    pub bias: Trend,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub trend: Trend,
    pub signal: SignalKind,
    /// |bull - bear| as a percentage of bull + bear.
    pub confidence: f64,
    pub bull_score: u32,
    pub bear_score: u32,
    pub signals: Vec<TrendFactor>,
    pub current_price: f64,
    pub predicted_prices: Vec<f64>,
    pub prediction_horizon: usize,
    pub summary: String,
}

/// The last-bar indicator readings the rules look at.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSnapshot {
    pub ma5: f64,
    pub ma20: f64,
    /// MA60, or MA20 again when fewer than 60 bars exist.
    pub ma60: f64,
    pub rsi: f64,
    pub hist_prev: f64,
    pub hist_last: f64,
    pub vol_ma5: f64,
    pub vol_ma20: f64,
    pub prev_close: f64,
    pub last_close: f64,
    /// Percentage change from the close four bars back to the last close.
    pub momentum_pct: f64,
}

impl TrendSnapshot {
    pub fn from_bars(bars: &[PriceBar]) -> Result<Self, QuantError> {
        let n = bars.len();
        if n < MIN_TREND_BARS {
            return Err(QuantError::InsufficientData {
                bars: n,
                minimum: MIN_TREND_BARS,
            });
        }

        let closes = ohlcv::closes(bars);
        let volumes = ohlcv::volumes(bars);
        let last = n - 1;

        let ma20 = sma(&closes, 20)[last];
        let ma60 = if n >= 60 { sma(&closes, 60)[last] } else { ma20 };
        let rsi_last = rsi(&closes, 14)[last];
        let hist = macd_default(&closes).histogram;

        let base = closes[n - 5];
        let momentum_pct = if base == 0.0 {
            0.0
        } else {
            (closes[last] / base - 1.0) * 100.0
        };

        Ok(TrendSnapshot {
            ma5: sma(&closes, 5)[last],
            ma20,
            ma60,
            rsi: if rsi_last.is_nan() { 50.0 } else { rsi_last },
            hist_prev: hist[last - 1],
            hist_last: hist[last],
            vol_ma5: sma(&volumes, 5)[last],
            vol_ma20: sma(&volumes, 20)[last],
            prev_close: closes[last - 1],
            last_close: closes[last],
            momentum_pct,
        })
    }

    /// Apply the five rules, returning (bull_score, bear_score, factors).
    pub fn score(&self) -> (u32, u32, Vec<TrendFactor>) {
        let mut bull = 0;
        let mut bear = 0;
        let mut factors = Vec::with_capacity(5);
        let mut add = |name: String, bias: Trend, weight: u32| {
            match bias {
                Trend::Bullish => bull += weight,
                Trend::Bearish => bear += weight,
                Trend::Neutral => {}
            }
            factors.push(TrendFactor { name, bias, weight });
        };

        if self.ma5 > self.ma20 && self.ma20 > self.ma60 {
            add("bullish MA alignment".into(), Trend::Bullish, 25);
        } else if self.ma5 < self.ma20 && self.ma20 < self.ma60 {
            add("bearish MA alignment".into(), Trend::Bearish, 25);
        } else {
            add("moving averages intertwined".into(), Trend::Neutral, 0);
        }

        let r = self.rsi;
        if r < 30.0 {
            add(format!("RSI oversold ({:.0})", r), Trend::Bullish, 20);
        } else if r > 70.0 {
            add(format!("RSI overbought ({:.0})", r), Trend::Bearish, 20);
        } else if r < 50.0 {
            add(format!("RSI weak ({:.0})", r), Trend::Bearish, 5);
        } else {
            add(format!("RSI strong ({:.0})", r), Trend::Bullish, 5);
        }

        let (prev, last) = (self.hist_prev, self.hist_last);
        if last > 0.0 && prev <= 0.0 {
            add("MACD golden cross".into(), Trend::Bullish, 20);
        } else if last < 0.0 && prev >= 0.0 {
            add("MACD death cross".into(), Trend::Bearish, 20);
        } else if last > prev {
            add("MACD histogram expanding".into(), Trend::Bullish, 10);
        } else {
            add("MACD histogram contracting".into(), Trend::Bearish, 10);
        }

        if self.vol_ma5 > self.vol_ma20 * 1.5 {
            if self.last_close > self.prev_close {
                add("volume surge on rising price".into(), Trend::Bullish, 15);
            } else {
                add("volume surge on falling price".into(), Trend::Bearish, 15);
            }
        } else {
            add("normal volume".into(), Trend::Neutral, 0);
        }

        let m = self.momentum_pct;
        if m > 3.0 {
            add(format!("strong 5-day momentum ({:.1}%)", m), Trend::Bullish, 15);
        } else if m < -3.0 {
            add(format!("weak 5-day momentum ({:.1}%)", m), Trend::Bearish, 15);
        } else {
            add(format!("neutral 5-day momentum ({:.1}%)", m), Trend::Neutral, 0);
        }

        (bull, bear, factors)
    }
}

pub fn score_trend(bars: &[PriceBar]) -> Result<TrendResult, QuantError> {
    score_trend_with_horizon(bars, DEFAULT_HORIZON)
}

pub fn score_trend_with_horizon(
    bars: &[PriceBar],
    horizon: usize,
) -> Result<TrendResult, QuantError> {
    let snapshot = TrendSnapshot::from_bars(bars)?;
    let (bull_score, bear_score, signals) = snapshot.score();
    let (trend, signal) = verdict(bull_score, bear_score);
    let confidence = confidence(bull_score, bear_score);

    let closes = ohlcv::closes(bars);
    let recent = &closes[closes.len().saturating_sub(REGRESSION_WINDOW)..];
    let predicted_prices = project_linear(recent, horizon);

    tracing::debug!(
        %trend,
        bull_score,
        bear_score,
        confidence,
        "trend scored"
    );

    Ok(TrendResult {
        trend,
        signal,
        confidence,
        bull_score,
        bear_score,
        summary: summarize(trend, confidence, &signals),
        signals,
        current_price: snapshot.last_close,
        predicted_prices,
        prediction_horizon: horizon,
    })
}

pub fn verdict(bull: u32, bear: u32) -> (Trend, SignalKind) {
    if bull > bear + VERDICT_MARGIN {
        (Trend::Bullish, SignalKind::Buy)
    } else if bear > bull + VERDICT_MARGIN {
        (Trend::Bearish, SignalKind::Sell)
    } else {
        (Trend::Neutral, SignalKind::Hold)
    }
}

pub fn confidence(bull: u32, bear: u32) -> f64 {
    let total = (bull + bear).max(1);
    f64::from(bull.abs_diff(bear)) / f64::from(total) * 100.0
}

/// Fit y = slope·x + intercept over x = 0..len by least squares and return
/// the fitted line at x = len, len+1, ... for `horizon` steps.
pub fn project_linear(values: &[f64], horizon: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = y_mean - slope * x_mean;

    (0..horizon)
        .map(|i| slope * (nf + i as f64) + intercept)
        .collect()
}

fn summarize(trend: Trend, confidence: f64, factors: &[TrendFactor]) -> String {
    let label = match trend {
        Trend::Bullish => "bullish",
        Trend::Bearish => "bearish",
        Trend::Neutral => "range-bound",
    };
    let names = |bias: Trend| -> Vec<&str> {
        factors
            .iter()
            .filter(|f| f.bias == bias)
            .map(|f| f.name.as_str())
            .collect()
    };

    let mut parts = vec![format!(
        "Overall outlook: {} (confidence {:.0}%).",
        label, confidence
    )];
    let bullish = names(Trend::Bullish);
    if !bullish.is_empty() {
        parts.push(format!("Bullish factors: {}.", bullish.join(", ")));
    }
    let bearish = names(Trend::Bearish);
    if !bearish.is_empty() {
        parts.push(format!("Bearish factors: {}.", bearish.join(", ")));
    }

    if confidence < 30.0 {
        parts.push("Signals weak, stay on the sidelines.".into());
    } else if trend == Trend::Bullish {
        parts.push("Consider buying on dips and set a stop-loss.".into());
    } else if trend == Trend::Bearish {
        parts.push("Trade cautiously and keep positions small.".into());
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn make_bars(closes: &[f64], volumes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&c, &v))| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: v,
            })
            .collect()
    }

    fn bullish_snapshot() -> TrendSnapshot {
        TrendSnapshot {
            ma5: 110.0,
            ma20: 105.0,
            ma60: 100.0,
            rsi: 25.0,
            hist_prev: -0.2,
            hist_last: 0.3,
            vol_ma5: 1000.0,
            vol_ma20: 1000.0,
            prev_close: 108.0,
            last_close: 109.0,
            momentum_pct: 4.0,
        }
    }

    #[test]
    fn bullish_snapshot_scores_every_bullish_rule() {
        let (bull, bear, factors) = bullish_snapshot().score();
        assert_eq!(bull, 25 + 20 + 20 + 15);
        assert_eq!(bear, 0);
        assert_eq!(factors.len(), 5);
        assert_eq!(factors[1].name, "RSI oversold (25)");
        assert_eq!(factors[3].bias, Trend::Neutral);
        assert_eq!(verdict(bull, bear), (Trend::Bullish, SignalKind::Buy));
        assert!((confidence(bull, bear) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn each_rule_scores_one_side_only() {
        let snap = TrendSnapshot {
            ma5: 90.0,
            ma20: 95.0,
            ma60: 100.0,
            rsi: 75.0,
            hist_prev: 0.1,
            hist_last: -0.1,
            vol_ma5: 2000.0,
            vol_ma20: 1000.0,
            prev_close: 100.0,
            last_close: 99.0,
            momentum_pct: -5.0,
        };
        let (bull, bear, factors) = snap.score();
        assert_eq!(bull, 0);
        assert_eq!(bear, 25 + 20 + 20 + 15 + 15);
        assert_eq!(factors[3].name, "volume surge on falling price");
    }

    #[test]
    fn rsi_tilt_and_macd_expansion() {
        let snap = TrendSnapshot {
            rsi: 45.0,
            hist_prev: 0.1,
            hist_last: 0.2,
            ..bullish_snapshot()
        };
        let (_, _, factors) = snap.score();
        assert_eq!(factors[1].bias, Trend::Bearish);
        assert_eq!(factors[1].weight, 5);
        assert_eq!(factors[2].name, "MACD histogram expanding");
    }

    #[test]
    fn verdict_needs_more_than_fifteen_points() {
        assert_eq!(verdict(30, 15).0, Trend::Neutral);
        assert_eq!(verdict(31, 15).0, Trend::Bullish);
        assert_eq!(verdict(10, 26).0, Trend::Bearish);
        assert_eq!(verdict(0, 0).0, Trend::Neutral);
    }

    #[test]
    fn confidence_with_zero_scores() {
        assert!(confidence(0, 0).abs() < f64::EPSILON);
        assert!((confidence(30, 10) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn projection_of_exact_line() {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + 2.0 * i as f64).collect();
        let projected = project_linear(&values, 3);
        assert_eq!(projected.len(), 3);
        assert!((projected[0] - 50.0).abs() < 1e-9);
        assert!((projected[2] - 54.0).abs() < 1e-9);
    }

    #[test]
    fn projection_of_flat_series() {
        let projected = project_linear(&[7.0; 20], 5);
        assert!(projected.iter().all(|p| (p - 7.0).abs() < 1e-12));
        assert!(project_linear(&[], 5).is_empty());
    }

    #[test]
    fn snapshot_reads_last_bars() {
        // flat at 100 with a 10% jump on the last bar and a 5-bar volume spike
        let mut closes = vec![100.0; 39];
        closes.push(110.0);
        let mut volumes = vec![1000.0; 35];
        volumes.extend([5000.0; 5]);
        let snap = TrendSnapshot::from_bars(&make_bars(&closes, &volumes)).unwrap();

        assert!((snap.ma5 - 102.0).abs() < 1e-9);
        assert!((snap.ma20 - 100.5).abs() < 1e-9);
        assert!((snap.ma60 - snap.ma20).abs() < f64::EPSILON);
        assert!((snap.momentum_pct - 10.0).abs() < 1e-9);
        assert!((snap.vol_ma5 - 5000.0).abs() < 1e-9);
        assert!((snap.vol_ma20 - 2000.0).abs() < 1e-9);
        assert!((snap.prev_close - 100.0).abs() < f64::EPSILON);
        assert!((snap.last_close - 110.0).abs() < f64::EPSILON);
        assert!(snap.hist_prev.abs() < 1e-12);
        assert!(snap.hist_last > 0.0);
        assert!((snap.rsi - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_series_is_rejected() {
        let bars = make_bars(&[100.0; 29], &[1000.0; 29]);
        assert!(matches!(
            score_trend(&bars),
            Err(QuantError::InsufficientData { minimum: 30, .. })
        ));
    }

    #[test]
    fn ma60_falls_back_to_ma20_on_short_history() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let snap = TrendSnapshot::from_bars(&make_bars(&closes, &[1000.0; 40])).unwrap();
        assert!((snap.ma60 - snap.ma20).abs() < f64::EPSILON);
        let (_, _, factors) = snap.score();
        assert_eq!(factors[0].bias, Trend::Neutral);
    }

    #[test]
    fn flat_series_result() {
        let bars = make_bars(&[50.0; 30], &[1000.0; 30]);
        let result = score_trend(&bars).unwrap();
        // RSI 100 on a flat series, MACD histogram flat at zero
        assert_eq!(result.bull_score, 0);
        assert_eq!(result.bear_score, 30);
        assert_eq!(result.trend, Trend::Bearish);
        assert_eq!(result.signal, SignalKind::Sell);
        assert_eq!(result.prediction_horizon, 5);
        assert_eq!(result.predicted_prices.len(), 5);
        assert!((result.current_price - 50.0).abs() < f64::EPSILON);
        assert!(result.summary.starts_with("Overall outlook: bearish (confidence 100%)."));
        assert!(result.summary.ends_with("Trade cautiously and keep positions small."));
    }

    #[test]
    fn weak_signal_summary() {
        let factors = vec![TrendFactor {
            name: "RSI strong (55)".into(),
            bias: Trend::Bullish,
            weight: 5,
        }];
        let summary = summarize(Trend::Neutral, 20.0, &factors);
        assert_eq!(
            summary,
            "Overall outlook: range-bound (confidence 20%). Bullish factors: RSI strong (55). \
             Signals weak, stay on the sidelines."
        );
    }

    #[test]
    fn result_serializes_factor_type() {
        let bars = make_bars(&[50.0; 30], &[1000.0; 30]);
        let json = serde_json::to_value(score_trend(&bars).unwrap()).unwrap();
        assert_eq!(json["trend"], "bearish");
        assert_eq!(json["signal"], "sell");
        assert_eq!(json["signals"][1]["type"], "bearish");
    }
}
