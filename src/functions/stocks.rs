//! Stock metrics and technical indicators computed from stored daily bars.
//!
//! Each symbol lives in `<dir>/<SYMBOL>.json`:
//! `{"company_name": .., "sector": .., "market_cap": .., "pe_ratio": .., "bars": [{"date": "2025-01-02", "open": .., "high": .., "low": .., "close": .., "volume": ..}]}`.
//! Only `bars` is required.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{definition, list_arg, string_arg, text_arg};
use crate::function_registry::FunctionRegistry;

/// Trading days covered by each accepted period.
pub const PERIODS: &[(&str, usize)] = &[
    ("1d", 1),
    ("5d", 5),
    ("1mo", 21),
    ("3mo", 63),
    ("6mo", 126),
    ("1y", 252),
    ("2y", 504),
];

const TRADING_DAYS: f64 = 252.0;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct History {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    pub bars: Vec<Bar>,
}

pub trait MarketData: Send + Sync {
    /// Bars oldest first.
    fn history(&self, symbol: &str) -> Result<History, String>;
}

pub struct FileMarketData {
    dir: PathBuf,
}

impl FileMarketData {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MarketData for FileMarketData {
    fn history(&self, symbol: &str) -> Result<History, String> {
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^')) {
            return Err(format!("invalid symbol {symbol:?}"));
        }
        let path = self.dir.join(format!("{symbol}.json"));
        let text = fs::read_to_string(&path)
            .map_err(|e| format!("no market data for {symbol} ({}): {e}", path.display()))?;
        let mut history: History =
            serde_json::from_str(&text).map_err(|e| format!("bad market data in {}: {e}", path.display()))?;
        history.bars.sort_by_key(|b| b.date);
        debug!(symbol, bars = history.bars.len(), "loaded price history");
        Ok(history)
    }
}

pub fn register(registry: &mut FunctionRegistry, market: Arc<dyn MarketData>) {
    let source = market.clone();
    registry.register(
        definition(
            "get_stock_data",
            "Get stock data including price, market cap, P/E ratio, volatility, and trading volume",
            json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Stock symbol (e.g., AAPL, GOOGL, TSLA)" },
                    "period": {
                        "type": "string",
                        "enum": ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y"],
                        "description": "Time period for historical data (default: 1mo)"
                    }
                },
                "required": ["symbol"]
            }),
        ),
        move |input| get_stock_data(source.as_ref(), input),
    );
    let source = market.clone();
    registry.register(
        definition(
            "calculate_technical_indicators",
            "Calculate moving averages, RSI, support/resistance levels, and trend",
            json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Stock symbol to analyze" },
                    "period": {
                        "type": "string",
                        "enum": ["1mo", "3mo", "6mo", "1y", "2y"],
                        "description": "Time period for technical analysis (default: 3mo)"
                    }
                },
                "required": ["symbol"]
            }),
        ),
        move |input| calculate_technical_indicators(source.as_ref(), input),
    );
    registry.register(
        definition(
            "compare_stocks",
            "Compare multiple stocks side by side with key metrics and performance",
            json!({
                "type": "object",
                "properties": {
                    "symbols": {
                        "type": "string",
                        "description": "Comma-separated list of stock symbols to compare (e.g., 'AAPL,GOOGL,MSFT')"
                    }
                },
                "required": ["symbols"]
            }),
        ),
        move |input| compare_stocks(market.as_ref(), input),
    );
}

pub fn get_stock_data(market: &dyn MarketData, input: &Value) -> Result<Value, String> {
    let symbol = string_arg(input, "symbol")?.to_uppercase();
    let period = text_arg(input, "period").unwrap_or_else(|| "1mo".to_string());
    stock_snapshot(market, &symbol, &period)
}

fn stock_snapshot(market: &dyn MarketData, symbol: &str, period: &str) -> Result<Value, String> {
    let history = market.history(symbol)?;
    let bars = window(&history.bars, period)?;
    let Some(last) = bars.last() else {
        return Ok(json!({ "error": format!("No data found for symbol: {symbol}") }));
    };
    let prev = bars.len().checked_sub(2).map_or(last.close, |i| bars[i].close);
    let change = last.close - prev;
    let change_pct = if prev == 0.0 { 0.0 } else { change / prev * 100.0 };
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let average_volume = bars.iter().map(|b| b.volume).sum::<u64>() / bars.len() as u64;

    Ok(json!({
        "symbol": symbol,
        "company_name": history.company_name.as_deref().unwrap_or("N/A"),
        "sector": history.sector.as_deref().unwrap_or("N/A"),
        "current_price": round2(last.close),
        "price_change": round2(change),
        "price_change_percent": round2(change_pct),
        "market_cap": or_na(history.market_cap),
        "pe_ratio": or_na(history.pe_ratio),
        "52_week_high": round2(high),
        "52_week_low": round2(low),
        "volatility_percent": round2(annualized_volatility(&closes).unwrap_or(0.0)),
        "average_volume": average_volume,
        "current_volume": last.volume,
        "data_period": period,
        "last_updated": Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }))
}

pub fn calculate_technical_indicators(market: &dyn MarketData, input: &Value) -> Result<Value, String> {
    let symbol = string_arg(input, "symbol")?.to_uppercase();
    let period = text_arg(input, "period").unwrap_or_else(|| "3mo".to_string());
    let history = market.history(&symbol)?;
    let bars = window(&history.bars, &period)?;
    let Some(last) = bars.last() else {
        return Ok(json!({ "error": format!("No data found for {symbol}") }));
    };
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let recent = &bars[bars.len().saturating_sub(20)..];
    let support = recent.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let resistance = recent.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let sma_20 = sma(&closes, 20).map(round2);
    let sma_50 = sma(&closes, 50).map(round2);

    let trend = match (sma_20, sma_50) {
        (Some(short), Some(long)) if short > long => "Bullish (Short-term trending up)",
        (Some(_), Some(_)) => "Bearish (Short-term trending down)",
        _ => "Insufficient data for trend analysis",
    };

    Ok(json!({
        "symbol": symbol,
        "current_price": round2(last.close),
        "sma_20": sma_20,
        "sma_50": sma_50,
        "rsi": rsi(&closes, 14).map(round2),
        "support_level": round2(support),
        "resistance_level": round2(resistance),
        "analysis_period": period,
        "trend": trend,
        "calculated_at": Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }))
}

/// Symbols without data are skipped.
pub fn compare_stocks(market: &dyn MarketData, input: &Value) -> Result<Value, String> {
    let symbols = list_arg(input, "symbols");
    if symbols.is_empty() {
        return Err("missing argument 'symbols'".to_string());
    }
    let mut stocks = Vec::new();
    for symbol in symbols.iter().map(|s| s.to_uppercase()) {
        let data = match stock_snapshot(market, &symbol, "1mo") {
            Ok(data) if data.get("error").is_none() => data,
            Ok(data) => {
                warn!(symbol, error = %data["error"], "skipping symbol in comparison");
                continue;
            }
            Err(e) => {
                warn!(symbol, error = %e, "skipping symbol in comparison");
                continue;
            }
        };
        stocks.push(json!({
            "symbol": symbol,
            "company": data["company_name"],
            "price": data["current_price"],
            "change_percent": data["price_change_percent"],
            "market_cap": data["market_cap"],
            "pe_ratio": data["pe_ratio"],
            "volatility": data["volatility_percent"],
            "sector": data["sector"]
        }));
    }
    if stocks.is_empty() {
        return Ok(json!({ "error": "Could not retrieve data for any of the provided symbols" }));
    }
    Ok(json!({
        "comparison_date": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "stocks_compared": stocks.len(),
        "stocks": stocks
    }))
}

/// The most recent bars covered by `period`.
pub fn window<'a>(bars: &'a [Bar], period: &str) -> Result<&'a [Bar], String> {
    let days = PERIODS
        .iter()
        .find(|(name, _)| *name == period)
        .map(|(_, days)| *days)
        .ok_or_else(|| format!("unsupported period {period:?}"))?;
    Ok(&bars[bars.len().saturating_sub(days)..])
}

/// Mean of the last `n` values.
pub fn sma(values: &[f64], n: usize) -> Option<f64> {
    if n == 0 || values.len() < n {
        return None;
    }
    Some(values[values.len() - n..].iter().sum::<f64>() / n as f64)
}

/// Relative strength index over the last `n` price changes, using simple
/// averages of gains and losses.
pub fn rsi(closes: &[f64], n: usize) -> Option<f64> {
    if n == 0 || closes.len() < n + 1 {
        return None;
    }
    let recent = &closes[closes.len() - n - 1..];
    let (gain, loss) = recent.windows(2).fold((0.0, 0.0), |(gain, loss), w| {
        let delta = w[1] - w[0];
        if delta > 0.0 { (gain + delta, loss) } else { (gain, loss - delta) }
    });
    match (gain, loss) {
        (g, l) if g == 0.0 && l == 0.0 => None,
        (_, l) if l == 0.0 => Some(100.0),
        (g, l) => Some(100.0 - 100.0 / (1.0 + g / l)),
    }
}

/// Sample standard deviation of daily returns, annualised, in percent.
pub fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if returns.len() < 2 {
        return None;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    Some(variance.sqrt() * TRADING_DAYS.sqrt() * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn or_na(value: Option<f64>) -> Value {
    value.map_or_else(|| json!("N/A"), |v| json!(v))
}
