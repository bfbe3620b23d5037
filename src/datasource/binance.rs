//! Binance USDⓈ-M futures client with HMAC-SHA256 signed requests.

use super::{DataSourceError, IncomeQuery, MarketDataSource, TradeQuery};
use crate::domain::{AccountSnapshot, Fill, IncomeEvent, IncomeKind, Side, Symbol, TimeMs};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Signed client for the Binance futures REST API.
#[derive(Debug, Clone)]
pub struct BinanceDataSource {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl BinanceDataSource {
    pub fn new(base_url: String, api_key: String, api_secret: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            api_secret,
        }
    }

    fn sign(&self, query_string: &str) -> Result<String, DataSourceError> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|_| DataSourceError::Parse("invalid API secret".to_string()))?;
        mac.update(query_string.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Issue a signed GET with exponential backoff on transient failures
    /// (network errors, 429/418, 5xx). Client errors are permanent; the
    /// exchange's `{code, msg}` body is surfaced when present.
    async fn signed_get(
        &self,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<Value, DataSourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            // Timestamp and signature are rebuilt per attempt so retries
            // never replay a stale signed payload.
            let mut query_parts: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            query_parts.push(format!("timestamp={}", TimeMs::now().as_ms()));
            let query_string = query_parts.join("&");
            let signature = self
                .sign(&query_string)
                .map_err(backoff::Error::permanent)?;
            let url = format!(
                "{}{}?{}&signature={}",
                self.base_url, endpoint, query_string, signature
            );

            let response = self
                .client
                .get(&url)
                .header("X-MBX-APIKEY", &self.api_key)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(DataSourceError::Network(e.to_string())))?;

            let status = response.status();
            if status.as_u16() == 429 || status.as_u16() == 418 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::Http {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }

            let body = response.json::<Value>().await.map_err(|e| {
                backoff::Error::permanent(DataSourceError::Parse(e.to_string()))
            })?;

            if !status.is_success() {
                let code = body.get("code").and_then(|v| v.as_i64()).unwrap_or(-1);
                let message = body
                    .get("msg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("request failed")
                    .to_string();
                return Err(backoff::Error::permanent(DataSourceError::Api {
                    code,
                    message,
                }));
            }

            Ok(body)
        })
        .await
    }

    fn expect_array(body: Value) -> Result<Vec<Value>, DataSourceError> {
        match body {
            Value::Array(items) => Ok(items),
            _ => Err(DataSourceError::Parse("Expected array response".to_string())),
        }
    }
}

#[async_trait]
impl MarketDataSource for BinanceDataSource {
    async fn income_history(
        &self,
        query: IncomeQuery,
    ) -> Result<Vec<IncomeEvent>, DataSourceError> {
        debug!("fetching income history: {:?}", query);

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(symbol) = query.symbol {
            params.push(("symbol", symbol));
        }
        if let Some(income_type) = query.income_type {
            params.push(("incomeType", income_type));
        }
        if let Some(start) = query.start_time {
            params.push(("startTime", start.as_ms().to_string()));
        }
        if let Some(end) = query.end_time {
            params.push(("endTime", end.as_ms().to_string()));
        }
        params.push(("limit", query.limit.unwrap_or(1000).to_string()));

        let body = self.signed_get("/fapi/v1/income", params).await?;
        let items = Self::expect_array(body)?;

        let mut events = Vec::new();
        for item in &items {
            match parse_income(item) {
                Ok(event) => events.push(event),
                Err(e) => warn!("skipping unparseable income record: {}", e),
            }
        }
        Ok(events)
    }

    async fn user_trades(&self, query: TradeQuery) -> Result<Vec<Fill>, DataSourceError> {
        debug!("fetching user trades: {:?}", query);

        let mut params: Vec<(&str, String)> = vec![("symbol", query.symbol.clone())];
        if let Some(start) = query.start_time {
            params.push(("startTime", start.as_ms().to_string()));
        }
        if let Some(end) = query.end_time {
            params.push(("endTime", end.as_ms().to_string()));
        }
        if let Some(from_id) = query.from_id {
            params.push(("fromId", from_id.to_string()));
        }
        params.push(("limit", query.limit.unwrap_or(1000).to_string()));

        let body = self.signed_get("/fapi/v1/userTrades", params).await?;
        let items = Self::expect_array(body)?;

        let mut fills = Vec::new();
        for item in &items {
            match parse_fill(item) {
                Ok(fill) => fills.push(fill),
                Err(e) => warn!("skipping unparseable fill: {}", e),
            }
        }
        Ok(fills)
    }

    async fn all_user_trades(&self) -> Result<Vec<Fill>, DataSourceError> {
        // Traded symbols are discovered from realized-pnl income records;
        // fills are then fetched per symbol sequentially. One symbol's
        // failure must not cancel the rest.
        let income = self
            .income_history(IncomeQuery {
                income_type: Some("REALIZED_PNL".to_string()),
                limit: Some(1000),
                ..Default::default()
            })
            .await?;

        let mut symbols: Vec<String> = Vec::new();
        for event in &income {
            if let Some(symbol) = &event.symbol {
                if !symbols.iter().any(|s| s == symbol.as_str()) {
                    symbols.push(symbol.as_str().to_string());
                }
            }
        }
        debug!("discovered {} traded symbols", symbols.len());

        let mut all_fills = Vec::new();
        for symbol in symbols {
            match self.user_trades(TradeQuery::for_symbol(&symbol)).await {
                Ok(mut fills) => all_fills.append(&mut fills),
                Err(e) => warn!("failed to fetch trades for {}: {}", symbol, e),
            }
        }
        Ok(all_fills)
    }

    async fn account_info(&self) -> Result<AccountSnapshot, DataSourceError> {
        let body = self.signed_get("/fapi/v2/account", Vec::new()).await?;
        Ok(AccountSnapshot {
            total_wallet_balance: json_f64(&body, "totalWalletBalance")?,
            total_unrealized_pnl: json_f64(&body, "totalUnrealizedProfit")?,
            total_margin_balance: json_f64(&body, "totalMarginBalance")?,
            max_withdraw_amount: json_f64(&body, "maxWithdrawAmount")?,
        })
    }
}

/// Read a numeric field that the exchange reports as either a JSON number or
/// a decimal string.
fn json_f64(value: &Value, field: &str) -> Result<f64, DataSourceError> {
    let raw = value
        .get(field)
        .ok_or_else(|| DataSourceError::Parse(format!("Missing {} field", field)))?;
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DataSourceError::Parse(format!("Invalid {}", field))),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| DataSourceError::Parse(format!("Invalid {}: {}", field, s))),
        _ => Err(DataSourceError::Parse(format!("Invalid {} field", field))),
    }
}

fn json_i64(value: &Value, field: &str) -> Result<i64, DataSourceError> {
    let raw = value
        .get(field)
        .ok_or_else(|| DataSourceError::Parse(format!("Missing {} field", field)))?;
    match raw {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| DataSourceError::Parse(format!("Invalid {}", field))),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| DataSourceError::Parse(format!("Invalid {}: {}", field, s))),
        _ => Err(DataSourceError::Parse(format!("Invalid {} field", field))),
    }
}

fn json_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, DataSourceError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::Parse(format!("Missing {} field", field)))
}

fn parse_income(item: &Value) -> Result<IncomeEvent, DataSourceError> {
    Ok(IncomeEvent {
        time: TimeMs::new(json_i64(item, "time")?),
        kind: IncomeKind::from_wire(json_str(item, "incomeType")?),
        amount: json_f64(item, "income")?,
        symbol: item
            .get("symbol")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(Symbol::new),
    })
}

fn parse_fill(item: &Value) -> Result<Fill, DataSourceError> {
    let side = match json_str(item, "side")? {
        "BUY" => Side::Buy,
        "SELL" => Side::Sell,
        other => {
            return Err(DataSourceError::Parse(format!("Invalid side: {}", other)))
        }
    };

    let id = match item.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(DataSourceError::Parse("Missing id field".to_string())),
    };
    let order_id = match item.get("orderId") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(DataSourceError::Parse("Missing orderId field".to_string())),
    };

    Ok(Fill {
        id,
        symbol: Symbol::new(json_str(item, "symbol")?),
        order_id,
        side,
        quantity: json_f64(item, "qty")?,
        price: json_f64(item, "price")?,
        fee: json_f64(item, "commission")?,
        timestamp: TimeMs::new(json_i64(item, "time")?),
        is_maker: item.get("maker").and_then(|v| v.as_bool()).unwrap_or(false),
    })
}
