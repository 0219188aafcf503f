// =============================================================================
// Binance REST market-data client — public, unsigned GET requests
// =============================================================================
//
// Two endpoints relative to the configured REST root:
//   klines?symbol=S&interval=1m&limit=N   → array of positional kline arrays
//   ticker/price?symbol=S                 → {"symbol": "...", "price": "..."}
//
// The loaded credentials are never attached; both endpoints are public.
// One request per call. A second attempt happens only when `retry_transient`
// is enabled and the first attempt timed out or could not connect.
// =============================================================================

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{FeedError, FormatError, NetworkError};
use crate::market_data::RawCandle;
use crate::runtime_config::FeedConfig;

/// Candle width requested from the klines endpoint.
pub const KLINE_INTERVAL: &str = "1m";

/// Live price as the exchange reported it. `price` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: String,
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.price)
    }
}

#[derive(Debug, Clone)]
pub struct MarketDataClient {
    base_url: String,
    client: reqwest::Client,
    retry_transient: bool,
    retry_backoff: Duration,
}

impl MarketDataClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &FeedConfig) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(NetworkError::Client)?;

        let mut base_url = config.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        debug!(
            base_url = %base_url,
            timeout_ms = config.request_timeout_ms,
            retry_transient = config.retry_transient,
            "MarketDataClient initialised"
        );

        Ok(Self {
            base_url,
            client,
            retry_transient: config.retry_transient,
            retry_backoff: config.retry_backoff(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Public market data
    // -------------------------------------------------------------------------

    /// GET klines: the most recent `limit` one-minute candles, oldest first.
    ///
    /// Records are returned untouched; naming and validation of the twelve
    /// positions happens in the formatter.
    #[instrument(skip(self), name = "binance::fetch_candles")]
    pub async fn fetch_candles(&self, symbol: &str, limit: u32) -> Result<Vec<RawCandle>, FeedError> {
        let url = format!(
            "{}klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, KLINE_INTERVAL, limit
        );

        let body = self.get_text(&url).await?;
        let candles: Vec<RawCandle> = serde_json::from_str(&body).map_err(|source| {
            FormatError::Decode {
                what: "klines response",
                source,
            }
        })?;

        debug!(symbol, count = candles.len(), "klines fetched");
        Ok(candles)
    }

    /// GET ticker/price: latest traded price for `symbol`.
    #[instrument(skip(self), name = "binance::fetch_price")]
    pub async fn fetch_price(&self, symbol: &str) -> Result<PriceQuote, FeedError> {
        let url = format!("{}ticker/price?symbol={}", self.base_url, symbol);

        let body = self.get_text(&url).await?;
        let value: Value = serde_json::from_str(&body).map_err(|source| FormatError::Decode {
            what: "ticker response",
            source,
        })?;

        let price = value
            .get("price")
            .and_then(Value::as_str)
            .ok_or(FormatError::MissingField { field: "price" })?
            .to_string();
        let symbol = value
            .get("symbol")
            .and_then(Value::as_str)
            .unwrap_or(symbol)
            .to_string();

        debug!(symbol = %symbol, price = %price, "price fetched");
        Ok(PriceQuote { symbol, price })
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    async fn get_text(&self, url: &str) -> Result<String, NetworkError> {
        match self.get_once(url).await {
            Err(err) if self.retry_transient && err.is_transient() => {
                warn!(
                    url,
                    error = %err,
                    backoff = ?self.retry_backoff,
                    "transient failure, retrying once"
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.get_once(url).await
            }
            other => other,
        }
    }

    async fn get_once(&self, url: &str) -> Result<String, NetworkError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(url, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| NetworkError::from_reqwest(url, e))?;

        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

// =============================================================================
// Tests against a local axum server standing in for the exchange
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/v3/")
    }

    fn client(base_url: String) -> MarketDataClient {
        let config = FeedConfig {
            base_url,
            request_timeout_ms: 2_000,
            ..FeedConfig::default()
        };
        MarketDataClient::new(&config).unwrap()
    }

    fn kline(open_time: i64) -> Value {
        json!([
            open_time, "1850.10", "1851.00", "1849.50", "1850.23", "12.5",
            open_time + 59_999, "23125.4", 87, "6.1", "11288.0", "0"
        ])
    }

    #[tokio::test]
    async fn fetch_candles_sends_symbol_interval_and_limit() {
        let seen: Arc<Mutex<Option<HashMap<String, String>>>> = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/api/v3/klines",
            get(move |Query(q): Query<HashMap<String, String>>| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = Some(q);
                    Json(json!([kline(1_690_000_000_000), kline(1_690_000_060_000)]))
                }
            }),
        );
        let api = client(serve(app).await);

        let candles = api.fetch_candles("ETHUSDT", 2).await.unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].len(), 12);
        assert_eq!(candles[1][0], json!(1_690_000_060_000_i64));

        let q = seen.lock().unwrap().clone().unwrap();
        assert_eq!(q["symbol"], "ETHUSDT");
        assert_eq!(q["interval"], "1m");
        assert_eq!(q["limit"], "2");
    }

    #[tokio::test]
    async fn fetched_candles_format_end_to_end() {
        let app = Router::new().route(
            "/api/v3/klines",
            get(|| async {
                let rows: Vec<Value> = (0..50).map(|i| kline(1_690_000_000_000 + i * 60_000)).collect();
                Json(Value::Array(rows))
            }),
        );
        let api = client(serve(app).await);

        let raw = api.fetch_candles("ETHUSDT", 50).await.unwrap();
        let table = crate::market_data::format_candles_default(&raw).unwrap();
        assert_eq!(table.len(), 50);
        assert_eq!(table.rows()[0].close, 1850.23);
        assert_eq!(table.rows()[0].quote_asset_volume, 23125.4);
    }

    #[tokio::test]
    async fn empty_klines_array_is_fine() {
        let app = Router::new().route("/api/v3/klines", get(|| async { Json(json!([])) }));
        let api = client(serve(app).await);
        assert!(api.fetch_candles("ETHUSDT", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_price_returns_string_verbatim() {
        let seen: Arc<Mutex<Option<String>>> = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/api/v3/ticker/price",
            get(move |Query(q): Query<HashMap<String, String>>| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = q.get("symbol").cloned();
                    Json(json!({ "symbol": "ETHUSDT", "price": "1850.23" }))
                }
            }),
        );
        let api = client(serve(app).await);

        let quote = api.fetch_price("ETHUSDT").await.unwrap();
        assert_eq!(quote.price, "1850.23");
        assert_eq!(quote.symbol, "ETHUSDT");
        assert_eq!(quote.to_string(), "ETHUSDT 1850.23");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("ETHUSDT"));
    }

    #[tokio::test]
    async fn trailing_zeros_are_not_normalised() {
        let app = Router::new().route(
            "/api/v3/ticker/price",
            get(|| async { Json(json!({ "symbol": "ETHUSDT", "price": "1850.23000000" })) }),
        );
        let api = client(serve(app).await);
        assert_eq!(api.fetch_price("ETHUSDT").await.unwrap().price, "1850.23000000");
    }

    #[tokio::test]
    async fn numeric_or_missing_price_is_a_format_error() {
        let app = Router::new()
            .route(
                "/api/v3/ticker/price",
                get(|| async { Json(json!({ "symbol": "ETHUSDT", "price": 1850.23 })) }),
            );
        let api = client(serve(app).await);
        assert!(matches!(
            api.fetch_price("ETHUSDT").await,
            Err(FeedError::Format(FormatError::MissingField { field: "price" }))
        ));

        let app = Router::new().route("/api/v3/ticker/price", get(|| async { Json(json!({})) }));
        let api = client(serve(app).await);
        assert!(matches!(
            api.fetch_price("ETHUSDT").await,
            Err(FeedError::Format(FormatError::MissingField { .. }))
        ));
    }

    #[tokio::test]
    async fn non_array_klines_body_is_a_decode_error() {
        let app = Router::new().route(
            "/api/v3/klines",
            get(|| async { Json(json!({ "code": 0, "msg": "maintenance" })) }),
        );
        let api = client(serve(app).await);
        assert!(matches!(
            api.fetch_candles("ETHUSDT", 10).await,
            Err(FeedError::Format(FormatError::Decode { what: "klines response", .. }))
        ));
    }

    #[tokio::test]
    async fn error_status_keeps_code_and_body() {
        let app = Router::new().route(
            "/api/v3/klines",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    r#"{"code":-1121,"msg":"Invalid symbol."}"#,
                )
            }),
        );
        let api = client(serve(app).await);

        match api.fetch_candles("NOPE", 10).await {
            Err(FeedError::Network(NetworkError::Status { status, body, url })) => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid symbol"));
                assert!(url.contains("symbol=NOPE"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = client(format!("http://{addr}/api/v3/"));
        let err = api.fetch_price("ETHUSDT").await.unwrap_err();
        assert!(matches!(err, FeedError::Network(ref e) if e.is_transient()), "{err:?}");
    }

    #[tokio::test]
    async fn slow_server_times_out_without_retry() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/api/v3/ticker/price",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(json!({ "symbol": "ETHUSDT", "price": "1" }))
                }
            }),
        );
        let config = FeedConfig {
            base_url: serve(app).await,
            request_timeout_ms: 100,
            ..FeedConfig::default()
        };
        let api = MarketDataClient::new(&config).unwrap();

        assert!(matches!(
            api.fetch_price("ETHUSDT").await,
            Err(FeedError::Network(NetworkError::Timeout { .. }))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn opt_in_retry_recovers_from_one_timeout() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/api/v3/ticker/price",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                    Json(json!({ "symbol": "ETHUSDT", "price": "1850.23" }))
                }
            }),
        );
        let config = FeedConfig {
            base_url: serve(app).await,
            request_timeout_ms: 200,
            retry_transient: true,
            retry_backoff_ms: 10,
            ..FeedConfig::default()
        };
        let api = MarketDataClient::new(&config).unwrap();

        let quote = api.fetch_price("ETHUSDT").await.unwrap();
        assert_eq!(quote.price, "1850.23");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn status_errors_are_never_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/api/v3/ticker/price",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }),
        );
        let config = FeedConfig {
            base_url: serve(app).await,
            retry_transient: true,
            retry_backoff_ms: 10,
            ..FeedConfig::default()
        };
        let api = MarketDataClient::new(&config).unwrap();

        assert!(matches!(
            api.fetch_price("ETHUSDT").await,
            Err(FeedError::Network(NetworkError::Status { status: 503, .. }))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = FeedConfig {
            base_url: "http://localhost:1/api/v3".into(),
            ..FeedConfig::default()
        };
        let api = MarketDataClient::new(&config).unwrap();
        assert_eq!(api.base_url(), "http://localhost:1/api/v3/");
    }
}
