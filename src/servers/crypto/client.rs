use crate::CoinGeckoConfig;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimplePrice {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_market_cap: Option<f64>,
    #[serde(default)]
    pub usd_24h_vol: Option<f64>,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchCoin {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    item: SearchCoin,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FearGreedReading {
    pub value: Option<f64>,
    pub timestamp: Option<String>,
}

/// Thin HTTP client over the CoinGecko v3 REST API
pub struct CoinGeckoClient {
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("CoinGecko request: {}", url);

        let response = self
            .config
            .client
            .get(url.clone())
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "API request to {} failed with {}: {}",
                url.path(),
                status,
                error_text
            ));
        }

        Ok(response.json().await?)
    }

    /// USD price data for a CoinGecko id; `None` if the id is unknown.
    pub async fn simple_price(&self, id: &str) -> Result<Option<SimplePrice>> {
        let url = self.endpoint(
            "simple/price",
            &[
                ("ids", id),
                ("vs_currencies", "usd"),
                ("include_market_cap", "true"),
                ("include_24hr_vol", "true"),
                ("include_24hr_change", "true"),
            ],
        )?;
        let mut prices: HashMap<String, SimplePrice> = self.get_json(url).await?;
        Ok(prices.remove(id))
    }

    pub async fn top_markets(&self, limit: u32) -> Result<Vec<MarketCoin>> {
        let per_page = limit.to_string();
        let url = self.endpoint(
            "coins/markets",
            &[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ],
        )?;
        self.get_json(url).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchCoin>> {
        let url = self.endpoint("search", &[("query", query)])?;
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.coins)
    }

    pub async fn trending(&self) -> Result<Vec<SearchCoin>> {
        let url = self.endpoint("search/trending", &[])?;
        let response: TrendingResponse = self.get_json(url).await?;
        Ok(response.coins.into_iter().map(|entry| entry.item).collect())
    }

    pub async fn fear_greed(&self) -> Result<FearGreedReading> {
        let url = Url::parse(&self.config.fear_greed_url)?;
        let body: Value = self.get_json(url).await?;
        parse_fear_greed(&body)
            .ok_or_else(|| anyhow::anyhow!("Unexpected data format for Fear & Greed Index"))
    }
}

/// Accepts `{"data": [..]}`, a bare list, or a single reading object.
fn parse_fear_greed(body: &Value) -> Option<FearGreedReading> {
    let latest = match body {
        Value::Object(map) if map.contains_key("data") => map.get("data")?.as_array()?.first()?,
        Value::Array(items) => items.first()?,
        Value::Object(_) => body,
        _ => return None,
    };

    let value = match latest.get("value") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    let timestamp = match latest.get("timestamp") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Some(FearGreedReading { value, timestamp })
}
