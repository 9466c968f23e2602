use super::client::CoinGeckoClient;
use crate::tool::{parse_arguments, Tool};
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_TOP_LIMIT: u32 = 100;
const MAX_SEARCH_RESULTS: usize = 10;

/// "$1,234,567.89"
pub fn format_usd(amount: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
        None => (formatted, None),
    };

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{}${}.{}", sign, grouped, fraction),
        None => format!("{}${}", sign, grouped),
    }
}

/// "$1.23T", "$45.60B", "$7.00M", "$8.90K", "$12.00"
pub fn format_compact_usd(amount: f64) -> String {
    if amount >= 1e12 {
        format!("${:.2}T", amount / 1e12)
    } else if amount >= 1e9 {
        format!("${:.2}B", amount / 1e9)
    } else if amount >= 1e6 {
        format!("${:.2}M", amount / 1e6)
    } else if amount >= 1e3 {
        format!("${:.2}K", amount / 1e3)
    } else {
        format!("${:.2}", amount)
    }
}

pub fn format_change(change: f64) -> String {
    format!("{:+.2}%", change)
}

pub fn classify_fear_greed(value: f64) -> &'static str {
    if value <= 25.0 {
        "Extreme Fear"
    } else if value <= 45.0 {
        "Fear"
    } else if value <= 55.0 {
        "Neutral"
    } else if value <= 75.0 {
        "Greed"
    } else {
        "Extreme Greed"
    }
}

fn rank(rank: Option<u64>) -> String {
    rank.map(|r| format!("#{}", r)).unwrap_or_else(|| "N/A".to_string())
}

pub struct CryptoPriceTool {
    client: Arc<CoinGeckoClient>,
}

#[derive(serde::Deserialize)]
struct PriceParams {
    symbol: String,
}

impl CryptoPriceTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for CryptoPriceTool {
    fn name(&self) -> &str {
        "get_crypto_price"
    }

    fn description(&self) -> &str {
        "Get the current USD price, market cap, 24h volume and 24h change for a cryptocurrency."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "CoinGecko coin id (e.g. 'bitcoin', 'ethereum', 'dogecoin')"
                }
            },
            "required": ["symbol"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: PriceParams = parse_arguments(self.name(), arguments)?;
        let id = params.symbol.trim().to_lowercase();
        if id.is_empty() {
            return Err(anyhow::anyhow!("symbol cannot be empty"));
        }

        let price = match self.client.simple_price(&id).await? {
            Some(price) => price,
            None => {
                return Ok(format!(
                    "Cryptocurrency '{}' not found. Please check the symbol and try again.",
                    id
                ))
            }
        };

        Ok(format!(
            "Price Information for {}:\n\
             Current Price: {}\n\
             Market Cap: {}\n\
             24h Volume: {}\n\
             24h Change: {}",
            id.to_uppercase(),
            format_usd(price.usd.unwrap_or(0.0), 2),
            format_usd(price.usd_market_cap.unwrap_or(0.0), 0),
            format_usd(price.usd_24h_vol.unwrap_or(0.0), 0),
            format_change(price.usd_24h_change.unwrap_or(0.0))
        ))
    }
}

pub struct TopCryptosTool {
    client: Arc<CoinGeckoClient>,
}

#[derive(serde::Deserialize)]
struct TopParams {
    #[serde(default = "default_top_limit")]
    limit: u32,
}

fn default_top_limit() -> u32 {
    10
}

impl TopCryptosTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for TopCryptosTool {
    fn name(&self) -> &str {
        "get_top_cryptos"
    }

    fn description(&self) -> &str {
        "List the top cryptocurrencies by market capitalization."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_TOP_LIMIT,
                    "description": "Number of coins to return (default: 10, max: 100)"
                }
            }
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: TopParams = parse_arguments(self.name(), arguments)?;
        let limit = params.limit.clamp(1, MAX_TOP_LIMIT);

        let coins = self.client.top_markets(limit).await?;
        if coins.is_empty() {
            return Ok("No cryptocurrency market data returned.".to_string());
        }

        let mut output = format!("Top {} Cryptocurrencies by Market Cap:\n", coins.len());
        for (i, coin) in coins.iter().enumerate() {
            output.push_str(&format!(
                "\n{}. {} ({})\n   Price: {}\n   Market Cap: {}\n   24h Change: {}\n",
                i + 1,
                coin.name,
                coin.symbol.to_uppercase(),
                format_usd(coin.current_price.unwrap_or(0.0), 2),
                format_compact_usd(coin.market_cap.unwrap_or(0.0)),
                format_change(coin.price_change_percentage_24h.unwrap_or(0.0))
            ));
        }
        Ok(output.trim_end().to_string())
    }
}

pub struct SearchCryptoTool {
    client: Arc<CoinGeckoClient>,
}

#[derive(serde::Deserialize)]
struct SearchParams {
    query: String,
}

impl SearchCryptoTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SearchCryptoTool {
    fn name(&self) -> &str {
        "search_crypto"
    }

    fn description(&self) -> &str {
        "Search cryptocurrencies by name or symbol and return their CoinGecko ids."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (name or symbol)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: SearchParams = parse_arguments(self.name(), arguments)?;
        let coins = self.client.search(&params.query).await?;

        if coins.is_empty() {
            return Ok(format!("No cryptocurrencies found matching '{}'.", params.query));
        }

        let mut output = format!("Search Results for '{}':\n", params.query);
        for (i, coin) in coins.iter().take(MAX_SEARCH_RESULTS).enumerate() {
            output.push_str(&format!(
                "\n{}. {} ({})\n   Market Cap Rank: {}\n   ID: {}\n",
                i + 1,
                coin.name,
                coin.symbol.to_uppercase(),
                rank(coin.market_cap_rank),
                coin.id
            ));
        }
        if coins.len() > MAX_SEARCH_RESULTS {
            output.push_str(&format!(
                "\n... and {} more results",
                coins.len() - MAX_SEARCH_RESULTS
            ));
        }
        Ok(output.trim_end().to_string())
    }
}

pub struct TrendingCryptosTool {
    client: Arc<CoinGeckoClient>,
}

impl TrendingCryptosTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for TrendingCryptosTool {
    fn name(&self) -> &str {
        "get_crypto_trending"
    }

    fn description(&self) -> &str {
        "List the cryptocurrencies currently trending on CoinGecko."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let coins = self.client.trending().await?;
        if coins.is_empty() {
            return Ok("No trending cryptocurrencies found.".to_string());
        }

        let mut output = String::from("Trending Cryptocurrencies:\n");
        for (i, coin) in coins.iter().enumerate() {
            output.push_str(&format!(
                "\n{}. {} ({})\n   Market Cap Rank: {}\n   ID: {}\n",
                i + 1,
                coin.name,
                coin.symbol.to_uppercase(),
                rank(coin.market_cap_rank),
                coin.id
            ));
        }
        Ok(output.trim_end().to_string())
    }
}

pub struct FearGreedTool {
    client: Arc<CoinGeckoClient>,
}

impl FearGreedTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for FearGreedTool {
    fn name(&self) -> &str {
        "get_crypto_fear_greed"
    }

    fn description(&self) -> &str {
        "Get the current Crypto Fear & Greed Index value and its interpretation."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let reading = self.client.fear_greed().await?;

        let (value, sentiment) = match reading.value {
            Some(value) => (format!("{}", value), classify_fear_greed(value)),
            None => ("Unknown".to_string(), "Unknown"),
        };

        Ok(format!(
            "Crypto Fear & Greed Index\n\nCurrent Value: {}\nSentiment: {}\nLast Updated: {}",
            value,
            sentiment,
            reading.timestamp.as_deref().unwrap_or("Unknown")
        ))
    }
}
