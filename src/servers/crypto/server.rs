use super::client::CoinGeckoClient;
use super::tools::{
    CryptoPriceTool, FearGreedTool, SearchCryptoTool, TopCryptosTool, TrendingCryptosTool,
};
use crate::server::{register, Server, ToolMap};
use crate::CoinGeckoConfig;
use std::sync::Arc;

/// Market data from CoinGecko and the Fear & Greed index
pub struct CryptoServer {
    tools: ToolMap,
}

impl CryptoServer {
    pub fn new(config: CoinGeckoConfig) -> Self {
        let client = Arc::new(CoinGeckoClient::new(config));
        let mut tools = ToolMap::new();

        register(&mut tools, CryptoPriceTool::new(client.clone()));
        register(&mut tools, TopCryptosTool::new(client.clone()));
        register(&mut tools, SearchCryptoTool::new(client.clone()));
        register(&mut tools, TrendingCryptosTool::new(client.clone()));
        register(&mut tools, FearGreedTool::new(client));

        log::debug!("Crypto server registered {} tools", tools.len());
        Self { tools }
    }
}

#[async_trait::async_trait]
impl Server for CryptoServer {
    fn name(&self) -> &str {
        "crypto"
    }

    fn description(&self) -> &str {
        "Cryptocurrency prices, market rankings, search, trending coins and the Fear & Greed index."
    }

    fn tools(&self) -> &ToolMap {
        &self.tools
    }
}
