pub mod client;
pub mod server;
pub mod tools;

pub use client::CoinGeckoClient;
pub use server::CryptoServer;
