use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use std::env;

pub mod organizer;
pub mod server;
pub mod servers;
pub mod tool;
pub mod utils;

use organizer::{CancelToken, EngineOptions, DEFAULT_BLOCK_SIZE};
use server::{servers_to_json, Server};
use utils::env_or;

const DEFAULT_READ_LIMIT: u64 = 1024 * 1024;
const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_FEAR_GREED_URL: &str = "https://api.alternative.me/fng/";
const USER_AGENT: &str = concat!("file-toolbox/", env!("CARGO_PKG_VERSION"));
const DEFAULT_IMAP_SERVER: &str = "imap.gmail.com";
const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

/// Engine and file-tool settings
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    pub hash_block_size: usize,
    pub workers: usize,
    pub read_limit: u64,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            hash_block_size: DEFAULT_BLOCK_SIZE,
            workers: 0,
            read_limit: DEFAULT_READ_LIMIT,
        }
    }
}

impl OrganizerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let hash_block_size = match env_or("ORGANIZER_HASH_BLOCK_SIZE", defaults.hash_block_size) {
            0 => defaults.hash_block_size,
            size => size,
        };

        Self {
            hash_block_size,
            workers: env_or("ORGANIZER_WORKERS", defaults.workers),
            read_limit: env_or("ORGANIZER_READ_LIMIT", defaults.read_limit),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            block_size: self.hash_block_size,
            workers: self.workers,
            cancel: CancelToken::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub api_url: String,
    pub fear_greed_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub client: Client,
}

impl CoinGeckoConfig {
    pub fn from_env() -> Result<Self> {
        let api_url =
            env::var("COINGECKO_API_URL").unwrap_or_else(|_| DEFAULT_COINGECKO_URL.to_string());
        let fear_greed_url =
            env::var("FEAR_GREED_API_URL").unwrap_or_else(|_| DEFAULT_FEAR_GREED_URL.to_string());
        let timeout_seconds = env_or("COINGECKO_TIMEOUT", 30);

        Self::build(api_url, fear_greed_url, timeout_seconds)
    }

    /// Point both endpoints somewhere else, e.g. a local mock server.
    pub fn with_base_url(api_url: &str, fear_greed_url: &str) -> Result<Self> {
        Self::build(api_url.to_string(), fear_greed_url.to_string(), 30)
    }

    fn build(api_url: String, fear_greed_url: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            api_url,
            fear_greed_url,
            user_agent: USER_AGENT.to_string(),
            timeout_seconds,
            client,
        })
    }
}

/// Mail account settings. Tools fail with a configuration message until
/// both the address and the password are set.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub address: Option<String>,
    pub password: Option<String>,
    pub imap_server: String,
    pub imap_port: u16,
    pub smtp_server: String,
    pub smtp_port: u16,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            address: None,
            password: None,
            imap_server: DEFAULT_IMAP_SERVER.to_string(),
            imap_port: 993,
            smtp_server: DEFAULT_SMTP_SERVER.to_string(),
            smtp_port: 587,
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| env::var(name).ok().filter(|value| !value.trim().is_empty());

        Self {
            address: non_empty("EMAIL_ADDRESS"),
            password: non_empty("EMAIL_PASSWORD"),
            imap_server: non_empty("EMAIL_IMAP_SERVER").unwrap_or(defaults.imap_server),
            imap_port: env_or("EMAIL_IMAP_PORT", defaults.imap_port),
            smtp_server: non_empty("EMAIL_SMTP_SERVER").unwrap_or(defaults.smtp_server),
            smtp_port: env_or("EMAIL_SMTP_PORT", defaults.smtp_port),
        }
    }

    /// Address and password, or an error naming the variables to set.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (&self.address, &self.password) {
            (Some(address), Some(password)) => Ok((address.as_str(), password.as_str())),
            _ => Err(anyhow::anyhow!(
                "Email credentials not configured. Set EMAIL_ADDRESS and EMAIL_PASSWORD."
            )),
        }
    }
}

pub use organizer::{batch_rename, directory_statistics, find_duplicates, organize_by_type};
pub use servers::{CryptoServer, EmailServer, FileManagerServer, SystemMonitorServer};

/// Every server the process exposes, searched in registration order
pub struct Toolbox {
    servers: Vec<Box<dyn Server>>,
}

impl Toolbox {
    pub fn new(servers: Vec<Box<dyn Server>>) -> Self {
        Self { servers }
    }

    pub fn from_env() -> Result<Self> {
        let organizer = OrganizerConfig::from_env();
        let coingecko = CoinGeckoConfig::from_env()?;
        let email = EmailConfig::from_env();

        Ok(Self::new(vec![
            Box::new(FileManagerServer::new(&organizer)),
            Box::new(CryptoServer::new(coingecko)),
            Box::new(SystemMonitorServer::new()),
            Box::new(EmailServer::new(email)),
        ]))
    }

    pub fn servers(&self) -> impl Iterator<Item = &dyn Server> {
        self.servers.iter().map(|server| server.as_ref())
    }

    /// The server that owns `tool_name`, if any
    pub fn server_for(&self, tool_name: &str) -> Option<&dyn Server> {
        self.servers().find(|server| server.tool(tool_name).is_some())
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.servers()
            .flat_map(|server| server.tools().keys().cloned())
            .collect()
    }

    pub fn describe(&self) -> Vec<Value> {
        let servers: Vec<&dyn Server> = self.servers().collect();
        servers_to_json(&servers)
    }

    pub async fn call(&self, tool_name: &str, arguments: &str) -> String {
        match self.server_for(tool_name) {
            Some(server) => server.call(tool_name, arguments).await,
            None => {
                log::warn!("No server offers tool {}", tool_name);
                format!("Tool not found: {}", tool_name)
            }
        }
    }
}

/// Run one tool by name with JSON arguments and return its text output
pub async fn process_message(tool_name: &str, arguments: &str) -> Result<String> {
    let toolbox = Toolbox::from_env()?;
    let output = toolbox.call(tool_name, arguments).await;
    log::info!("Tool {} finished", tool_name);
    Ok(output)
}
