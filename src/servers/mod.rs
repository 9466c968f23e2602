pub mod crypto;
pub mod email;
pub mod file;
pub mod system;

pub use crypto::CryptoServer;
pub use email::EmailServer;
pub use file::FileManagerServer;
pub use system::SystemMonitorServer;
