pub mod server;
pub mod snapshot;
pub mod tools;

pub use server::SystemMonitorServer;
