pub mod client;
pub mod message;
pub mod server;
pub mod tools;

pub use client::MailClient;
pub use server::EmailServer;
