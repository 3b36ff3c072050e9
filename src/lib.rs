pub mod addon;
pub mod config;
pub mod logger;
pub mod server;

pub use addon::*;
pub use config::*;
pub use logger::*;
pub use server::AddonProxyServer;
pub use server::services::ProxyServices;
