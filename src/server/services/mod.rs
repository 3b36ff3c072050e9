pub mod proxy_services;
pub mod selection_services;

pub use proxy_services::ProxyServices;
pub use selection_services::{FormatFilter, ProbeStrategy, Selection, StreamSelector};
