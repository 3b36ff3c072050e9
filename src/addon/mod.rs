pub mod client;
pub mod manifest;
pub mod model;

pub use client::{AddonClient, AddonClientTrait, DynAddonClient, MockAddonClientTrait};
pub use manifest::{ConfiguredAddon, resolve_base_url};
pub use model::{Manifest, MediaRequest, Stream, StreamsResponse};
