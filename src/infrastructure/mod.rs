pub mod cache_storage;
pub mod network;

pub use cache_storage::{CacheEntry, CacheStorage, RegistrationRecord};
pub use network::{resolve_site, DirectoryNetwork, HttpNetwork, NetResponse, Network, SiteNetwork};
