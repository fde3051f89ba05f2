//! Caching strategies executed against the cache store.

pub mod network_first;
pub mod stale;

pub use network_first::network_first;
pub use stale::stale_while_revalidate;
