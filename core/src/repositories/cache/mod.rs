pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::MemoryCacheStore;
pub use r#trait::{CacheStore, SharedCache};

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockCacheStore;

#[cfg(test)]
mod tests;
