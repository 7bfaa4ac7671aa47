mod favorites;
mod store;
mod stored_set;
mod waitlist;

pub use favorites::{Favorites, FAVORITES_KEY};
pub use store::{JsonFileStore, KeyValueStore, KeyValueStoreExt, MemoryStore};
pub use waitlist::{Waitlist, WAITLIST_KEY};
