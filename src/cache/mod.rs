pub mod result_cache;

pub use result_cache::{CacheEntry, Clock, ResultCache};
