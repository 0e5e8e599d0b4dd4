pub mod assets;
pub mod dexscreener;
pub mod excluded_accounts;
pub mod filter;
pub mod monitor;
pub mod normalize;
pub mod pipeline;
pub mod pumpfun;
pub mod rank;
pub mod reputation;
pub mod source;
pub mod token;

use governor::{RateLimiter, state::{NotKeyed, InMemoryState}, clock::DefaultClock};

/// Shared throttle for every upstream lookup made while enriching.
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;
