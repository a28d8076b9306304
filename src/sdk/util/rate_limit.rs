use std::num::NonZeroU32;
use std::sync::Arc;
use governor::{Quota, RateLimiter};
use governor::state::{NotKeyed, InMemoryState};
use governor::clock::DefaultClock;

pub type Limiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Free-tier directions quota of the hosted ORS API.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 40;

pub fn ors_limiter(per_minute: NonZeroU32) -> Limiter {
    let quota = Quota::per_minute(per_minute);
    Arc::new(RateLimiter::direct(quota))
}
