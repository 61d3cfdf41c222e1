pub mod cache_price;
pub mod refresh;

pub use cache_price::{run_job, CachePriceOutcome};
pub use refresh::{PgNotifyPricingCache, PricingCache, RecordingPricingCache};
