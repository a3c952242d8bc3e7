pub mod granularity;
pub mod page;
pub mod station;
pub mod traits;
