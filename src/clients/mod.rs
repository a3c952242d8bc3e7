pub mod daily_client;
pub mod hourly_client;
pub mod monthly_client;
