pub mod barber;
pub mod client;
pub mod error;
pub mod rate_limit;
pub mod selector;
pub mod weather;

pub use barber::BarberCollector;
pub use client::HttpClient;
pub use error::ScraperError;
pub use rate_limit::politeness_delay;
pub use selector::{extract_wait_text, parse_wait_count, xpath_to_css};
pub use weather::{simplify_forecast, WeatherCollector};
