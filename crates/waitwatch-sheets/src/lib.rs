pub mod client;
pub mod csv_sink;
pub mod error;
pub mod sink;
pub mod types;

pub use client::SheetsClient;
pub use csv_sink::append_csv;
pub use error::SinkError;
pub use sink::{Destination, PersistOutcome, RecordSink};
