pub mod csv;
pub mod error;

pub use csv::{feed_stream, read_events, write_matches, CsvSchema};
pub use error::{IoError, IoResult};
