pub mod errors;
pub mod lookup;
pub mod model;
pub mod timestamp;

pub use errors::ParserError;
pub use lookup::{lookup, lookup_array, lookup_text};
pub use model::{Address, Event, Shipment, ShipmentSource, TrackingDocument};
pub use timestamp::{parse_epoch_millis, parse_timestamp, parse_timestamp_str, Timestamp};
