use serde::Serialize;
use serde_json::Value;

use crate::errors::ParserError;
use crate::lookup::{lookup, lookup_array, lookup_text};
use crate::timestamp::{parse_timestamp, Timestamp};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal: Option<String>,
}

impl Address {
    fn from_value(value: &Value, key: &str) -> Self {
        Self {
            city: lookup_text(value, &[key, "city"]),
            state: lookup_text(value, &[key, "stateOrProvinceCode"]),
            postal: lookup_text(value, &[key, "postalCode"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Event {
    pub event_type: Option<String>,
    pub event_time: Option<Timestamp>,
    pub arrival_location: Option<String>,
    pub address: Address,
}

impl Event {
    pub fn from_value(value: &Value) -> Result<Self, ParserError> {
        Ok(Self {
            event_type: lookup_text(value, &["eventType"]),
            event_time: parse_timestamp(lookup(value, &["timestamp"]))?,
            arrival_location: lookup_text(value, &["arrivalLocation"]),
            address: Address::from_value(value, "address"),
        })
    }

    pub fn is_type(&self, code: &str) -> bool {
        self.event_type.as_deref() == Some(code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Shipment {
    pub tracking_number: Option<String>,
    pub service_type: Option<String>,
    pub carrier_code: Option<String>,
    pub package_weight: Option<String>,
    pub packaging_type: Option<String>,
    pub origin: Address,
    pub destination: Address,
    pub delivery_location_type: Option<String>,
    pub events: Vec<Event>,
}

impl Shipment {
    /// Builds a shipment from one `trackDetails` entry. Fails only when an
    /// event carries a timestamp that cannot be read.
    pub fn from_value(value: &Value) -> Result<Self, ParserError> {
        let events = lookup_array(value, &["events"])
            .iter()
            .filter(|event| event.is_object())
            .map(Event::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tracking_number: lookup_text(value, &["trackingNumber"]),
            service_type: lookup_text(value, &["service", "type"]),
            carrier_code: lookup_text(value, &["carrierCode"]),
            package_weight: lookup_text(value, &["packageWeight", "value"]),
            packaging_type: lookup_text(value, &["packaging", "type"]),
            origin: Address::from_value(value, "shipperAddress"),
            destination: Address::from_value(value, "destinationAddress"),
            delivery_location_type: lookup_text(value, &["deliveryLocationType"]),
            events,
        })
    }
}

/// One `trackDetails` entry together with its position in the document.
#[derive(Debug, Clone, Copy)]
pub struct ShipmentSource<'a> {
    pub record_index: usize,
    pub shipment_index: usize,
    pub value: &'a Value,
}

impl ShipmentSource<'_> {
    pub fn tracking_number(&self) -> Option<String> {
        lookup_text(self.value, &["trackingNumber"])
    }

    pub fn load(&self) -> Result<Shipment, ParserError> {
        Shipment::from_value(self.value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackingDocument {
    records: Vec<Value>,
}

impl TrackingDocument {
    /// Parses a tracking export. A top-level array holds one tracking
    /// response per element; a lone object is a single response; anything
    /// else holds no responses.
    pub fn from_json(content: &str) -> Result<Self, ParserError> {
        let root: Value =
            serde_json::from_str(content).map_err(|source| ParserError::Json { source })?;
        Ok(Self::from_value(root))
    }

    pub fn from_value(root: Value) -> Self {
        let records = match root {
            Value::Array(records) => records,
            record @ Value::Object(_) => vec![record],
            _ => Vec::new(),
        };
        Self { records }
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn shipments(&self) -> impl Iterator<Item = ShipmentSource<'_>> {
        self.records
            .iter()
            .enumerate()
            .flat_map(|(record_index, record)| {
                lookup_array(record, &["trackDetails"])
                    .iter()
                    .enumerate()
                    .filter(|(_, shipment)| shipment.is_object())
                    .map(move |(shipment_index, value)| ShipmentSource {
                        record_index,
                        shipment_index,
                        value,
                    })
            })
    }
}
