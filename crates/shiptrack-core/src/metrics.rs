use std::collections::HashSet;

use shiptrack_parser::{Event, Shipment, Timestamp};

use crate::config::{ReportConfig, ZeroTransitPolicy};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Derived transit metrics for one shipment, in report column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsRow {
    pub tracking_number: Option<String>,
    pub service_type: Option<String>,
    pub carrier_code: Option<String>,
    pub package_weight_kg: Option<String>,
    pub packaging_type: Option<String>,
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub pickup_datetime: Option<Timestamp>,
    pub delivery_datetime: Option<Timestamp>,
    pub total_transit_hours: Option<f64>,
    pub num_facilities_visited: usize,
    pub num_in_transit_events: usize,
    pub inter_facility_transit_hours: Option<f64>,
    pub avg_hours_per_facility: Option<f64>,
    pub is_express_service: bool,
    pub delivery_location_type: Option<String>,
    pub num_out_for_delivery_attempts: usize,
    pub first_attempt_delivery: bool,
    pub total_events_count: usize,
}

type EventKey<'a> = (
    Option<&'a str>,
    Option<Timestamp>,
    Option<&'a str>,
    Option<&'a str>,
);

fn event_key(event: &Event) -> EventKey<'_> {
    (
        event.event_type.as_deref(),
        event.event_time,
        event.arrival_location.as_deref(),
        event.address.city.as_deref(),
    )
}

/// Drops repeated scans, keeping the first occurrence of each
/// (type, time, location, city) and the input order.
pub fn dedup_events(events: &[Event]) -> Vec<Event> {
    let mut seen: HashSet<EventKey<'_>> = HashSet::with_capacity(events.len());
    events
        .iter()
        .filter(|event| seen.insert(event_key(*event)))
        .cloned()
        .collect()
}

pub fn hours_between(start: Timestamp, end: Timestamp) -> f64 {
    (end - start).as_seconds_f64() / SECONDS_PER_HOUR
}

/// Sum of gaps between consecutive facility scans, ordered by time. Scans
/// without a timestamp do not contribute a gap.
pub fn inter_facility_hours(facility_events: &[&Event]) -> Option<f64> {
    if facility_events.len() < 2 {
        return None;
    }

    let mut times: Vec<Timestamp> = facility_events
        .iter()
        .filter_map(|event| event.event_time)
        .collect();
    times.sort_unstable();

    Some(
        times
            .windows(2)
            .map(|pair| hours_between(pair[0], pair[1]))
            .sum(),
    )
}

pub fn is_express_service(service_type: Option<&str>, keywords: &[String]) -> bool {
    let Some(service) = service_type.filter(|service| !service.is_empty()) else {
        return false;
    };
    let service = service.to_uppercase();
    keywords
        .iter()
        .any(|keyword| service.contains(&keyword.to_uppercase()))
}

pub struct MetricsExtractor<'a> {
    config: &'a ReportConfig,
}

impl<'a> MetricsExtractor<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, shipment: &Shipment) -> MetricsRow {
        let codes = &self.config.event_codes;
        let events = dedup_events(&shipment.events);

        let pickup = times_of(&events, &codes.pickup).min();
        let delivery = times_of(&events, &codes.delivered).max();
        let total_transit_hours = match (pickup, delivery) {
            (Some(pickup), Some(delivery)) => Some(hours_between(pickup, delivery)),
            _ => None,
        };

        let facility_events: Vec<&Event> = events
            .iter()
            .filter(|event| {
                event
                    .arrival_location
                    .as_deref()
                    .unwrap_or_default()
                    .contains(self.config.facility_marker.as_str())
            })
            .collect();

        let num_facilities_visited = facility_events
            .iter()
            .map(|event| {
                (
                    event.address.city.as_deref(),
                    event.address.state.as_deref(),
                    event.arrival_location.as_deref(),
                )
            })
            .collect::<HashSet<_>>()
            .len();

        let avg_hours_per_facility = total_transit_hours
            .filter(|hours| {
                *hours != 0.0 || self.config.zero_transit == ZeroTransitPolicy::Zero
            })
            .filter(|_| !facility_events.is_empty())
            .map(|hours| hours / facility_events.len() as f64);

        let num_out_for_delivery_attempts = count_of(&events, &codes.out_for_delivery);

        MetricsRow {
            tracking_number: shipment.tracking_number.clone(),
            service_type: shipment.service_type.clone(),
            carrier_code: shipment.carrier_code.clone(),
            package_weight_kg: shipment.package_weight.clone(),
            packaging_type: shipment.packaging_type.clone(),
            origin_city: shipment.origin.city.clone(),
            origin_state: shipment.origin.state.clone(),
            destination_city: shipment.destination.city.clone(),
            destination_state: shipment.destination.state.clone(),
            pickup_datetime: pickup,
            delivery_datetime: delivery,
            total_transit_hours,
            num_facilities_visited,
            num_in_transit_events: count_of(&events, &codes.in_transit),
            inter_facility_transit_hours: inter_facility_hours(&facility_events),
            avg_hours_per_facility,
            is_express_service: is_express_service(
                shipment.service_type.as_deref(),
                &self.config.express_keywords,
            ),
            delivery_location_type: shipment.delivery_location_type.clone(),
            num_out_for_delivery_attempts,
            first_attempt_delivery: num_out_for_delivery_attempts == 1,
            total_events_count: events.len(),
        }
    }
}

fn times_of<'e>(events: &'e [Event], code: &'e str) -> impl Iterator<Item = Timestamp> + 'e {
    events
        .iter()
        .filter(move |event| event.is_type(code))
        .filter_map(|event| event.event_time)
}

fn count_of(events: &[Event], code: &str) -> usize {
    events.iter().filter(|event| event.is_type(code)).count()
}
