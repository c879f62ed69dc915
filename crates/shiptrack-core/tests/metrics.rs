use chrono::{Duration, TimeZone, Utc};
use shiptrack_core::metrics::{
    dedup_events, hours_between, inter_facility_hours, is_express_service,
};
use shiptrack_core::{MetricsExtractor, ReportConfig, ZeroTransitPolicy};
use shiptrack_parser::{Address, Event, Shipment, Timestamp};

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn event(code: &str, time: Option<Timestamp>, location: Option<&str>, city: &str) -> Event {
    Event {
        event_type: Some(code.to_string()),
        event_time: time,
        arrival_location: location.map(str::to_string),
        address: Address {
            city: Some(city.to_string()),
            state: Some("TN".to_string()),
            postal: None,
        },
    }
}

fn shipment(events: Vec<Event>) -> Shipment {
    Shipment {
        tracking_number: Some("1Z999AA10123456784".to_string()),
        service_type: Some("UPS_GROUND".to_string()),
        events,
        ..Shipment::default()
    }
}

#[test]
fn dedup_keeps_first_occurrence_and_order() {
    let events = vec![
        event("PU", Some(t0()), None, "MEMPHIS"),
        event("IT", Some(t0() + Duration::hours(1)), Some("HUB FACILITY"), "MEMPHIS"),
        event("PU", Some(t0()), None, "MEMPHIS"),
        event("IT", Some(t0() + Duration::hours(1)), Some("HUB FACILITY"), "NASHVILLE"),
        event("IT", Some(t0() + Duration::hours(1)), Some("HUB FACILITY"), "MEMPHIS"),
    ];

    let deduped = dedup_events(&events);
    assert_eq!(deduped, vec![events[0].clone(), events[1].clone(), events[3].clone()]);

    let twice = dedup_events(&deduped);
    assert_eq!(twice, deduped);
}

#[test]
fn dedup_ignores_fields_outside_the_identity() {
    let mut first = event("IT", Some(t0()), Some("SORT FACILITY"), "MEMPHIS");
    let mut second = first.clone();
    first.address.postal = Some("38118".to_string());
    second.address.state = Some("AR".to_string());

    let deduped = dedup_events(&[first.clone(), second]);
    assert_eq!(deduped, vec![first]);
}

#[test]
fn end_to_end_single_shipment_metrics() {
    let config = ReportConfig::default();
    let extractor = MetricsExtractor::new(&config);
    let row = extractor.extract(&shipment(vec![
        event("PU", Some(t0()), None, "MEMPHIS"),
        event("IT", Some(t0() + Duration::hours(1)), Some("FACILITY A"), "MEMPHIS"),
        event("DL", Some(t0() + Duration::hours(5)), None, "AUSTIN"),
    ]));

    assert_eq!(row.pickup_datetime, Some(t0()));
    assert_eq!(row.delivery_datetime, Some(t0() + Duration::hours(5)));
    assert_eq!(row.total_transit_hours, Some(5.0));
    assert_eq!(row.num_in_transit_events, 1);
    assert_eq!(row.num_facilities_visited, 1);
    assert_eq!(row.inter_facility_transit_hours, None);
    assert_eq!(row.avg_hours_per_facility, Some(5.0));
    assert_eq!(row.num_out_for_delivery_attempts, 0);
    assert!(!row.first_attempt_delivery);
    assert!(!row.is_express_service);
    assert_eq!(row.total_events_count, 3);
    assert_eq!(row.tracking_number.as_deref(), Some("1Z999AA10123456784"));
}

#[test]
fn pickup_is_earliest_and_delivery_is_latest() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&shipment(vec![
        event("PU", Some(t0() + Duration::hours(2)), None, "MEMPHIS"),
        event("PU", Some(t0()), None, "MEMPHIS"),
        event("PU", None, None, "MEMPHIS"),
        event("DL", Some(t0() + Duration::hours(30)), None, "AUSTIN"),
        event("DL", Some(t0() + Duration::hours(26)), None, "AUSTIN"),
    ]));

    assert_eq!(row.pickup_datetime, Some(t0()));
    assert_eq!(row.delivery_datetime, Some(t0() + Duration::hours(30)));
    assert_eq!(row.total_transit_hours, Some(30.0));
}

#[test]
fn missing_pickup_leaves_transit_unknown() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&shipment(vec![
        event("IT", Some(t0()), Some("FACILITY A"), "MEMPHIS"),
        event("DL", Some(t0() + Duration::hours(5)), None, "AUSTIN"),
    ]));

    assert_eq!(row.pickup_datetime, None);
    assert!(row.delivery_datetime.is_some());
    assert_eq!(row.total_transit_hours, None);
    assert_eq!(row.avg_hours_per_facility, None);
}

#[test]
fn hours_between_keeps_sub_second_precision_in_both_directions() {
    let later = t0() + Duration::minutes(90) + Duration::milliseconds(1_800);

    assert_eq!(hours_between(t0(), t0()), 0.0);
    assert_eq!(hours_between(t0(), t0() + Duration::minutes(45)), 0.75);
    assert!((hours_between(t0(), later) - 1.5005).abs() < 1e-12);
    assert!((hours_between(later, t0()) + 1.5005).abs() < 1e-12);
    assert!((hours_between(t0(), t0() - Duration::milliseconds(900)) + 0.00025).abs() < 1e-12);
}

#[test]
fn negative_transit_passes_through() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&shipment(vec![
        event("PU", Some(t0() + Duration::hours(3)), None, "MEMPHIS"),
        event("IT", Some(t0()), Some("FACILITY A"), "MEMPHIS"),
        event("DL", Some(t0()), None, "AUSTIN"),
    ]));

    assert_eq!(row.total_transit_hours, Some(-3.0));
    assert_eq!(row.avg_hours_per_facility, Some(-3.0));
}

#[test]
fn facility_gaps_sum_in_time_order() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&shipment(vec![
        event("IT", Some(t0() + Duration::hours(2)), Some("FACILITY B"), "DALLAS"),
        event("AR", Some(t0() + Duration::hours(1)), Some("CUSTOMER DOCK"), "DALLAS"),
        event("IT", Some(t0()), Some("FACILITY A"), "MEMPHIS"),
    ]));

    assert_eq!(row.num_facilities_visited, 2);
    assert_eq!(row.inter_facility_transit_hours, Some(2.0));
    assert_eq!(row.num_in_transit_events, 2);
}

#[test]
fn facility_visits_count_distinct_places() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&shipment(vec![
        event("AR", Some(t0()), Some("FACILITY A"), "MEMPHIS"),
        event("DP", Some(t0() + Duration::hours(4)), Some("FACILITY A"), "MEMPHIS"),
        event("AR", Some(t0() + Duration::hours(9)), Some("FACILITY B"), "DALLAS"),
    ]));

    assert_eq!(row.num_facilities_visited, 2);
    assert_eq!(row.inter_facility_transit_hours, Some(9.0));
}

#[test]
fn facility_marker_is_case_sensitive() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&shipment(vec![
        event("IT", Some(t0()), Some("Regional facility"), "MEMPHIS"),
        event("IT", Some(t0() + Duration::hours(1)), Some("REGIONAL FACILITY"), "MEMPHIS"),
    ]));

    assert_eq!(row.num_facilities_visited, 1);
    assert_eq!(row.inter_facility_transit_hours, None);
}

#[test]
fn untimed_facility_scans_do_not_poison_the_sum() {
    let a = event("IT", Some(t0()), Some("FACILITY A"), "MEMPHIS");
    let b = event("IT", None, Some("FACILITY B"), "LITTLE ROCK");
    let c = event("IT", Some(t0() + Duration::minutes(90)), Some("FACILITY C"), "DALLAS");

    assert_eq!(inter_facility_hours(&[&a, &b, &c]), Some(1.5));
    assert_eq!(inter_facility_hours(&[&a, &b]), Some(0.0));
    assert_eq!(inter_facility_hours(&[&a]), None);
    assert_eq!(inter_facility_hours(&[]), None);
}

#[test]
fn zero_transit_average_follows_policy() {
    let events = vec![
        event("PU", Some(t0()), None, "MEMPHIS"),
        event("IT", Some(t0()), Some("FACILITY A"), "MEMPHIS"),
        event("DL", Some(t0()), None, "MEMPHIS"),
    ];

    let historical = ReportConfig::default();
    let row = MetricsExtractor::new(&historical).extract(&shipment(events.clone()));
    assert_eq!(row.total_transit_hours, Some(0.0));
    assert_eq!(row.avg_hours_per_facility, None);

    let corrected = ReportConfig {
        zero_transit: ZeroTransitPolicy::Zero,
        ..ReportConfig::default()
    };
    let row = MetricsExtractor::new(&corrected).extract(&shipment(events));
    assert_eq!(row.avg_hours_per_facility, Some(0.0));
}

#[test]
fn average_needs_facility_events() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&shipment(vec![
        event("PU", Some(t0()), None, "MEMPHIS"),
        event("DL", Some(t0() + Duration::hours(8)), None, "AUSTIN"),
    ]));

    assert_eq!(row.total_transit_hours, Some(8.0));
    assert_eq!(row.avg_hours_per_facility, None);
    assert_eq!(row.num_facilities_visited, 0);
}

#[test]
fn delivery_attempts_drive_first_attempt_flag() {
    let config = ReportConfig::default();
    let extractor = MetricsExtractor::new(&config);

    let once = extractor.extract(&shipment(vec![
        event("OD", Some(t0()), Some("VEHICLE"), "AUSTIN"),
        event("DL", Some(t0() + Duration::hours(2)), None, "AUSTIN"),
    ]));
    assert_eq!(once.num_out_for_delivery_attempts, 1);
    assert!(once.first_attempt_delivery);

    let twice = extractor.extract(&shipment(vec![
        event("OD", Some(t0()), Some("VEHICLE"), "AUSTIN"),
        event("OD", Some(t0() + Duration::days(1)), Some("VEHICLE"), "AUSTIN"),
    ]));
    assert_eq!(twice.num_out_for_delivery_attempts, 2);
    assert!(!twice.first_attempt_delivery);
}

#[test]
fn express_classification() {
    let keywords = ReportConfig::default().express_keywords;

    assert!(is_express_service(Some("ups_EXPRESS_saver"), &keywords));
    assert!(is_express_service(Some("PRIORITY_OVERNIGHT"), &keywords));
    assert!(is_express_service(Some("usps priority mail"), &keywords));
    assert!(!is_express_service(None, &keywords));
    assert!(!is_express_service(Some(""), &keywords));
    assert!(!is_express_service(Some("GROUND"), &keywords));
}

#[test]
fn empty_shipment_yields_unknowns_and_zero_counts() {
    let config = ReportConfig::default();
    let row = MetricsExtractor::new(&config).extract(&Shipment::default());

    assert_eq!(row.tracking_number, None);
    assert_eq!(row.pickup_datetime, None);
    assert_eq!(row.delivery_datetime, None);
    assert_eq!(row.total_transit_hours, None);
    assert_eq!(row.inter_facility_transit_hours, None);
    assert_eq!(row.avg_hours_per_facility, None);
    assert_eq!(row.total_events_count, 0);
    assert!(!row.is_express_service);
    assert!(!row.first_attempt_delivery);
}
