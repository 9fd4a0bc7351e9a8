use chrono::NaiveDate;
use rail_booking::{
    config::SearchConfig,
    ledger::SqliteLedger,
    models::{EntityKey, ItineraryLeg, SearchQuery, SortingCriteria, TrainStatus},
    repository::{tickets, trains},
    RailError, RailSystem,
};
use rail_graph_db::storage::rocksdb_store::RocksDbStorage;
use std::sync::{Arc, Barrier};
use tempfile::TempDir;

const RIDER: &str = "rider@rail.com";

fn setup_test_system() -> (RailSystem, Arc<SqliteLedger>, TempDir) {
    setup_with_search(SearchConfig::default())
}

fn setup_with_search(search: SearchConfig) -> (RailSystem, Arc<SqliteLedger>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(
        RocksDbStorage::new(temp_dir.path(), "test_rail_network").unwrap()
    ) as Arc<dyn rail_graph_db::GraphStorage>;
    let ledger = Arc::new(SqliteLedger::in_memory().unwrap());

    let system = RailSystem::from_stores(storage, ledger.clone(), search);
    (system, ledger, temp_dir)
}

fn key(n: i64) -> EntityKey {
    EntityKey::new(n)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn capacity_of(ledger: &SqliteLedger, train: EntityKey) -> u32 {
    ledger
        .with_connection(|conn| Ok(trains::require(conn, train)?.capacity))
        .unwrap()
}

async fn add_stations(system: &RailSystem, keys: &[i64]) {
    for k in keys {
        system.lifecycle.add_train_station(key(*k), None).await.unwrap();
    }
}

/// Stations 1 to 4 with three routes from 1 to 4:
/// direct (50), via 2 (30 + 30) and via 3 (10 + 10)
async fn build_network(system: &RailSystem) -> (EntityKey, EntityKey, EntityKey) {
    add_stations(system, &[1, 2, 3, 4]).await;
    for (from, to, minutes) in [(1, 2, 30), (2, 4, 30), (1, 3, 10), (3, 4, 10), (1, 4, 50)] {
        system
            .lifecycle
            .connect_train_stations(key(from), key(to), minutes)
            .await
            .unwrap();
    }

    let via_two = system.lifecycle.add_train(None, 10, TrainStatus::Operational).unwrap();
    let via_three = system.lifecycle.add_train(None, 10, TrainStatus::Operational).unwrap();
    let direct = system.lifecycle.add_train(None, 10, TrainStatus::Operational).unwrap();

    system
        .lifecycle
        .add_schedule(
            Some(via_two),
            8,
            0,
            &[(Some(key(1)), 0), (Some(key(2)), 5), (Some(key(4)), 0)],
            date(2024, 1, 1),
            date(2025, 1, 1),
        )
        .await
        .unwrap();
    system
        .lifecycle
        .add_schedule(
            Some(via_three),
            8,
            0,
            &[(Some(key(1)), 0), (Some(key(3)), 0), (Some(key(4)), 0)],
            date(2024, 1, 1),
            date(2025, 1, 1),
        )
        .await
        .unwrap();
    system
        .lifecycle
        .add_schedule(
            Some(direct),
            9,
            30,
            &[(Some(key(1)), 0), (Some(key(4)), 0)],
            date(2025, 1, 1),
            date(2026, 1, 1),
        )
        .await
        .unwrap();

    (via_two, via_three, direct)
}

#[tokio::test]
async fn test_single_route_metrics() {
    let (system, _, _temp_dir) = setup_test_system();
    add_stations(&system, &[1, 2, 3]).await;
    system.lifecycle.connect_train_stations(key(1), key(2), 30).await.unwrap();
    system.lifecycle.connect_train_stations(key(2), key(3), 30).await.unwrap();

    let routes = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(3)))
        .await
        .unwrap();

    assert_eq!(routes.len(), 1);
    let route = &routes[0];
    assert_eq!(route.travel_time, 60);
    assert_eq!(route.changes, 1);
    assert_eq!(route.estimated_price, 30.0);
    assert_eq!(route.waiting_time, None);
    assert_eq!(route.stations, vec![key(1), key(2), key(3)]);
}

async fn build_chain(system: &RailSystem, stations: i64) {
    let keys: Vec<i64> = (1..=stations).collect();
    add_stations(system, &keys).await;
    for pair in keys.windows(2) {
        system
            .lifecycle
            .connect_train_stations(key(pair[0]), key(pair[1]), 10)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_search_finds_long_chain() {
    let (system, _, _temp_dir) = setup_test_system();
    build_chain(&system, 15).await;

    let routes = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(15)))
        .await
        .unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].changes, 13);
    assert_eq!(routes[0].travel_time, 140);
    assert_eq!(routes[0].stations.len(), 15);
}

#[tokio::test]
async fn test_configured_hop_cap_limits_search() {
    let (system, _, _temp_dir) = setup_with_search(SearchConfig {
        max_hops: Some(3),
        ..SearchConfig::default()
    });
    build_chain(&system, 6).await;

    let near = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(4)))
        .await
        .unwrap();
    assert_eq!(near.len(), 1);

    let far = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(6)))
        .await
        .unwrap();
    assert!(far.is_empty());
}

#[tokio::test]
async fn test_search_respects_limit_and_endpoints() {
    let (system, _, _temp_dir) = setup_test_system();
    build_network(&system).await;

    let all = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(4)))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let limited = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(4)).limit(2))
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);

    for route in all.iter().chain(limited.iter()) {
        assert_eq!(route.start_key, key(1));
        assert_eq!(route.end_key, key(4));
        assert_eq!(route.stations.first(), Some(&key(1)));
        assert_eq!(route.stations.last(), Some(&key(4)));
    }
}

#[tokio::test]
async fn test_search_ordering_by_each_criterion() {
    let (system, _, _temp_dir) = setup_test_system();
    build_network(&system).await;

    let criteria = [
        SortingCriteria::OverallTravelTime,
        SortingCriteria::NumberOfChanges,
        SortingCriteria::EstimatedPrice,
    ];

    for criterion in criteria {
        for ascending in [true, false] {
            let query = SearchQuery::new(key(1), key(4)).sorted_by(criterion, ascending);
            let routes = system.route_search.search_connections(&query).await.unwrap();
            assert_eq!(routes.len(), 3);

            let values: Vec<f64> = routes
                .iter()
                .map(|r| match criterion {
                    SortingCriteria::OverallTravelTime => r.travel_time as f64,
                    SortingCriteria::NumberOfChanges => r.changes as f64,
                    SortingCriteria::EstimatedPrice => r.estimated_price,
                    SortingCriteria::OverallWaitingTime => unreachable!(),
                })
                .collect();

            for pair in values.windows(2) {
                if ascending {
                    assert!(pair[0] <= pair[1], "{:?} ascending: {:?}", criterion, values);
                } else {
                    assert!(pair[0] >= pair[1], "{:?} descending: {:?}", criterion, values);
                }
            }
        }
    }
}

#[tokio::test]
async fn test_search_ordering_by_waiting_time() {
    let (system, _, _temp_dir) = setup_test_system();
    build_network(&system).await;

    let ascending = system
        .route_search
        .search_connections(
            &SearchQuery::new(key(1), key(4)).sorted_by(SortingCriteria::OverallWaitingTime, true),
        )
        .await
        .unwrap();
    let waits: Vec<_> = ascending.iter().map(|r| r.waiting_time).collect();
    assert_eq!(waits, vec![Some(0), Some(5), None]);

    let descending = system
        .route_search
        .search_connections(
            &SearchQuery::new(key(1), key(4)).sorted_by(SortingCriteria::OverallWaitingTime, false),
        )
        .await
        .unwrap();
    let waits: Vec<_> = descending.iter().map(|r| r.waiting_time).collect();
    assert_eq!(waits, vec![Some(5), Some(0), None]);
}

#[tokio::test]
async fn test_dated_search_skips_inactive_schedules() {
    let (system, _, _temp_dir) = setup_test_system();
    build_network(&system).await;

    // The direct train only runs in 2025
    let routes = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(4)).on(date(2024, 6, 1)))
        .await
        .unwrap();
    assert_eq!(routes.len(), 2);
    assert!(routes.iter().all(|r| r.changes == 1));

    let routes = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(4)).on(date(2025, 6, 1)))
        .await
        .unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].stations, vec![key(1), key(4)]);

    let routes = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(4)).on(date(2030, 1, 1)))
        .await
        .unwrap();
    assert!(routes.is_empty());
}

#[tokio::test]
async fn test_search_rejects_bad_endpoints() {
    let (system, _, _temp_dir) = setup_test_system();
    add_stations(&system, &[1]).await;

    let same = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(1)))
        .await;
    assert!(matches!(same, Err(RailError::InvalidArgument(_))));

    let missing = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(99)))
        .await;
    assert!(matches!(missing, Err(RailError::NotFound(_))));
}

#[tokio::test]
async fn test_reserved_booking_updates_ledger() {
    let (system, ledger, _temp_dir) = setup_test_system();
    system.users.add_user(RIDER, None).unwrap();
    let train = system.lifecycle.add_train(None, 5, TrainStatus::Operational).unwrap();

    let legs = [
        ItineraryLeg::new(train, key(1), key(2), 30),
        ItineraryLeg::new(train, key(2), key(3), 15),
    ];
    let ticket = system.booking.buy_ticket(RIDER, &legs, true).unwrap();

    assert_eq!(ticket.price, 22.5 + 2.0 * 2.0);
    assert_eq!(capacity_of(&ledger, train), 4);

    let for_train = ledger.with_connection(|conn| tickets::for_train(conn, train)).unwrap();
    assert_eq!(for_train.len(), 1);
    assert_eq!(
        ledger.with_connection(|conn| tickets::history_len(conn, RIDER)).unwrap(),
        1
    );

    let history = system.booking.get_purchase_history(RIDER).unwrap();
    assert_eq!(history[0].ticket_id, ticket.ticket_id);
    assert_eq!(history[0].price, ticket.price);
    assert_eq!(history[0].train_status, TrainStatus::Operational);
}

#[tokio::test]
async fn test_full_train_rejects_reservation() {
    let (system, ledger, _temp_dir) = setup_test_system();
    system.users.add_user(RIDER, None).unwrap();
    let train = system.lifecycle.add_train(None, 0, TrainStatus::Operational).unwrap();

    let result = system
        .booking
        .buy_ticket(RIDER, &[ItineraryLeg::new(train, key(1), key(2), 20)], true);
    assert!(matches!(result, Err(RailError::CapacityExceeded(_))));

    assert!(ledger.with_connection(|conn| tickets::for_train(conn, train)).unwrap().is_empty());
    assert_eq!(ledger.with_connection(|conn| tickets::history_len(conn, RIDER)).unwrap(), 0);
    assert_eq!(capacity_of(&ledger, train), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_never_overbook() {
    let (system, ledger, _temp_dir) = setup_test_system();
    system.users.add_user(RIDER, None).unwrap();
    let train = system.lifecycle.add_train(None, 1, TrainStatus::Operational).unwrap();

    let system = Arc::new(system);
    let buyers = 8;
    let barrier = Arc::new(Barrier::new(buyers));

    let handles: Vec<_> = (0..buyers)
        .map(|_| {
            let (system, barrier) = (system.clone(), barrier.clone());
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                system
                    .booking
                    .buy_ticket(RIDER, &[ItineraryLeg::new(train, key(1), key(2), 20)], true)
            })
        })
        .collect();

    let mut sold = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(e) => assert!(matches!(e, RailError::CapacityExceeded(_)), "{:?}", e),
        }
    }

    assert_eq!(sold, 1);
    assert_eq!(capacity_of(&ledger, train), 0);
    assert_eq!(ledger.with_connection(|conn| tickets::for_train(conn, train)).unwrap().len(), 1);
    assert_eq!(ledger.with_connection(|conn| tickets::history_len(conn, RIDER)).unwrap(), 1);
}

#[tokio::test]
async fn test_booking_requires_known_user_and_trains() {
    let (system, _, _temp_dir) = setup_test_system();
    let train = system.lifecycle.add_train(None, 3, TrainStatus::Operational).unwrap();

    let unknown_user = system
        .booking
        .buy_ticket("ghost@rail.com", &[ItineraryLeg::new(train, key(1), key(2), 20)], false);
    assert!(matches!(unknown_user, Err(RailError::NotFound(_))));

    system.users.add_user(RIDER, None).unwrap();
    let unknown_train = system
        .booking
        .buy_ticket(RIDER, &[ItineraryLeg::new(key(404), key(1), key(2), 20)], false);
    assert!(matches!(unknown_train, Err(RailError::NotFound(_))));

    let empty = system.booking.buy_ticket(RIDER, &[], false);
    assert!(matches!(empty, Err(RailError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_capacity_cannot_decrease() {
    let (system, ledger, _temp_dir) = setup_test_system();
    let train = system.lifecycle.add_train(Some(key(7)), 10, TrainStatus::Operational).unwrap();
    assert_eq!(train, key(7));

    for lower in 0..10 {
        let result = system.lifecycle.update_train_details(train, Some(lower), None);
        assert!(matches!(result, Err(RailError::InvalidArgument(_))), "capacity {}", lower);
    }
    assert_eq!(capacity_of(&ledger, train), 10);

    system.lifecycle.update_train_details(train, Some(10), None).unwrap();
    system.lifecycle.update_train_details(train, Some(15), Some(TrainStatus::Delayed)).unwrap();
    assert_eq!(capacity_of(&ledger, train), 15);
    assert_eq!(
        system.lifecycle.get_train_current_status(train).unwrap(),
        Some(TrainStatus::Delayed)
    );

    let missing = system.lifecycle.update_train_details(key(99), Some(20), None);
    assert!(matches!(missing, Err(RailError::NotFound(_))));
}

#[tokio::test]
async fn test_broken_train_clears_reservations() {
    let (system, ledger, _temp_dir) = setup_test_system();
    system.users.add_user(RIDER, None).unwrap();
    let train = system.lifecycle.add_train(None, 4, TrainStatus::Operational).unwrap();
    let leg = [ItineraryLeg::new(train, key(1), key(2), 10)];

    system.booking.buy_ticket(RIDER, &leg, true).unwrap();
    system.booking.buy_ticket(RIDER, &leg, true).unwrap();
    assert_eq!(capacity_of(&ledger, train), 2);

    system
        .lifecycle
        .update_train_details(train, None, Some(TrainStatus::Broken))
        .unwrap();

    let remaining = ledger.with_connection(|conn| tickets::for_train(conn, train)).unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|t| !t.reserved_seat));
    assert_eq!(capacity_of(&ledger, train), 2);
    assert_eq!(
        system.lifecycle.get_train_current_status(train).unwrap(),
        Some(TrainStatus::Broken)
    );
}

#[tokio::test]
async fn test_delete_train_cascades() {
    let (system, ledger, _temp_dir) = setup_test_system();
    build_network(&system).await;
    system.users.add_user(RIDER, None).unwrap();

    let train = system.lifecycle.add_train(None, 3, TrainStatus::Operational).unwrap();
    system
        .lifecycle
        .add_schedule(
            Some(train),
            6,
            15,
            &[(Some(key(1)), 0), (Some(key(3)), 2)],
            date(2024, 1, 1),
            date(2024, 12, 31),
        )
        .await
        .unwrap();
    system
        .booking
        .buy_ticket(RIDER, &[ItineraryLeg::new(train, key(1), key(3), 10)], true)
        .unwrap();

    let before = system.audit.get_all_schedules().await.unwrap().len();
    system.lifecycle.delete_train(train).await.unwrap();

    assert_eq!(system.lifecycle.get_train_current_status(train).unwrap(), None);
    assert!(ledger.with_connection(|conn| tickets::for_train(conn, train)).unwrap().is_empty());
    assert!(system.booking.get_purchase_history(RIDER).unwrap().is_empty());

    let schedules = system.audit.get_all_schedules().await.unwrap();
    assert_eq!(schedules.len(), before - 1);
    assert!(schedules.iter().all(|s| s.train_id != train));
    assert!(system.audit.audit().await.unwrap().is_clean());

    // Unknown keys are a no-op
    system.lifecycle.delete_train(key(12345)).await.unwrap();
}

#[tokio::test]
async fn test_purchase_history_most_recent_first() {
    let (system, _, _temp_dir) = setup_test_system();
    assert!(system.booking.get_purchase_history("nobody@rail.com").unwrap().is_empty());

    system.users.add_user(RIDER, None).unwrap();
    let train = system.lifecycle.add_train(None, 10, TrainStatus::Operational).unwrap();

    let mut bought = Vec::new();
    for minutes in [10, 20, 30, 40] {
        let ticket = system
            .booking
            .buy_ticket(RIDER, &[ItineraryLeg::new(train, key(1), key(2), minutes)], false)
            .unwrap();
        bought.push(ticket.ticket_id);
    }

    let history = system.booking.get_purchase_history(RIDER).unwrap();
    assert_eq!(history.len(), 4);

    let ids: Vec<_> = history.iter().map(|r| r.ticket_id).collect();
    bought.reverse();
    assert_eq!(ids, bought);
    for pair in history.windows(2) {
        assert!(pair[0].purchase_date >= pair[1].purchase_date);
    }
}

#[tokio::test]
async fn test_schedule_requires_connected_stops() {
    let (system, _, _temp_dir) = setup_test_system();
    add_stations(&system, &[1, 2, 3]).await;
    system.lifecycle.connect_train_stations(key(1), key(2), 15).await.unwrap();
    let train = system.lifecycle.add_train(None, 5, TrainStatus::Operational).unwrap();

    let result = system
        .lifecycle
        .add_schedule(
            Some(train),
            7,
            0,
            &[(Some(key(1)), 0), (Some(key(2)), 3), (Some(key(3)), 0)],
            date(2024, 1, 1),
            date(2024, 2, 1),
        )
        .await;
    assert!(matches!(result, Err(RailError::InvalidArgument(_))));

    // Direction matters
    let reversed = system
        .lifecycle
        .add_schedule(
            Some(train),
            7,
            0,
            &[(Some(key(2)), 0), (Some(key(1)), 0)],
            date(2024, 1, 1),
            date(2024, 2, 1),
        )
        .await;
    assert!(matches!(reversed, Err(RailError::InvalidArgument(_))));
    assert!(system.audit.get_all_schedules().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_schedule_argument_validation() {
    let (system, _, _temp_dir) = setup_test_system();
    add_stations(&system, &[1, 2]).await;
    system.lifecycle.connect_train_stations(key(1), key(2), 15).await.unwrap();
    let train = system.lifecycle.add_train(None, 5, TrainStatus::Operational).unwrap();

    let stops = [(Some(key(1)), 0), (Some(key(2)), 0)];
    let (from, until) = (date(2024, 1, 1), date(2024, 2, 1));

    let cases = [
        system.lifecycle.add_schedule(None, 7, 0, &stops, from, until).await,
        system
            .lifecycle
            .add_schedule(Some(train), 7, 0, &[(Some(key(1)), 0), (None, 0)], from, until)
            .await,
        system
            .lifecycle
            .add_schedule(Some(train), 7, 0, &[(Some(key(1)), 0)], from, until)
            .await,
        system.lifecycle.add_schedule(Some(train), 24, 0, &stops, from, until).await,
        system.lifecycle.add_schedule(Some(train), 7, 60, &stops, from, until).await,
        system.lifecycle.add_schedule(Some(train), 7, 0, &stops, until, from).await,
        system.lifecycle.add_schedule(Some(train), 7, 0, &stops, from, from).await,
    ];
    for result in cases {
        assert!(matches!(result, Err(RailError::InvalidArgument(_))));
    }

    let missing_train = system
        .lifecycle
        .add_schedule(Some(key(404)), 7, 0, &stops, from, until)
        .await;
    assert!(matches!(missing_train, Err(RailError::NotFound(_))));

    let missing_station = system
        .lifecycle
        .add_schedule(Some(train), 7, 0, &[(Some(key(1)), 0), (Some(key(9)), 0)], from, until)
        .await;
    assert!(matches!(missing_station, Err(RailError::NotFound(_))));

    let schedule = system
        .lifecycle
        .add_schedule(Some(train), 23, 59, &stops, from, until)
        .await
        .unwrap();
    assert_eq!(schedule.stops.len(), 2);
    assert_eq!(system.audit.get_all_schedules().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_connection_validation() {
    let (system, _, _temp_dir) = setup_test_system();
    add_stations(&system, &[1, 2]).await;

    let to_itself = system.lifecycle.connect_train_stations(key(1), key(1), 10).await;
    assert!(matches!(to_itself, Err(RailError::InvalidArgument(_))));

    for minutes in [0, 61] {
        let result = system.lifecycle.connect_train_stations(key(1), key(2), minutes).await;
        assert!(matches!(result, Err(RailError::InvalidArgument(_))), "{} minutes", minutes);
    }

    let missing = system.lifecycle.connect_train_stations(key(1), key(3), 10).await;
    assert!(matches!(missing, Err(RailError::NotFound(_))));

    let edge = system.lifecycle.connect_train_stations(key(1), key(2), 60).await.unwrap();
    assert_eq!(edge.price, 30.0);
}

#[tokio::test]
async fn test_duplicates_are_rejected() {
    let (system, _, _temp_dir) = setup_test_system();
    add_stations(&system, &[1, 2]).await;

    let station = system.lifecycle.add_train_station(key(1), Some("again".into())).await;
    assert!(matches!(station, Err(RailError::AlreadyExists(_))));

    system.lifecycle.connect_train_stations(key(1), key(2), 10).await.unwrap();
    let edge = system.lifecycle.connect_train_stations(key(1), key(2), 20).await;
    assert!(matches!(edge, Err(RailError::AlreadyExists(_))));
    system.lifecycle.connect_train_stations(key(2), key(1), 20).await.unwrap();

    system.lifecycle.add_train(Some(key(5)), 1, TrainStatus::Operational).unwrap();
    let train = system.lifecycle.add_train(Some(key(5)), 1, TrainStatus::Operational);
    assert!(matches!(train, Err(RailError::AlreadyExists(_))));

    system.users.add_user(RIDER, None).unwrap();
    let user = system.users.add_user(RIDER, Some("twice".into()));
    assert!(matches!(user, Err(RailError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_delete_user_restores_capacity() {
    let (system, ledger, _temp_dir) = setup_test_system();
    system.users.add_user(RIDER, None).unwrap();
    let train = system.lifecycle.add_train(None, 3, TrainStatus::Operational).unwrap();
    let leg = [ItineraryLeg::new(train, key(1), key(2), 10)];

    system.booking.buy_ticket(RIDER, &leg, true).unwrap();
    system.booking.buy_ticket(RIDER, &leg, true).unwrap();
    system.booking.buy_ticket(RIDER, &leg, false).unwrap();
    assert_eq!(capacity_of(&ledger, train), 1);

    system.users.delete_user(RIDER).unwrap();

    assert_eq!(capacity_of(&ledger, train), 3);
    assert!(system.users.get_user(RIDER).unwrap().is_none());
    assert!(ledger.with_connection(|conn| tickets::for_train(conn, train)).unwrap().is_empty());
    assert!(system.booking.get_purchase_history(RIDER).unwrap().is_empty());

    let again = system.users.delete_user(RIDER);
    assert!(matches!(again, Err(RailError::NotFound(_))));
}

#[tokio::test]
async fn test_audit_and_repair_orphaned_schedules() {
    let (system, ledger, _temp_dir) = setup_test_system();
    let (via_two, _, _) = build_network(&system).await;
    assert!(system.audit.audit().await.unwrap().is_clean());

    // Drop the train row behind the graph's back
    ledger.transaction(|tx| trains::delete(tx, via_two)).unwrap();

    let report = system.audit.audit().await.unwrap();
    assert_eq!(report.orphaned_schedules.len(), 1);
    assert_eq!(report.orphaned_schedules[0].train_id, via_two);
    assert_eq!(report.orphaned_train_nodes, vec![via_two]);

    let repaired = system.audit.repair().await.unwrap();
    assert_eq!(repaired.orphaned_schedules.len(), 1);

    assert!(system.audit.audit().await.unwrap().is_clean());
    let schedules = system.audit.get_all_schedules().await.unwrap();
    assert_eq!(schedules.len(), 2);
    assert!(schedules.iter().all(|s| s.train_id != via_two));

    // Stations and connections are untouched
    let routes = system
        .route_search
        .search_connections(&SearchQuery::new(key(1), key(4)))
        .await
        .unwrap();
    assert_eq!(routes.len(), 3);
}
