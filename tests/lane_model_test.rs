//! Lane model validation tests

use traffic_sched::simulation::{
    LaneId, LaneModel, SimWorld, TrafficError, VehicleCategory, LANE_CAPACITY, SPAWN_FRONT,
    VEHICLE_GAP,
};

#[test]
fn test_ingest_truncates_to_capacity() {
    let mut model = LaneModel::new();
    let outcome = model.ingest(0, 70, 0).unwrap();

    assert!(outcome.truncated);
    assert_eq!(outcome.regular_admitted, LANE_CAPACITY);
    assert_eq!(model.lane(LaneId::NORTH).vehicles().len(), 50);
    assert_eq!(model.lane(LaneId::NORTH).regular_count(), 50);
}

#[test]
fn test_ingest_caps_each_category_separately() {
    let mut model = LaneModel::new();
    model.ingest(3, 60, 55).unwrap();

    let lane = model.lane(LaneId::WEST);
    assert_eq!(lane.regular_count(), LANE_CAPACITY);
    assert_eq!(lane.emergency_count(), LANE_CAPACITY);
    assert_eq!(lane.vehicles().len(), 2 * LANE_CAPACITY);
}

#[test]
fn test_ingest_orders_regular_before_emergency_with_fixed_gap() {
    let mut model = LaneModel::new();
    model.ingest(1, 2, 2).unwrap();

    let vehicles = model.lane(LaneId::EAST).vehicles();
    let categories: Vec<VehicleCategory> = vehicles.iter().map(|v| v.category).collect();
    assert_eq!(
        categories,
        vec![
            VehicleCategory::Regular,
            VehicleCategory::Regular,
            VehicleCategory::Emergency,
            VehicleCategory::Emergency,
        ]
    );

    assert_eq!(vehicles[0].position.into_inner(), SPAWN_FRONT);
    for pair in vehicles.windows(2) {
        let gap = pair[0].position.into_inner() - pair[1].position.into_inner();
        assert!((gap - VEHICLE_GAP).abs() < f32::EPSILON);
    }
    assert!(vehicles[2].speed > vehicles[0].speed);
}

#[test]
fn test_ingest_rejects_invalid_lane_without_mutation() {
    let mut model = LaneModel::new();
    model.ingest(2, 3, 0).unwrap();

    assert_eq!(model.ingest(4, 10, 1), Err(TrafficError::InvalidLane(4)));
    assert_eq!(model.lane(LaneId::SOUTH).total_count(), 3);
    assert!(model.lanes().iter().all(|lane| lane.id == LaneId::SOUTH || lane.total_count() == 0));
}

#[test]
fn test_negative_counts_clamp_to_zero() {
    let mut model = LaneModel::new();
    let outcome = model.ingest(0, -5, -1).unwrap();

    assert!(outcome.clamped_negative);
    assert!(!outcome.truncated);
    assert_eq!(model.lane(LaneId::NORTH).total_count(), 0);
}

#[test]
fn test_ingest_replaces_waiting_queue() {
    let mut model = LaneModel::new();
    model.ingest(0, 8, 1).unwrap();
    model.ingest(0, 2, 0).unwrap();

    let lane = model.lane(LaneId::NORTH);
    assert_eq!(lane.regular_count(), 2);
    assert_eq!(lane.emergency_count(), 0);
}

#[test]
fn test_ingest_keeps_vehicle_that_is_crossing() {
    let mut world = SimWorld::new();
    world.ingest(0, 1, 0).unwrap();
    for _ in 0..5 {
        world.step();
    }
    assert!(world.lane(LaneId::NORTH).occupied());

    world.ingest(0, 3, 0).unwrap();

    let lane = world.lane(LaneId::NORTH);
    assert!(lane.occupied());
    assert_eq!(lane.vehicles().len(), 4);
    assert_eq!(lane.regular_count(), 4);
}

#[test]
fn test_crossing_vehicle_counts_against_capacity() {
    let mut world = SimWorld::new();
    world.ingest(0, 1, 0).unwrap();
    for _ in 0..5 {
        world.step();
    }
    assert!(world.lane(LaneId::NORTH).occupied());

    world.ingest(0, 70, 2).unwrap();

    let lane = world.lane(LaneId::NORTH);
    assert!(lane.occupied());
    assert_eq!(lane.regular_count(), LANE_CAPACITY);
    assert_eq!(lane.emergency_count(), 2);
    assert_eq!(lane.vehicles().len(), LANE_CAPACITY + 2);
}

#[test]
fn test_ingest_reports_replaced_queue() {
    let mut model = LaneModel::new();
    let first = model.ingest(1, 6, 1).unwrap();
    assert_eq!(first.replaced, 0);
    assert_eq!(first.net_added(), 7);

    let second = model.ingest(1, 9, 0).unwrap();
    assert_eq!(second.replaced, 7);
    assert_eq!(second.net_added(), 2);

    let third = model.ingest(1, 3, 0).unwrap();
    assert_eq!(third.replaced, 9);
    assert_eq!(third.net_added(), 0);
}

#[test]
fn test_clear_empties_every_lane() {
    let mut model = LaneModel::new();
    for lane in 0..4 {
        model.ingest(lane, 4, 1).unwrap();
    }
    model.clear();

    assert!(model.lanes().iter().all(|lane| lane.vehicles().is_empty()));
}

#[test]
fn test_lane_id_validation_and_names() {
    assert_eq!(LaneId::new(2).unwrap(), LaneId::SOUTH);
    assert_eq!(LaneId::new(9), Err(TrafficError::InvalidLane(9)));
    assert_eq!(LaneId::from_name("north").unwrap(), LaneId::NORTH);
    assert_eq!(LaneId::from_name(" West ").unwrap(), LaneId::WEST);
    assert!(matches!(
        LaneId::from_name("up"),
        Err(TrafficError::UnknownLaneName(_))
    ));
    assert_eq!(LaneId::WEST.offset(1), LaneId::NORTH);
    assert_eq!(LaneId::EAST.name(), "East");
}
