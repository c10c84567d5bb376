//! Motion and admission tests for the intersection

use traffic_sched::simulation::{
    LaneId, LaneModel, SimIntersection, VehiclePhase, ENTRY_THRESHOLD, EXIT_THRESHOLD,
    MIN_SPACING, SAFE_MARGIN,
};

fn occupied_lanes(model: &LaneModel) -> usize {
    model.lanes().iter().filter(|lane| lane.occupied()).count()
}

#[test]
fn test_red_lane_creeps_up_to_safe_margin() {
    let mut model = LaneModel::new();
    model.ingest(1, 1, 0).unwrap();
    let mut intersection = SimIntersection::new();

    for _ in 0..20 {
        let outcome = intersection.step(model.lanes_mut(), Some(LaneId::NORTH));
        assert!(outcome.intersection_clear);
    }

    let vehicle = &model.lane(LaneId::EAST).vehicles()[0];
    assert_eq!(vehicle.position.into_inner(), 36.0);
    assert!(vehicle.position.into_inner() <= ENTRY_THRESHOLD - SAFE_MARGIN);
    assert_eq!(vehicle.phase(), VehiclePhase::Approaching);
}

#[test]
fn test_no_green_lane_means_no_admission() {
    let mut model = LaneModel::new();
    for lane in 0..4 {
        model.ingest(lane, 3, 1).unwrap();
    }
    let mut intersection = SimIntersection::new();

    for _ in 0..50 {
        let outcome = intersection.step(model.lanes_mut(), None);
        assert!(outcome.intersection_clear);
        assert_eq!(outcome.admitted, None);
    }
    assert_eq!(occupied_lanes(&model), 0);
}

#[test]
fn test_green_lane_is_admitted_when_clear() {
    let mut model = LaneModel::new();
    model.ingest(0, 1, 0).unwrap();
    let mut intersection = SimIntersection::new();

    for _ in 0..4 {
        let outcome = intersection.step(model.lanes_mut(), Some(LaneId::NORTH));
        assert_eq!(outcome.admitted, None);
    }
    let outcome = intersection.step(model.lanes_mut(), Some(LaneId::NORTH));

    assert!(outcome.admitted.is_some());
    assert!(!outcome.intersection_clear);
    assert!(model.lane(LaneId::NORTH).occupied());
    assert_eq!(intersection.occupied_by(), Some(LaneId::NORTH));
    assert_eq!(intersection.total_admissions, 1);
}

#[test]
fn test_admission_waits_for_other_lane_to_clear() {
    let mut model = LaneModel::new();
    model.ingest(0, 1, 0).unwrap();
    model.ingest(1, 1, 0).unwrap();
    let mut intersection = SimIntersection::new();

    for _ in 0..5 {
        intersection.step(model.lanes_mut(), Some(LaneId::NORTH));
    }
    assert!(model.lane(LaneId::NORTH).occupied());

    // Switch the green to East while North is still crossing
    let mut east_admitted_at = None;
    for step in 6..40 {
        intersection.step(model.lanes_mut(), Some(LaneId::EAST));
        assert!(occupied_lanes(&model) <= 1);
        if model.lane(LaneId::EAST).occupied() {
            east_admitted_at = Some(step);
            break;
        }
    }

    assert_eq!(east_admitted_at, Some(17));
    assert!(!model.lane(LaneId::NORTH).occupied());
}

#[test]
fn test_crossing_continues_without_green() {
    let mut model = LaneModel::new();
    model.ingest(2, 1, 0).unwrap();
    let mut intersection = SimIntersection::new();

    while !model.lane(LaneId::SOUTH).occupied() {
        intersection.step(model.lanes_mut(), Some(LaneId::SOUTH));
    }

    let mut last = model.lane(LaneId::SOUTH).vehicles()[0].position.into_inner();
    while last <= EXIT_THRESHOLD {
        intersection.step(model.lanes_mut(), None);
        let position = model.lane(LaneId::SOUTH).vehicles()[0].position.into_inner();
        assert!(position > last);
        last = position;
    }
    assert!(intersection.is_clear());
}

#[test]
fn test_vehicles_keep_minimum_spacing() {
    let mut model = LaneModel::new();
    // The emergency vehicle behind is faster and catches up
    model.ingest(0, 1, 1).unwrap();
    let mut intersection = SimIntersection::new();

    for _ in 0..80 {
        intersection.step(model.lanes_mut(), Some(LaneId::NORTH));
        let vehicles = model.lane(LaneId::NORTH).vehicles();
        for pair in vehicles.windows(2) {
            let gap = pair[0].position.into_inner() - pair[1].position.into_inner();
            assert!(gap >= MIN_SPACING, "gap {} below minimum", gap);
        }
    }
}

#[test]
fn test_vehicle_is_retired_after_leaving_the_road() {
    let mut model = LaneModel::new();
    model.ingest(0, 1, 0).unwrap();
    let mut intersection = SimIntersection::new();

    let mut retired_at = None;
    for step in 1..60 {
        let outcome = intersection.step(model.lanes_mut(), Some(LaneId::NORTH));
        if outcome.retired > 0 {
            retired_at = Some(step);
            break;
        }
    }

    assert_eq!(retired_at, Some(36));
    assert!(model.lane(LaneId::NORTH).vehicles().is_empty());
    assert_eq!(model.lane(LaneId::NORTH).vehicles_passed, 1);
}

#[test]
fn test_reset_frees_the_intersection() {
    let mut model = LaneModel::new();
    model.ingest(3, 1, 0).unwrap();
    let mut intersection = SimIntersection::new();
    for _ in 0..5 {
        intersection.step(model.lanes_mut(), Some(LaneId::WEST));
    }
    assert!(!intersection.is_clear());

    intersection.reset();
    assert!(intersection.is_clear());
    assert_eq!(intersection.occupied_by(), None);
    assert_eq!(intersection.total_admissions, 0);
}
