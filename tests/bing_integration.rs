//! Live Bing Maps integration.
//!
//! Hits the hosted Distance Matrix API and solves over the result. Skipped
//! unless `BING_MAPS_KEY` is present in the environment.

use std::env;

use vrptw_planner::bing::{BingMapsClient, BingMapsConfig};
use vrptw_planner::kml::waypoints_from_pairs;
use vrptw_planner::model::{RoutingProblem, TimeWindow};
use vrptw_planner::solver::{solve, PlannerOutcome, SolveOptions};
use vrptw_planner::traits::TravelTimeProvider;

#[test]
fn matrix_roundtrip_and_solve() {
    let Ok(key) = env::var("BING_MAPS_KEY") else {
        eprintln!("skipping: BING_MAPS_KEY not set");
        return;
    };

    let client = BingMapsClient::new(BingMapsConfig::new(key)).expect("client should build");
    let waypoints = waypoints_from_pairs(&[
        (36.1699, -115.1398), // downtown Las Vegas
        (36.0395, -114.9817), // Henderson
        (36.2717, -115.2936), // Summerlin
    ]);

    let matrix = client
        .time_matrix(&waypoints)
        .expect("matrix request should succeed");
    assert_eq!(matrix.len(), 3);
    for (i, row) in matrix.iter().enumerate() {
        assert_eq!(row.len(), 3);
        assert_eq!(row[i], 0, "diagonal must be zero");
        assert_eq!(row[0], 0, "return to depot is free by default");
    }

    let callsigns = waypoints
        .iter()
        .map(|waypoint| waypoint.callsign.clone())
        .collect();
    let problem = RoutingProblem::new(
        matrix,
        vec![TimeWindow::new(0, 120), TimeWindow::new(0, 120)],
        callsigns,
    );

    match solve(&problem, SolveOptions::default()).expect("input is valid") {
        PlannerOutcome::Planned(plan) => {
            let route = &plan.routes[0];
            assert_eq!(route.callsigns.first().map(String::as_str), Some("depot"));
            assert_eq!(route.callsigns.last().map(String::as_str), Some("depot"));
        }
        PlannerOutcome::NoSolution => panic!("metro-area targets should be routable"),
    }
}
