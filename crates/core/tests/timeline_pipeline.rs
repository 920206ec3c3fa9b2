//! End-to-end: zoom state drives layout, layout drives routing, and the
//! validator plus critical path guard the dependency set.

use std::collections::HashMap;

use chronolane_core::{
    CriticalPathError, EngineConfig, MS_PER_DAY, Rejection, TimeWindow, TimeZoom, TimelineLayout,
    WheelInput, critical_path, validate_dependency, validate_dependency_against,
};
use chronolane_protocol::{Attachment, Dependency, SharedStr};

fn day(n: f64) -> i64 {
    (n * MS_PER_DAY) as i64
}

fn att(id: &str, start_day: f64, end_day: f64) -> Attachment {
    Attachment {
        id: id.into(),
        timeline_id: "club-2026".into(),
        project_id: format!("project-{id}").into(),
        start: day(start_day),
        end: day(end_day),
    }
}

fn plan() -> Vec<Attachment> {
    vec![
        att("design", 0.0, 5.0),
        att("backend", 5.0, 9.0),
        att("frontend", 2.0, 8.0),
        att("integration", 8.0, 14.0),
        att("launch", 14.0, 20.0),
    ]
}

fn by_id(atts: &[Attachment]) -> HashMap<SharedStr, Attachment> {
    atts.iter().map(|a| (a.id.clone(), a.clone())).collect()
}

#[test]
fn accepted_edges_feed_the_critical_path() {
    let atts = plan();
    let index = by_id(&atts);
    let proposed = [
        Dependency::new("d1", "design", "backend"),
        Dependency::new("d2", "design", "frontend"),
        Dependency::new("d3", "frontend", "integration"),
        Dependency::new("d4", "backend", "integration"),
        Dependency::new("d5", "integration", "launch"),
        Dependency::new("bad", "launch", "design"),
    ];

    let mut accepted: Vec<Dependency> = Vec::new();
    let mut rejected = Vec::new();
    for dep in &proposed {
        match validate_dependency_against(dep, &index, &accepted) {
            Ok(()) => accepted.push(dep.clone()),
            Err(reason) => rejected.push((dep.id.clone(), reason)),
        }
    }
    assert_eq!(rejected, vec![(SharedStr::from("bad"), Rejection::TemporalOrder)]);

    let path = critical_path(&atts, &accepted).unwrap_or_default();
    assert_eq!(path.ids, vec!["design", "frontend", "integration", "launch"]);
    assert_eq!(path.total_duration, day(5.0) + day(6.0) + day(6.0) + day(6.0));
}

#[test]
fn critical_path_still_catches_cycles_the_single_edge_check_misses() {
    let atts = plan();
    let index = by_id(&atts);
    let edges = [
        Dependency::new("d1", "design", "backend"),
        Dependency::new("d2", "backend", "design")
            .with_kind(chronolane_protocol::DependencyType::StartToStart),
    ];
    for dep in &edges {
        assert_eq!(validate_dependency(dep, &index), Ok(()));
    }
    let result = critical_path(&atts, &edges);
    assert!(matches!(result, Err(CriticalPathError::Cycle { total: 5, .. })));
}

#[test]
fn zoomed_layout_routes_every_dependency() {
    let config = EngineConfig::default();
    let atts = plan();
    let mut zoom = TimeZoom::new(
        TimeWindow::new(0.0, 20.0 * MS_PER_DAY),
        1000.0,
        config.zoom.clone(),
    );
    zoom.on_wheel(WheelInput {
        delta_y: -120.0,
        cursor_x: 300.0,
        ctrl_key: true,
        ..WheelInput::default()
    });

    let layout = TimelineLayout::compute(&atts, &config.layout, |t| zoom.to_x(t));
    assert_eq!(layout.lane_count(), 2);

    let design = layout.rect_of("design").expect("design has no box");
    assert!((design.x - zoom.to_x(0.0)).abs() < 1e-9);

    let deps = [
        Dependency::new("d1", "design", "backend"),
        Dependency::new("d3", "frontend", "integration"),
        Dependency::new("d5", "integration", "launch"),
    ];
    let first = layout.route_dependencies(&deps, &config.routing);
    let second = layout.route_dependencies(&deps, &config.routing);
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    for edge in &first {
        assert!(edge.path.starts_with('M'), "{}", edge.path);
    }
}
