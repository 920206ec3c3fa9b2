//! Pixel layout of a timeline: lane-packed boxes plus routed connectors.

use std::collections::HashMap;

use chronolane_protocol::{Attachment, Dependency, Rect, SharedStr};
use serde::{Deserialize, Serialize};

use crate::routing::{RouteOptions, ShelfAllocator, route_edge};
use crate::schedule::{LaneAssignment, pack_attachments};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub row_height: f64,
    pub row_gap: f64,
    /// Y of the first lane's top edge.
    pub top: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 28.0,
            row_gap: 8.0,
            top: 0.0,
        }
    }
}

/// One connector ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedEdge {
    pub id: SharedStr,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayout {
    lanes: LaneAssignment,
    rects: HashMap<SharedStr, Rect>,
    height: f64,
}

impl TimelineLayout {
    /// Pack `attachments` into lanes and place one box per attachment.
    ///
    /// `scale_x` maps a millisecond timestamp to a pixel x, normally
    /// [`TimeZoom::to_x`](crate::view::TimeZoom::to_x).
    pub fn compute(
        attachments: &[Attachment],
        config: &LayoutConfig,
        scale_x: impl Fn(f64) -> f64,
    ) -> Self {
        let lanes = pack_attachments(attachments);
        let pitch = config.row_height + config.row_gap;

        let rects = attachments
            .iter()
            .filter_map(|att| {
                let lane = lanes.lane(&att.id)?;
                let x1 = scale_x(att.start as f64);
                let x2 = scale_x(att.end as f64);
                let y = config.top + lane as f64 * pitch;
                Some((att.id.clone(), Rect::new(x1, y, x2 - x1, config.row_height)))
            })
            .collect();

        let height = if lanes.lane_count == 0 {
            0.0
        } else {
            lanes.lane_count as f64 * pitch - config.row_gap
        };

        Self {
            lanes,
            rects,
            height,
        }
    }

    pub fn rect_of(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).copied()
    }

    pub fn lane_of(&self, id: &str) -> Option<usize> {
        self.lanes.lane(id)
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.lane_count
    }

    pub fn lanes(&self) -> &LaneAssignment {
        &self.lanes
    }

    /// Total height of all lanes, without a trailing gap.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Route every dependency whose endpoints both have boxes, in input
    /// order. One allocator serves the whole pass so parallel connectors
    /// spread across shelves; boxes other than the two endpoints are
    /// obstacles. Obstacles are visited in attachment-id order so the
    /// output does not depend on hash order.
    pub fn route_dependencies(
        &self,
        dependencies: &[Dependency],
        options: &RouteOptions,
    ) -> Vec<RoutedEdge> {
        let mut ordered: Vec<(&SharedStr, &Rect)> = self.rects.iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(b.0));

        let mut allocator = options.allocator();
        let mut routed = Vec::with_capacity(dependencies.len());

        for dep in dependencies {
            let (Some(from), Some(to)) = (
                self.rect_of(&dep.from_attachment_id),
                self.rect_of(&dep.to_attachment_id),
            ) else {
                tracing::warn!(id = %dep.id, "dependency endpoint has no box, skipping");
                continue;
            };

            let obstacles: Vec<Rect> = ordered
                .iter()
                .filter(|(id, _)| **id != dep.from_attachment_id && **id != dep.to_attachment_id)
                .map(|(_, rect)| **rect)
                .collect();

            let path = route_edge(
                from,
                to,
                options,
                &obstacles,
                Some(&mut allocator as &mut dyn ShelfAllocator),
            );
            routed.push(RoutedEdge {
                id: dep.id.clone(),
                path,
            });
        }

        tracing::debug!(routed = routed.len(), total = dependencies.len(), "routed dependencies");
        routed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn att(id: &str, start: i64, end: i64) -> Attachment {
        Attachment {
            id: id.into(),
            timeline_id: "t".into(),
            project_id: "p".into(),
            start,
            end,
        }
    }

    #[test]
    fn rects_follow_lanes_and_scale() {
        let atts = [att("a", 0, 10), att("b", 5, 20)];
        let config = LayoutConfig {
            row_height: 20.0,
            row_gap: 4.0,
            top: 10.0,
        };
        let layout = TimelineLayout::compute(&atts, &config, |t| t * 2.0);
        assert_eq!(layout.rect_of("a"), Some(Rect::new(0.0, 10.0, 20.0, 20.0)));
        assert_eq!(layout.rect_of("b"), Some(Rect::new(10.0, 34.0, 30.0, 20.0)));
        assert_eq!(layout.lane_count(), 2);
        assert_eq!(layout.height(), 44.0);
        assert_eq!(layout.rect_of("missing"), None);
    }

    #[test]
    fn empty_layout_has_no_height() {
        let layout = TimelineLayout::compute(&[], &LayoutConfig::default(), |t| t);
        assert_eq!(layout.height(), 0.0);
        assert_eq!(layout.lane_count(), 0);
    }

    #[test]
    fn unknown_endpoints_are_skipped() {
        let atts = [att("a", 0, 10), att("b", 50, 60)];
        let layout = TimelineLayout::compute(&atts, &LayoutConfig::default(), |t| t * 4.0);
        let deps = [
            Dependency::new("ok", "a", "b"),
            Dependency::new("dangling", "a", "ghost"),
        ];
        let routed = layout.route_dependencies(&deps, &RouteOptions::default());
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].id, "ok");
        // Same lane, nothing in between.
        assert_eq!(routed[0].path, "M 40 14 L 200 14");
    }
}
