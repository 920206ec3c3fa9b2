use std::collections::HashMap;

use chronolane_protocol::{Attachment, SharedStr};
use serde::Serialize;

/// Lane index per attachment id, produced fresh by [`pack_attachments`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneAssignment {
    pub lane_of: HashMap<SharedStr, usize>,
    pub lane_count: usize,
}

impl LaneAssignment {
    pub fn lane(&self, id: &str) -> Option<usize> {
        self.lane_of.get(id).copied()
    }
}

/// Swimlane packing: place each attachment in the lowest lane that is free
/// by the time it starts.
///
/// Attachments are visited by start time; equal starts keep input order so
/// the same input always yields the same lanes. A lane is free when its
/// last span ends at or before the new start (touching spans share a lane).
/// The lane count equals the peak number of simultaneously open spans.
///
/// If two attachments share an id, the later one's lane wins in the map.
pub fn pack_attachments(attachments: &[Attachment]) -> LaneAssignment {
    let mut order: Vec<usize> = (0..attachments.len()).collect();
    // `sort_by_key` is stable, so ties on start keep input order.
    order.sort_by_key(|&i| attachments[i].start);

    let mut lane_ends: Vec<i64> = Vec::new();
    let mut lane_of = HashMap::with_capacity(attachments.len());

    for i in order {
        let att = &attachments[i];
        let lane = match lane_ends.iter().position(|&end| end <= att.start) {
            Some(lane) => {
                lane_ends[lane] = att.end;
                lane
            }
            None => {
                lane_ends.push(att.end);
                lane_ends.len() - 1
            }
        };
        lane_of.insert(att.id.clone(), lane);
    }

    tracing::debug!(
        attachments = attachments.len(),
        lanes = lane_ends.len(),
        "packed attachments into lanes"
    );

    LaneAssignment {
        lane_of,
        lane_count: lane_ends.len(),
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
    fn empty_input_has_no_lanes() {
        let packed = pack_attachments(&[]);
        assert_eq!(packed.lane_count, 0);
        assert!(packed.lane_of.is_empty());
    }

    #[test]
    fn touching_spans_share_a_lane() {
        let packed = pack_attachments(&[att("a", 0, 10), att("b", 10, 20)]);
        assert_eq!(packed.lane_count, 1);
        assert_eq!(packed.lane("a"), Some(0));
        assert_eq!(packed.lane("b"), Some(0));
    }

    #[test]
    fn mixed_example() {
        let packed = pack_attachments(&[
            att("a", 0, 10),
            att("b", 0, 5),
            att("c", 5, 10),
            att("d", 10, 15),
        ]);
        assert_eq!(packed.lane_count, 2);
        assert_eq!(packed.lane("a"), Some(0));
        assert_eq!(packed.lane("b"), Some(1));
        assert_eq!(packed.lane("c"), Some(1));
        assert_eq!(packed.lane("d"), Some(0));
    }

    #[test]
    fn nested_chain_needs_one_lane_each() {
        let nested: Vec<_> = (0..5)
            .map(|i| att(&format!("n{i}"), i, 100 - i))
            .collect();
        let packed = pack_attachments(&nested);
        assert_eq!(packed.lane_count, 5);
        for i in 0..5 {
            assert_eq!(packed.lane(&format!("n{i}")), Some(i as usize));
        }
    }

    #[test]
    fn equal_starts_follow_input_order() {
        let packed = pack_attachments(&[att("z", 0, 4), att("y", 0, 4), att("x", 0, 4)]);
        assert_eq!(packed.lane("z"), Some(0));
        assert_eq!(packed.lane("y"), Some(1));
        assert_eq!(packed.lane("x"), Some(2));
    }

    #[test]
    fn unsorted_input_is_sorted_by_start() {
        let packed = pack_attachments(&[att("late", 20, 30), att("early", 0, 25)]);
        assert_eq!(packed.lane("early"), Some(0));
        assert_eq!(packed.lane("late"), Some(1));
    }
}
