//! Longest-duration chain through the dependency DAG.

use std::collections::{HashMap, VecDeque};

use chronolane_protocol::{Attachment, Dependency, SharedStr};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriticalPathError {
    /// The accepted edge set is not a DAG. No partial result is produced.
    #[error("dependency graph contains a cycle: only {ordered} of {total} attachments could be ordered")]
    Cycle { ordered: usize, total: usize },
}

/// The duration-maximal chain, source first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    pub ids: Vec<SharedStr>,
    pub total_duration: i64,
}

/// Find the chain of dependent attachments with the largest summed duration.
///
/// Edges whose endpoints are not in `attachments` are ignored; dependency
/// types are not considered. An attachment with no edges is a valid
/// single-node chain. When several chains tie, the one ending at the node
/// first reached in topological order wins; the topological order itself
/// starts from in-degree-zero nodes in input order.
pub fn critical_path(
    attachments: &[Attachment],
    dependencies: &[Dependency],
) -> Result<CriticalPath, CriticalPathError> {
    // First occurrence of an id wins.
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(attachments.len());
    let mut nodes: Vec<&Attachment> = Vec::with_capacity(attachments.len());
    for att in attachments {
        if !index.contains_key(att.id.as_str()) {
            index.insert(att.id.as_str(), nodes.len());
            nodes.push(att);
        }
    }

    let n = nodes.len();
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for dep in dependencies {
        let (Some(&u), Some(&v)) = (
            index.get(dep.from_attachment_id.as_str()),
            index.get(dep.to_attachment_id.as_str()),
        ) else {
            continue;
        };
        successors[u].push(v);
        in_degree[v] += 1;
    }

    let order = topological_order(&successors, in_degree);
    if order.len() < n {
        tracing::warn!(ordered = order.len(), total = n, "cycle in dependency graph");
        return Err(CriticalPathError::Cycle {
            ordered: order.len(),
            total: n,
        });
    }

    let duration = |i: usize| nodes[i].duration();
    let mut best: Vec<i64> = (0..n).map(duration).collect();
    let mut predecessor: Vec<Option<usize>> = vec![None; n];

    for &u in &order {
        for &v in &successors[u] {
            let candidate = best[u].saturating_add(duration(v));
            if candidate > best[v] {
                best[v] = candidate;
                predecessor[v] = Some(u);
            }
        }
    }

    let mut answer: Option<usize> = None;
    for &v in &order {
        if answer.is_none_or(|a| best[v] > best[a]) {
            answer = Some(v);
        }
    }

    let Some(end) = answer else {
        return Ok(CriticalPath::default());
    };

    let mut ids = vec![nodes[end].id.clone()];
    let mut cursor = end;
    while let Some(prev) = predecessor[cursor] {
        ids.push(nodes[prev].id.clone());
        cursor = prev;
    }
    ids.reverse();

    tracing::debug!(length = ids.len(), total_duration = best[end], "critical path computed");

    Ok(CriticalPath {
        ids,
        total_duration: best[end],
    })
}

/// Kahn's algorithm. Returns fewer than `successors.len()` nodes when the
/// graph has a cycle.
fn topological_order(successors: &[Vec<usize>], mut in_degree: Vec<usize>) -> Vec<usize> {
    let mut queue: VecDeque<usize> = (0..successors.len())
        .filter(|&i| in_degree[i] == 0)
        .collect();
    let mut order = Vec::with_capacity(successors.len());

    while let Some(u) = queue.pop_front() {
        order.push(u);
        for &v in &successors[u] {
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    order
}
