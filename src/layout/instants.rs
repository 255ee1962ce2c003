//! Instant/row indexing.
//!
//! Every distinct timestamp present in the graph is an instant. Instants are
//! sorted ascending and numbered from 1; row 0 is the header lane and is never
//! given to a node. Timestamps are compared exactly, with no tolerance.

use crate::error::LayoutError;
use crate::graph::TrackGraph;

/// Sorted distinct instants and their row numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstantRows {
    instants: Vec<f64>,
}

impl InstantRows {
    /// Collect the instants of every node in `graph`.
    ///
    /// Fails on the first node (in id order) without a timestamp, or with a
    /// timestamp that is NaN or infinite.
    pub fn collect(graph: &TrackGraph) -> Result<Self, LayoutError> {
        let mut instants = Vec::with_capacity(graph.node_count());
        for node in graph.node_ids() {
            let value = graph
                .timestamp(node)
                .ok_or(LayoutError::MissingAttribute {
                    node,
                    attribute: "timestamp",
                })?;
            if !value.is_finite() {
                return Err(LayoutError::InvalidTimestamp { node, value });
            }
            instants.push(normalize(value));
        }

        instants.sort_by(f64::total_cmp);
        instants.dedup();
        Ok(Self { instants })
    }

    /// Row of an instant, or `None` if the instant is not present.
    pub fn row(&self, instant: f64) -> Option<u32> {
        self.position(instant).map(|i| i as u32 + 1)
    }

    /// Zero-based position of an instant in ascending order.
    pub(crate) fn position(&self, instant: f64) -> Option<usize> {
        self.instants
            .binary_search_by(|probe| probe.total_cmp(&normalize(instant)))
            .ok()
    }

    /// Distinct instants, ascending.
    pub fn instants(&self) -> &[f64] {
        &self.instants
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    /// `(instant, row)` pairs, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (f64, u32)> + '_ {
        self.instants
            .iter()
            .enumerate()
            .map(|(i, &instant)| (instant, i as u32 + 1))
    }
}

/// Fold -0.0 into 0.0 so `total_cmp` agrees with `==`.
fn normalize(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}
