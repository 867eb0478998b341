use std::collections::BTreeMap;

use log::{debug, info};

use crate::comm_table::{CommID, CommTable, Community};
use crate::config::{DEFAULT_CAPACITY, DEFAULT_EPOCHS};
use crate::error::{GraphError, Result};
use crate::graph::{VInt, WeightedGraph};
use crate::network::MovieNetwork;

/// Outcome of one detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSummary {
    pub moves_per_epoch: Vec<usize>,
    pub purged: usize,
    pub communities: usize,
    pub modularity: f64,
}

/// Single-phase Louvain with a hard cap on community size.
///
/// Every vertex is visited once per epoch in insertion order and moved to the
/// neighbouring community with the largest strictly positive modularity gain.
/// There is no aggregation phase and no convergence check; the size cap keeps
/// one community from absorbing the graph.
#[derive(Debug, Clone)]
pub struct CommunityDetector {
    epoch_count: usize,
    capacity: usize,
}

impl Default for CommunityDetector {
    fn default() -> Self {
        CommunityDetector {
            epoch_count: DEFAULT_EPOCHS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CommunityDetector {
    pub fn new(epoch_count: usize, capacity: usize) -> Result<CommunityDetector> {
        if epoch_count == 0 {
            return Err(GraphError::InvalidParameter {
                name: "epoch_count",
                message: "must be positive",
            });
        }
        if capacity == 0 {
            return Err(GraphError::InvalidParameter {
                name: "capacity",
                message: "must be positive",
            });
        }
        Ok(CommunityDetector {
            epoch_count,
            capacity,
        })
    }

    pub fn epoch_count(&self) -> usize {
        self.epoch_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run all epochs over the network, then purge the emptied communities.
    /// `finalize_degrees` must have been called beforehand.
    pub fn execute(&self, network: &mut MovieNetwork) -> DetectionSummary {
        let m = network.graph.total_weight();
        let mut moves_per_epoch = Vec::new();

        if m > 0.0 {
            for epoch in 0..self.epoch_count {
                let mut moves = 0usize;
                for vertex in 0..network.graph.v_size() as VInt {
                    if self.move_to_best_community(network, vertex, m) {
                        moves += 1;
                    }
                }
                debug!("Epoch {}: {} vertices moved", epoch, moves);
                moves_per_epoch.push(moves);
            }
        } else {
            info!("Graph has no weighted edges, skip community detection");
        }

        let purged = network.comm_table.purge_empty();
        let summary = DetectionSummary {
            moves_per_epoch,
            purged,
            communities: network.comm_table.community_count(),
            modularity: modularity(network),
        };
        info!(
            "Community detection done: {} communities, modularity {:.6}",
            summary.communities, summary.modularity
        );
        summary
    }

    /// Evaluate every neighbouring community of `vertex` and move it to the best one.
    /// Returns whether the vertex changed community.
    fn move_to_best_community(&self, network: &mut MovieNetwork, vertex: VInt, m: f64) -> bool {
        let graph = &network.graph;
        let table = &network.comm_table;
        let k_i = graph.vertex(vertex).weighted_degree();
        let connections = community_connections(graph, table, vertex);

        let mut best = 0.0f64;
        let mut best_community: Option<CommID> = None;
        for (neighbour, _) in graph.vertex(vertex).neighbours() {
            let comm_id = table.look_up_community(neighbour);
            let community = match table.get(comm_id) {
                Some(community) => community,
                None => continue,
            };
            if community.size() >= self.capacity {
                continue;
            }
            let k_i_in = connections.get(&comm_id).copied().unwrap_or(0.0);
            let q_value = delta_q(community, k_i, k_i_in, m);
            if q_value > best {
                best = q_value;
                best_community = Some(comm_id);
            }
        }

        let current = table.look_up_community(vertex);
        match best_community {
            Some(target) if target != current => {
                let weight_into_to = connections.get(&target).copied().unwrap_or(0.0);
                let weight_into_from = connections.get(&current).copied().unwrap_or(0.0);
                network
                    .comm_table
                    .move_vertex(vertex, k_i, current, target, weight_into_to, weight_into_from);
                true
            }
            _ => false,
        }
    }
}

/// Sum of the edge weights from `vertex` into each neighbouring community.
/// `vertex` is never its own neighbour, so its own entry covers the other members only.
fn community_connections(
    graph: &WeightedGraph,
    table: &CommTable,
    vertex: VInt,
) -> BTreeMap<CommID, f64> {
    let mut connections = BTreeMap::new();
    for (neighbour, weight) in graph.vertex(vertex).neighbours() {
        *connections
            .entry(table.look_up_community(neighbour))
            .or_insert(0.0) += weight;
    }
    connections
}

/// Modularity gain of adding a vertex of weighted degree `k_i` to `community`,
/// where `k_i_in` is the weight between the vertex and the community.
/// The internal term is divided by `2m`, not `m`.
pub fn delta_q(community: &Community, k_i: f64, k_i_in: f64, m: f64) -> f64 {
    let two_m = 2.0 * m;
    let sum_in = community.internal_weight();
    let sum_total = community.incident_weight();
    ((sum_in + k_i_in) / two_m - ((sum_total + k_i) / two_m).powi(2))
        - (sum_in / two_m - (sum_total / two_m).powi(2) - (k_i / two_m).powi(2))
}

/// Newman modularity of the network's current partition.
pub fn modularity(network: &MovieNetwork) -> f64 {
    let total_weight = network.graph.total_weight();
    if total_weight <= 0.0 {
        return 0.0;
    }
    network
        .comm_table
        .iter()
        .map(|community| {
            community.internal_weight() / total_weight
                - (community.degree_sum() / (2.0 * total_weight)).powi(2)
        })
        .sum()
}
