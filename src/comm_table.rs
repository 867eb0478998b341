// A community table which includes a vertex-to-community map and the community aggregates.
use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{VInt, WeightedGraph};

/// A community is named after the vertex that seeded it.
pub type CommID = VInt;

// Define the community structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Community {
    comm_id: CommID,
    members: BTreeSet<VInt>,
    internal_weight: f64, // Each intra-community edge counted once.
    degree_sum: f64, // Sum of the members' weighted degrees.
}

impl Community {
    fn seed(comm_id: CommID) -> Community {
        let mut members = BTreeSet::new();
        members.insert(comm_id);
        Community {
            comm_id,
            members,
            ..Default::default()
        }
    }

    pub fn id(&self) -> CommID {
        self.comm_id
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = VInt> + '_ {
        self.members.iter().copied()
    }

    pub fn internal_weight(&self) -> f64 {
        self.internal_weight
    }

    pub fn degree_sum(&self) -> f64 {
        self.degree_sum
    }

    /// Edge weight touching this community, intra edges counted once.
    pub fn incident_weight(&self) -> f64 {
        self.degree_sum - self.internal_weight
    }
}

/// Community Table, the single source of truth for the current partition.
#[derive(Debug, Clone, Default)]
pub struct CommTable {
    vertex_community_map: Vec<CommID>, // Indexed by vertex id.
    community_map: BTreeMap<CommID, Community>,
}

impl CommTable {
    pub fn new() -> CommTable {
        CommTable::default()
    }

    /// Install a freshly created vertex as a singleton community.
    /// Vertices must be seeded in id order.
    pub(crate) fn seed_vertex(&mut self, vertex: VInt) {
        debug_assert_eq!(vertex as usize, self.vertex_community_map.len());
        self.vertex_community_map.push(vertex);
        self.community_map.insert(vertex, Community::seed(vertex));
    }

    #[inline]
    pub fn look_up_community(&self, vertex: VInt) -> CommID {
        self.vertex_community_map[vertex as usize]
    }

    pub fn get(&self, comm_id: CommID) -> Option<&Community> {
        self.community_map.get(&comm_id)
    }

    pub fn community_count(&self) -> usize {
        self.community_map.len()
    }

    /// Communities in ascending id order, including logically deleted empty ones.
    pub fn iter(&self) -> impl Iterator<Item = &Community> + '_ {
        self.community_map.values()
    }

    /// Refresh every community's degree sum from the graph's degree cache.
    pub(crate) fn refresh_degree_sums(&mut self, graph: &WeightedGraph) {
        for community in self.community_map.values_mut() {
            community.degree_sum = community
                .members
                .iter()
                .map(|v| graph.vertex(*v).weighted_degree())
                .sum();
        }
    }

    /// Move `vertex` from `from` to `to`.
    ///
    /// `weight_into_from` is the weight between `vertex` and the other members of
    /// `from`, `weight_into_to` the weight between `vertex` and the members of `to`.
    /// Both must be measured before the move.
    pub fn move_vertex(
        &mut self,
        vertex: VInt,
        vertex_degree: f64,
        from: CommID,
        to: CommID,
        weight_into_to: f64,
        weight_into_from: f64,
    ) {
        debug_assert_eq!(self.look_up_community(vertex), from);
        if let Some(source) = self.community_map.get_mut(&from) {
            source.members.remove(&vertex);
            source.internal_weight -= weight_into_from;
            source.degree_sum -= vertex_degree;
        }
        if let Some(target) = self.community_map.get_mut(&to) {
            target.members.insert(vertex);
            target.internal_weight += weight_into_to;
            target.degree_sum += vertex_degree;
        }
        self.vertex_community_map[vertex as usize] = to;
    }

    /// Remove the communities left without members, returning how many were dropped.
    pub fn purge_empty(&mut self) -> usize {
        let before = self.community_map.len();
        self.community_map.retain(|_, community| !community.is_empty());
        before - self.community_map.len()
    }
}
