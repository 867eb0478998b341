use crate::comm_table::{CommID, CommTable};
use crate::error::Result;
use crate::graph::{VInt, WeightedGraph};

/// The movie network: the weighted graph plus its current community partition.
#[derive(Debug, Default, Clone)]
pub struct MovieNetwork {
    pub(crate) graph: WeightedGraph,
    pub(crate) comm_table: CommTable,
}

impl MovieNetwork {
    pub fn new() -> MovieNetwork {
        MovieNetwork::default()
    }

    /// Add a movie as its own singleton community. Existing titles are left alone.
    pub fn add_movie(&mut self, title: &str) -> Result<VInt> {
        let (vertex_id, created) = self.graph.add_vertex(title)?;
        if created {
            self.comm_table.seed_vertex(vertex_id);
        }
        Ok(vertex_id)
    }

    pub fn add_edge(&mut self, title1: &str, title2: &str, weight: f64) -> Result<bool> {
        self.graph.add_edge(title1, title2, weight)
    }

    pub fn increment_edge(&mut self, title1: &str, title2: &str, delta: f64) -> Result<()> {
        self.graph.increment_edge(title1, title2, delta)
    }

    pub fn remove_edge(&mut self, title1: &str, title2: &str) -> Result<bool> {
        self.graph.remove_edge(title1, title2)
    }

    pub fn get_weight(&self, title1: &str, title2: &str) -> Result<f64> {
        self.graph.get_weight(title1, title2)
    }

    pub fn are_adjacent(&self, title1: &str, title2: &str) -> bool {
        self.graph.are_adjacent(title1, title2)
    }

    pub fn get_neighbours(&self, title: &str) -> Result<Vec<&str>> {
        self.graph.get_neighbours(title)
    }

    /// Cache weighted degrees once all edges are loaded.
    pub fn finalize_degrees(&mut self) {
        self.graph.finalize_degrees();
        self.comm_table.refresh_degree_sums(&self.graph);
    }

    pub fn graph(&self) -> &WeightedGraph {
        &self.graph
    }

    pub fn comm_table(&self) -> &CommTable {
        &self.comm_table
    }

    /// Title of the community that owns `title`.
    pub fn community_of(&self, title: &str) -> Result<&str> {
        let vertex_id = self.graph.locate(title)?;
        Ok(self.community_title(self.comm_table.look_up_community(vertex_id)))
    }

    /// A community is named after the movie that seeded it.
    pub fn community_title(&self, comm_id: CommID) -> &str {
        self.graph.title(comm_id)
    }

    /// Every movie with the title of its community, in insertion order.
    pub fn movies(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.iter().map(|(vertex_id, vertex)| {
            let comm_id = self.comm_table.look_up_community(vertex_id);
            (vertex.title(), self.community_title(comm_id))
        })
    }

    /// Every non-empty community with its member titles.
    pub fn communities(&self) -> Vec<(&str, Vec<&str>)> {
        self.comm_table
            .iter()
            .filter(|community| !community.is_empty())
            .map(|community| {
                let members = community.members().map(|v| self.graph.title(v)).collect();
                (self.community_title(community.id()), members)
            })
            .collect()
    }
}
