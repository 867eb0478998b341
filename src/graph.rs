use std::collections::{BTreeMap, HashMap};

use crate::error::{GraphError, Result};

/// Dense vertex id, assigned in insertion order.
pub type VInt = u32;

/// A movie vertex in the weighted similarity graph.
#[derive(Debug, Clone)]
pub struct MovieVertex {
    pub(crate) title: String,
    // Adjacent vertex -> edge weight. Mirrored at the other endpoint.
    pub(crate) neighbours: BTreeMap<VInt, f64>,
    // Cached sum of the neighbour weights, refreshed by `finalize_degrees`.
    pub(crate) weighted_degree: f64,
}

impl MovieVertex {
    fn new(title: &str) -> Self {
        MovieVertex {
            title: title.to_string(),
            neighbours: BTreeMap::new(),
            weighted_degree: 0.0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of adjacent movies, ignoring weights.
    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }

    pub fn weighted_degree(&self) -> f64 {
        self.weighted_degree
    }

    /// Iterate the neighbours in ascending vertex id order.
    pub fn neighbours(&self) -> impl Iterator<Item = (VInt, f64)> + '_ {
        self.neighbours.iter().map(|(v, w)| (*v, *w))
    }
}

// Id of the vertex stored at arena slot `len`. The vertex count itself must
// still fit in a `VInt`.
fn next_vertex_id(len: usize) -> Result<VInt> {
    VInt::try_from(len)
        .ok()
        .filter(|id| *id < VInt::MAX)
        .ok_or(GraphError::VertexLimit(len))
}

/// Undirected weighted graph held in a single vertex arena.
/// Vertices refer to each other by `VInt`, never by reference.
#[derive(Debug, Default, Clone)]
pub struct WeightedGraph {
    vertices: Vec<MovieVertex>,
    title_map: HashMap<String, VInt>,
}

impl WeightedGraph {
    pub fn new() -> WeightedGraph {
        WeightedGraph::default()
    }

    /// Insert a vertex for `title`, returning its id and whether it was newly created.
    pub fn add_vertex(&mut self, title: &str) -> Result<(VInt, bool)> {
        if let Some(vertex_id) = self.title_map.get(title) {
            return Ok((*vertex_id, false));
        }
        let vertex_id = next_vertex_id(self.vertices.len())?;
        self.vertices.push(MovieVertex::new(title));
        self.title_map.insert(title.to_string(), vertex_id);
        Ok((vertex_id, true))
    }

    /// Resolve a title to its vertex id.
    pub fn locate(&self, title: &str) -> Result<VInt> {
        self.title_map
            .get(title)
            .copied()
            .ok_or_else(|| GraphError::UnknownVertex(title.to_string()))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.title_map.contains_key(title)
    }

    fn locate_pair(&self, title1: &str, title2: &str) -> Result<(VInt, VInt)> {
        Ok((self.locate(title1)?, self.locate(title2)?))
    }

    /// Add an edge, doing nothing if the pair is already adjacent.
    /// Self loops and non-positive weights are never stored.
    pub fn add_edge(&mut self, title1: &str, title2: &str, weight: f64) -> Result<bool> {
        let (u, v) = self.locate_pair(title1, title2)?;
        if u == v || !(weight > 0.0) || self.has_edge(u, v) {
            return Ok(false);
        }
        self.vertices[u as usize].neighbours.insert(v, weight);
        self.vertices[v as usize].neighbours.insert(u, weight);
        Ok(true)
    }

    /// Add `delta` to an existing edge in both directions.
    /// A missing edge is created with weight `delta`.
    pub fn increment_edge(&mut self, title1: &str, title2: &str, delta: f64) -> Result<()> {
        let (u, v) = self.locate_pair(title1, title2)?;
        if u == v || !(delta > 0.0) {
            return Ok(());
        }
        *self.vertices[u as usize].neighbours.entry(v).or_insert(0.0) += delta;
        *self.vertices[v as usize].neighbours.entry(u).or_insert(0.0) += delta;
        Ok(())
    }

    /// Drop the edge between two movies, returning whether one existed.
    /// Only valid before community detection starts.
    pub fn remove_edge(&mut self, title1: &str, title2: &str) -> Result<bool> {
        let (u, v) = self.locate_pair(title1, title2)?;
        let removed = self.vertices[u as usize].neighbours.remove(&v).is_some();
        self.vertices[v as usize].neighbours.remove(&u);
        Ok(removed)
    }

    /// Edge weight between two movies, 0 when they are not adjacent.
    pub fn get_weight(&self, title1: &str, title2: &str) -> Result<f64> {
        let (u, v) = self.locate_pair(title1, title2)?;
        Ok(self.weight(u, v))
    }

    /// Whether two movies are adjacent. Unknown titles are never adjacent.
    pub fn are_adjacent(&self, title1: &str, title2: &str) -> bool {
        match self.locate_pair(title1, title2) {
            Ok((u, v)) => self.has_edge(u, v),
            Err(_) => false,
        }
    }

    /// Titles of the movies adjacent to `title`.
    pub fn get_neighbours(&self, title: &str) -> Result<Vec<&str>> {
        let u = self.locate(title)?;
        Ok(self.vertices[u as usize]
            .neighbours
            .keys()
            .map(|v| self.vertices[*v as usize].title.as_str())
            .collect())
    }

    /// Recompute the cached weighted degree of every vertex.
    pub fn finalize_degrees(&mut self) {
        for vertex in self.vertices.iter_mut() {
            vertex.weighted_degree = vertex.neighbours.values().sum();
        }
    }

    #[inline]
    pub fn has_edge(&self, u: VInt, v: VInt) -> bool {
        self.vertices[u as usize].neighbours.contains_key(&v)
    }

    #[inline]
    pub fn weight(&self, u: VInt, v: VInt) -> f64 {
        self.vertices[u as usize]
            .neighbours
            .get(&v)
            .copied()
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn vertex(&self, u: VInt) -> &MovieVertex {
        &self.vertices[u as usize]
    }

    #[inline]
    pub fn title(&self, u: VInt) -> &str {
        &self.vertices[u as usize].title
    }

    pub fn v_size(&self) -> usize {
        self.vertices.len()
    }

    /// Number of undirected edges.
    pub fn e_size(&self) -> usize {
        self.vertices.iter().map(|v| v.neighbours.len()).sum::<usize>() / 2
    }

    /// Vertices in insertion order, paired with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (VInt, &MovieVertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(idx, vertex)| (idx as VInt, vertex))
    }

    /// Half the sum of the cached weighted degrees, i.e. the total edge weight.
    pub fn total_weight(&self) -> f64 {
        self.vertices.iter().map(|v| v.weighted_degree).sum::<f64>() / 2.0
    }
}
