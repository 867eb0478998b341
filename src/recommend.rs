use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use log::debug;

use crate::error::Result;
use crate::graph::VInt;
use crate::network::MovieNetwork;

// An entry of the frontier. Heavier edges pop first, equal weights pop in title order.
struct Candidate<'a> {
    weight: f64,
    title: &'a str,
    vertex: VInt,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| other.title.cmp(self.title))
    }
}

/// Push every unvisited neighbour of `source` that shares its community.
fn expand<'a>(
    network: &'a MovieNetwork,
    source: VInt,
    visited: &HashSet<VInt>,
    frontier: &mut BinaryHeap<Candidate<'a>>,
) {
    let graph = network.graph();
    let table = network.comm_table();
    let source_comm = table.look_up_community(source);
    for (neighbour, weight) in graph.vertex(source).neighbours() {
        if table.look_up_community(neighbour) == source_comm && !visited.contains(&neighbour) {
            frontier.push(Candidate {
                weight,
                title: graph.title(neighbour),
                vertex: neighbour,
            });
        }
    }
}

/// Return up to `limit` movies related to `seeds`, best first.
///
/// Starting from the seeds, repeatedly take the heaviest edge on the frontier
/// that leads to an unvisited movie of the same community. Weights are a local
/// priority, not a path cost. The partition must not change while this runs.
pub fn get_best_movies<S: AsRef<str>>(
    network: &MovieNetwork,
    seeds: &[S],
    limit: usize,
) -> Result<Vec<String>> {
    let graph = network.graph();
    let seed_ids = seeds
        .iter()
        .map(|title| graph.locate(title.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    // Seeds are never recommended back.
    let mut visited: HashSet<VInt> = seed_ids.iter().copied().collect();
    let mut frontier = BinaryHeap::new();
    for seed in &seed_ids {
        expand(network, *seed, &visited, &mut frontier);
    }

    let mut best_movies = Vec::new();
    while best_movies.len() < limit {
        let candidate = match frontier.pop() {
            Some(candidate) => candidate,
            None => break,
        };
        // Stale duplicate, the movie was reached through a heavier edge already.
        if !visited.insert(candidate.vertex) {
            continue;
        }
        best_movies.push(candidate.title.to_string());
        expand(network, candidate.vertex, &visited, &mut frontier);
    }
    debug!(
        "Recommended {} of {} requested movies for {} seeds",
        best_movies.len(),
        limit,
        seed_ids.len()
    );
    Ok(best_movies)
}
