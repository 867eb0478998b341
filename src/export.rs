use std::collections::BTreeSet;

use serde::Serialize;

use crate::comm_table::CommID;
use crate::error::Result;
use crate::network::MovieNetwork;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgraphNode {
    pub title: String,
    pub community: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgraphEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// The communities touched by a set of movies, ready for a drawing front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunitySubgraph {
    pub nodes: Vec<SubgraphNode>,
    pub edges: Vec<SubgraphEdge>,
}

/// Collect every movie sharing a community with one of `titles`, and the
/// edges that stay inside those communities. Each edge is listed once.
pub fn community_subgraph<S: AsRef<str>>(
    network: &MovieNetwork,
    titles: &[S],
) -> Result<CommunitySubgraph> {
    let graph = network.graph();
    let table = network.comm_table();
    let mut communities = BTreeSet::<CommID>::new();
    for title in titles {
        let vertex = graph.locate(title.as_ref())?;
        communities.insert(table.look_up_community(vertex));
    }

    let mut subgraph = CommunitySubgraph::default();
    for (vertex, movie) in graph.iter() {
        let comm_id = table.look_up_community(vertex);
        if !communities.contains(&comm_id) {
            continue;
        }
        subgraph.nodes.push(SubgraphNode {
            title: movie.title().to_string(),
            community: network.community_title(comm_id).to_string(),
        });
        for (neighbour, weight) in movie.neighbours() {
            if neighbour > vertex && table.look_up_community(neighbour) == comm_id {
                subgraph.edges.push(SubgraphEdge {
                    source: movie.title().to_string(),
                    target: graph.title(neighbour).to_string(),
                    weight,
                });
            }
        }
    }
    Ok(subgraph)
}

#[cfg(test)]
mod test_export {
    use crate::community_algo::CommunityDetector;
    use crate::export::community_subgraph;
    use crate::network::MovieNetwork;

    fn two_groups() -> MovieNetwork {
        let mut network = MovieNetwork::new();
        for title in ["A1", "A2", "A3", "B1", "B2", "B3"] {
            network.add_movie(title).unwrap();
        }
        for (a, b) in [("A1", "A2"), ("A1", "A3"), ("A2", "A3"), ("B1", "B2"), ("B1", "B3"), ("B2", "B3")] {
            network.add_edge(a, b, 1.0).unwrap();
        }
        network.add_edge("A3", "B1", 0.05).unwrap();
        network.finalize_degrees();
        CommunityDetector::new(3, 25).unwrap().execute(&mut network);
        network
    }

    #[test]
    fn test_subgraph_restricted_to_community() {
        let network = two_groups();
        let subgraph = community_subgraph(&network, &["A2"]).unwrap();
        let community = network.community_of("A2").unwrap();
        assert!(subgraph.nodes.iter().all(|node| node.community == community));
        assert!(subgraph.nodes.iter().any(|node| node.title == "A2"));
        for edge in &subgraph.edges {
            assert_eq!(network.community_of(&edge.source).unwrap(), community);
            assert_eq!(network.community_of(&edge.target).unwrap(), community);
            assert_eq!(network.get_weight(&edge.source, &edge.target).unwrap(), edge.weight);
        }
        let json = serde_json::to_value(&subgraph).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), subgraph.nodes.len());
    }

    #[test]
    fn test_unknown_title() {
        let network = two_groups();
        assert!(community_subgraph(&network, &["Nope"]).is_err());
    }
}
