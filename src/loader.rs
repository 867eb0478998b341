use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};

use crate::config::{RecommenderConfig, READ_BUFFER_SIZE};
use crate::network::MovieNetwork;

/// Limits applied while reading the rating dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub movie_limit: usize,
    pub rating_limit: usize,
    pub rating_span: f64,
}

impl From<&RecommenderConfig> for LoadOptions {
    fn from(config: &RecommenderConfig) -> Self {
        LoadOptions {
            movie_limit: config.movie_limit,
            rating_limit: config.rating_limit,
            rating_span: config.rating_span,
        }
    }
}

/// Similarity contributed by one user rating two movies:
/// 1 for equal ratings, 0 for ratings a full span apart.
pub fn determine_edge_weight(rating1: f64, rating2: f64, rating_span: f64) -> f64 {
    1.0 - (rating1 - rating2).abs() / rating_span
}

/// Connect every pair of movies rated by one user, adding to the existing weight
/// when the pair is already adjacent.
pub fn modify_weighted_edge(
    network: &mut MovieNetwork,
    movies_rated: &[(String, f64)],
    rating_span: f64,
) -> crate::error::Result<()> {
    for ((movie1, rating1), (movie2, rating2)) in movies_rated.iter().tuple_combinations() {
        let weight = determine_edge_weight(*rating1, *rating2, rating_span);
        if weight <= 0.0 {
            continue;
        }
        if network.are_adjacent(movie1, movie2) {
            network.increment_edge(movie1, movie2, weight)?;
        } else {
            network.add_edge(movie1, movie2, weight)?;
        }
    }
    Ok(())
}

/// Split one CSV record, honouring double-quoted fields.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches(['\r', '\n']).chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Read `movieId,releaseYear,title` rows (after a header line) into the network.
/// Returns the movie id to title map of the loaded movies.
fn load_movies(
    network: &mut MovieNetwork,
    movies: impl BufRead,
    movie_limit: usize,
) -> Result<HashMap<u32, String>> {
    let mut movies_map = HashMap::new();
    for (line_no, line) in movies.lines().enumerate().skip(1) {
        if movies_map.len() >= movie_limit {
            break;
        }
        let line = line.context("failed to read movies file")?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line);
        let movie_id = match (fields.len(), fields[0].trim().parse::<u32>()) {
            (len, Ok(movie_id)) if len >= 3 => movie_id,
            _ => {
                warn!("Skip malformed movie line {}: {}", line_no + 1, line);
                continue;
            }
        };
        // Unquoted commas belong to the title, e.g. `Grand Canyon, The`.
        let title = fields[2..].join(",").trim().to_string();
        network.add_movie(&title)?;
        movies_map.insert(movie_id, title);
    }
    Ok(movies_map)
}

/// Group `custID,rating,date,movieID` rows by customer, in first-seen order.
/// Only ratings of loaded movies count toward `rating_limit`.
fn load_ratings(
    reviews: impl BufRead,
    movies_map: &HashMap<u32, String>,
    rating_limit: usize,
) -> Result<Vec<Vec<(String, f64)>>> {
    let mut customer_index = HashMap::<String, usize>::new();
    let mut user_ratings: Vec<Vec<(String, f64)>> = Vec::new();
    let mut counter = 0usize;
    for (line_no, line) in reviews.lines().enumerate() {
        if counter >= rating_limit {
            break;
        }
        let line = line.context("failed to read reviews file")?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line);
        if fields.len() != 4 {
            warn!("Skip malformed rating line {}: {}", line_no + 1, line);
            continue;
        }
        let (rating, movie_id) = match (
            fields[1].trim().parse::<f64>(),
            fields[3].trim().parse::<u32>(),
        ) {
            (Ok(rating), Ok(movie_id)) => (rating, movie_id),
            _ => {
                warn!("Skip malformed rating line {}: {}", line_no + 1, line);
                continue;
            }
        };
        if let Some(title) = movies_map.get(&movie_id) {
            let customer = fields[0].trim().to_string();
            let next_index = user_ratings.len();
            let index = *customer_index.entry(customer).or_insert(next_index);
            if index == next_index {
                user_ratings.push(Vec::new());
            }
            user_ratings[index].push((title.clone(), rating));
            counter += 1;
        }
    }
    Ok(user_ratings)
}

/// Build the movie network from a movies listing and a review stream.
/// Degrees are finalized before returning.
pub fn load_movie_graph_from_readers(
    reviews: impl BufRead,
    movies: impl BufRead,
    options: LoadOptions,
) -> Result<MovieNetwork> {
    let mut network = MovieNetwork::new();
    let movies_map = load_movies(&mut network, movies, options.movie_limit)?;
    let user_ratings = load_ratings(reviews, &movies_map, options.rating_limit)?;
    for movies_rated in &user_ratings {
        modify_weighted_edge(&mut network, movies_rated, options.rating_span)?;
    }
    network.finalize_degrees();
    info!(
        "Loaded {} movies, {} edges from {} users",
        network.graph().v_size(),
        network.graph().e_size(),
        user_ratings.len()
    );
    Ok(network)
}

/// Build the movie network from the review and movie CSV files.
pub fn load_movie_graph(
    reviews_file_path: impl AsRef<Path>,
    movies_file_path: impl AsRef<Path>,
    options: LoadOptions,
) -> Result<MovieNetwork> {
    let reviews_path = reviews_file_path.as_ref();
    let movies_path = movies_file_path.as_ref();
    let reviews_file = File::open(reviews_path)
        .with_context(|| format!("failed to open reviews {}", reviews_path.display()))?;
    let movies_file = File::open(movies_path)
        .with_context(|| format!("failed to open movies {}", movies_path.display()))?;
    load_movie_graph_from_readers(
        BufReader::with_capacity(READ_BUFFER_SIZE, reviews_file),
        BufReader::new(movies_file),
        options,
    )
}
