use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use movie_community::community_algo::CommunityDetector;
use movie_community::config::{RecommenderConfig, SHUFFLE_CHUNK_SIZE};
use movie_community::dataset::{create_formatted_dataset, create_large_formatted_dataset};
use movie_community::export::community_subgraph;
use movie_community::loader::{load_movie_graph, LoadOptions};
use movie_community::logger::init_logger;
use movie_community::network::MovieNetwork;
use movie_community::recommend::get_best_movies;

#[derive(Parser, Debug)]
#[command(name = "movie_community", version, about = "Recommend movies from co-rating communities")]
struct Cli {
    /// YAML config file; flags below override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Movies CSV (movieId,releaseYear,title with a header).
    #[arg(long = "movies", global = true)]
    movies_path: Option<PathBuf>,

    /// Ratings CSV (custID,rating,date,movieID without a header).
    #[arg(long = "reviews", global = true)]
    reviews_path: Option<PathBuf>,

    #[arg(long, global = true)]
    movie_limit: Option<usize>,

    #[arg(long, global = true)]
    rating_limit: Option<usize>,

    #[arg(long, global = true)]
    epochs: Option<usize>,

    /// Largest allowed community.
    #[arg(long, global = true)]
    capacity: Option<usize>,

    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log to stderr instead of the log directory.
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop the header of a rating file and shuffle its lines.
    Shuffle {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Shuffle in chunks instead of loading the whole file.
        #[arg(long)]
        large: bool,
        #[arg(long, default_value_t = SHUFFLE_CHUNK_SIZE)]
        chunk_size: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Recommend movies related to the given ones.
    Recommend {
        #[arg(long = "movie", required = true)]
        titles: Vec<String>,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Print every detected community.
    Communities {
        #[arg(long)]
        json: bool,
    },
    /// Print the communities of the given movies as JSON.
    Subgraph {
        #[arg(long = "movie", required = true)]
        titles: Vec<String>,
    },
}

impl Cli {
    fn resolve_config(&self) -> Result<RecommenderConfig> {
        let mut config = match &self.config {
            Some(path) => RecommenderConfig::from_yaml_file(path)?,
            None => RecommenderConfig::default(),
        };
        if let Some(path) = &self.movies_path {
            config.movies_path = path.clone();
        }
        if let Some(path) = &self.reviews_path {
            config.reviews_path = path.clone();
        }
        if let Some(limit) = self.movie_limit {
            config.movie_limit = limit;
        }
        if let Some(limit) = self.rating_limit {
            config.rating_limit = limit;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if self.log_stderr {
            config.log_dir = None;
        } else if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

/// Load the rating graph and partition it.
fn build_network(config: &RecommenderConfig) -> Result<MovieNetwork> {
    let detector = CommunityDetector::new(config.epochs, config.capacity)?;
    let mut network = load_movie_graph(
        &config.reviews_path,
        &config.movies_path,
        LoadOptions::from(config),
    )?;
    let summary = detector.execute(&mut network);
    info!("Moves per epoch: {:?}", summary.moves_per_epoch);
    Ok(network)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logger(config.log_dir.as_deref())?;

    match &cli.command {
        Command::Shuffle {
            input,
            output,
            large,
            chunk_size,
            seed,
        } => {
            let written = if *large {
                create_large_formatted_dataset(input, output, *chunk_size, *seed)?
            } else {
                create_formatted_dataset(input, output, *seed)?
            };
            println!("{} ratings written to {}", written, output.display());
        }
        Command::Recommend { titles, limit } => {
            let network = build_network(&config)?;
            for title in get_best_movies(&network, titles.as_slice(), *limit)? {
                println!("{}", title);
            }
        }
        Command::Communities { json } => {
            let network = build_network(&config)?;
            let communities = network.communities();
            if *json {
                let value: Vec<_> = communities
                    .iter()
                    .map(|(name, members)| serde_json::json!({ "community": name, "members": members }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for (name, members) in communities {
                    println!("{} ({}): {}", name, members.len(), members.join(", "));
                }
            }
        }
        Command::Subgraph { titles } => {
            let network = build_network(&config)?;
            let subgraph = community_subgraph(&network, titles.as_slice())?;
            println!("{}", serde_json::to_string_pretty(&subgraph)?);
        }
    }
    Ok(())
}
