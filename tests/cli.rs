use std::path::PathBuf;

use assert_cmd::Command;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn movie_community() -> Command {
    let mut cmd = Command::cargo_bin("movie_community").unwrap();
    cmd.arg("--log-stderr")
        .arg("--movies")
        .arg(data("movies.csv"))
        .arg("--reviews")
        .arg(data("ratings.csv"));
    cmd
}

fn stdout_lines(output: &[u8]) -> Vec<String> {
    String::from_utf8(output.to_vec())
        .unwrap()
        .lines()
        .map(|line| line.to_string())
        .collect()
}

#[test]
fn test_recommend_stays_in_community() {
    let output = movie_community()
        .args(["recommend", "--movie", "Heat", "--limit", "3"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_lines(&output), vec!["Ronin", "Collateral", "Alien, The"]);

    let output = movie_community()
        .args(["recommend", "--movie", "Amelie", "--limit", "5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_lines(&output), vec!["Before Sunrise", "Chocolat"]);
}

#[test]
fn test_recommend_unknown_movie_fails() {
    movie_community()
        .args(["recommend", "--movie", "Casablanca"])
        .assert()
        .failure();
}

#[test]
fn test_communities_json() {
    let output = movie_community()
        .args(["communities", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let communities = value.as_array().unwrap();
    assert_eq!(communities.len(), 2);
    let sizes: usize = communities
        .iter()
        .map(|c| c["members"].as_array().unwrap().len())
        .sum();
    assert_eq!(sizes, 7);
}

#[test]
fn test_subgraph_json() {
    let output = movie_community()
        .args(["subgraph", "--movie", "Chocolat"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(value["edges"].as_array().unwrap().len(), 3);
}

#[test]
fn test_shuffle() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("shuffled.csv");
    Command::cargo_bin("movie_community")
        .unwrap()
        .arg("--log-stderr")
        .arg("shuffle")
        .arg("--input")
        .arg(data("movies.csv"))
        .arg("--output")
        .arg(&output)
        .args(["--seed", "3"])
        .assert()
        .success();
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 7);
    assert!(!text.contains("movieId"));
}

#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(
        &config,
        format!(
            "movies_path: {:?}\nreviews_path: {:?}\ncapacity: 2\nlog_dir: null\n",
            data("movies.csv"),
            data("ratings.csv")
        ),
    )
    .unwrap();
    let output = Command::cargo_bin("movie_community")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .args(["communities", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    for community in value.as_array().unwrap() {
        assert!(community["members"].as_array().unwrap().len() <= 2);
    }
}
