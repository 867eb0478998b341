use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::READ_BUFFER_SIZE;

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn write_lines(writer: &mut impl Write, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// Drop the header of a CSV stream, then shuffle the remaining lines in chunks of
/// `chunk_size`. Lines never move across chunk boundaries. Returns the number of lines written.
pub fn shuffle_records<R: Rng>(
    input: impl BufRead,
    output: &mut impl Write,
    chunk_size: usize,
    rng: &mut R,
) -> Result<usize> {
    let chunk_size = chunk_size.max(1);
    let mut written = 0usize;
    let mut chunk = Vec::new();
    for line in input.lines().skip(1) {
        let line = line.context("failed to read rating line")?;
        if line.is_empty() {
            continue;
        }
        chunk.push(line);
        if chunk.len() == chunk_size {
            chunk.shuffle(rng);
            write_lines(output, &chunk)?;
            written += chunk.len();
            chunk.clear();
        }
    }
    chunk.shuffle(rng);
    write_lines(output, &chunk)?;
    written += chunk.len();
    output.flush()?;
    Ok(written)
}

fn shuffle_file(
    input_path: &Path,
    output_path: &Path,
    chunk_size: usize,
    seed: Option<u64>,
) -> Result<usize> {
    let input = File::open(input_path)
        .with_context(|| format!("failed to open {}", input_path.display()))?;
    let output = File::create(output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    let mut writer = BufWriter::new(output);
    let written = shuffle_records(
        BufReader::with_capacity(READ_BUFFER_SIZE, input),
        &mut writer,
        chunk_size,
        &mut make_rng(seed),
    )?;
    info!(
        "Shuffled {} ratings from {} into {}",
        written,
        input_path.display(),
        output_path.display()
    );
    Ok(written)
}

/// Shuffle a whole rating file in memory, dropping its header.
pub fn create_formatted_dataset(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    seed: Option<u64>,
) -> Result<usize> {
    shuffle_file(input_path.as_ref(), output_path.as_ref(), usize::MAX, seed)
}

/// Shuffle a rating file too large for memory, one chunk of lines at a time.
pub fn create_large_formatted_dataset(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    chunk_size: usize,
    seed: Option<u64>,
) -> Result<usize> {
    shuffle_file(input_path.as_ref(), output_path.as_ref(), chunk_size, seed)
}

#[cfg(test)]
mod test_dataset {
    use std::io::Cursor;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::dataset::{create_formatted_dataset, shuffle_records};

    fn input(rows: usize) -> String {
        let mut text = String::from("custID,rating,date,movieID\n");
        for i in 0..rows {
            text.push_str(&format!("c{},{},2005-01-01,{}\n", i, i % 5, i));
        }
        text
    }

    fn sorted_lines(bytes: &[u8]) -> Vec<String> {
        let mut lines: Vec<String> = String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(|s| s.to_string())
            .collect();
        lines.sort();
        lines
    }

    #[test]
    fn test_header_dropped_lines_kept() {
        let text = input(50);
        let mut output = Vec::new();
        let written = shuffle_records(
            Cursor::new(text.clone()),
            &mut output,
            usize::MAX,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        assert_eq!(written, 50);
        let mut expected: Vec<String> = text.lines().skip(1).map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(sorted_lines(&output), expected);
    }

    #[test]
    fn test_chunks_stay_in_place() {
        let text = input(10);
        let mut output = Vec::new();
        shuffle_records(Cursor::new(text), &mut output, 4, &mut StdRng::seed_from_u64(1)).unwrap();
        let lines: Vec<String> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(lines.len(), 10);
        for (chunk_no, chunk) in lines.chunks(4).enumerate() {
            for line in chunk {
                let id: usize = line.rsplit(',').next().unwrap().parse().unwrap();
                assert_eq!(id / 4, chunk_no);
            }
        }
    }

    #[test]
    fn test_seeded_file_shuffle_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ratings.csv");
        std::fs::write(&source, input(30)).unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        assert_eq!(create_formatted_dataset(&source, &first, Some(42)).unwrap(), 30);
        create_formatted_dataset(&source, &second, Some(42)).unwrap();
        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }
}
