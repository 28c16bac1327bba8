//! Word statistics computed with both engines.
//!
//! Builds a synthetic corpus, then:
//! 1. counts distinct long words with the staged engine and the parallel engine
//! 2. ranks the most frequent words
//! 3. reruns the staged pipeline under a tight deadline to show truncation
//!
//! Run with: cargo run --example word_count

use anyhow::Result;
use ironstream::*;
use std::time::{Duration, Instant};

const WORDS: &[&str] = &[
    "stream", "stage", "queue", "worker", "partition", "deadline", "frequency", "incomprehensibilities",
    "counterrevolutionaries", "to", "be", "or", "not",
];

fn corpus(lines: usize) -> Vec<String> {
    (0..lines)
        .map(|i| {
            (0..12)
                .map(|j| WORDS[(i * 7 + j * j) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[allow(clippy::ptr_arg)]
fn split_line(line: &String) -> Vec<String> {
    line.split(' ').map(str::to_string).collect()
}

fn main() -> Result<()> {
    let lines = corpus(50_000);
    let word_len = 15;

    // Distinct long words, staged
    let since = Instant::now();
    let staged = Stream::new(lines.clone())
        .flat_map(split_line)
        .filter(move |w: &String| w.len() > word_len)
        .distinct()
        .count()?;
    println!("staged:   {staged} distinct long words in {:?}", since.elapsed());

    // Same question, fixed partitions
    let since = Instant::now();
    let parallel = ParallelStream::new(lines.clone())?
        .flat_map(split_line)
        .filter(|w| w.len() > word_len)
        .distinct()
        .count();
    println!(
        "parallel: {parallel} distinct long words in {:?}",
        since.elapsed()
    );

    // Ranking
    println!("\nMost frequent words:");
    for entry in Stream::new(lines.clone()).flat_map(split_line).top(5).collect()? {
        println!("  {:>8}  {}", entry.count, entry.value);
    }

    // Deadline
    let opts = StreamOptions::new().with_timeout(Duration::from_millis(5));
    let limited = Stream::with_options(lines, opts)
        .flat_map(split_line)
        .filter(|w: &String| w.len() <= 3);
    let flag = limited.correctness();
    let seen = limited.count()?;
    println!(
        "\nShort words within 5ms: {seen} (complete: {})",
        flag.is_correct()
    );

    Ok(())
}
