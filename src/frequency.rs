//! Corpus word frequency list
//!
//! The list is a tab-separated file where each line starts with a number of
//! occurrences and a word. Lines are sorted by decreasing occurrence count, so
//! a word's line position is its frequency rank.

use crate::{Rank, Result, Word};
use anyhow::Context;
use clap::ValueEnum;
use csv_async::AsyncReaderBuilder;
use futures::stream::StreamExt;
use std::{collections::HashMap, path::Path};
use tokio::{fs::File, io::AsyncRead};

/// What we know about a word from the frequency list
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct WordFrequency {
    /// Line position of the word, 0 being the most frequent word
    pub rank: Rank,

    /// Occurrence count, as written in the file
    pub frequency: Box<str>,
}

/// Frequency data for every word of the list
pub type FrequencyTable = HashMap<Word, WordFrequency>;

/// Policy for words that appear on several lines of the frequency list
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Keep the first occurrence, i.e. the most frequent one
    First,

    /// Keep the last occurrence
    #[default]
    Last,
}

/// Load the frequency list from a file
pub async fn load(path: &Path, duplicates: DuplicatePolicy) -> Result<FrequencyTable> {
    let context = || format!("reading word frequencies from {}", path.display());
    let file = File::open(path).await.with_context(context)?;
    let table = read(file, duplicates).await.with_context(context)?;
    log::info!("Loaded frequency data for {} words", table.len());
    Ok(table)
}

/// Decode frequency list data
///
/// Blank lines carry no word, but still count towards the rank of the lines
/// that follow them.
pub async fn read(
    input: impl AsyncRead + Unpin + Send,
    duplicates: DuplicatePolicy,
) -> Result<FrequencyTable> {
    // Words may contain quotes, and lines may carry extra columns
    let mut records = AsyncReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .create_reader(input)
        .into_records();

    // The reader skips blank lines, so ranks come from record line numbers
    let mut table = FrequencyTable::new();
    let mut last_line: u64 = 0;
    while let Some(record) = records.next().await {
        let record =
            record.with_context(|| format!("decoding the line after line {last_line}"))?;
        let line = record
            .position()
            .map_or(last_line + 1, |position| position.line());
        last_line = line;
        let rank = Rank::try_from(line - 1).context("frequency list is too long")?;
        let (Some(frequency), Some(word)) = (record.get(0), record.get(1)) else {
            anyhow::bail!("line {line} should contain a frequency and a word, found {record:?}");
        };
        let data = WordFrequency {
            rank,
            frequency: frequency.into(),
        };
        match duplicates {
            DuplicatePolicy::First => {
                table.entry(word.into()).or_insert(data);
            }
            DuplicatePolicy::Last => {
                if let Some(previous) = table.insert(word.into(), data) {
                    log::trace!(
                        "Word {word:?} from line {line} overrides rank {} ({} occurrences)",
                        previous.rank,
                        previous.frequency
                    );
                }
            }
        }
    }
    Ok(table)
}
