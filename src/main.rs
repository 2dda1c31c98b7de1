//! This program compares the vocabulary of the five JLPT proficiency levels
//! against a corpus word frequency list. It is based on the JMdict dictionary
//! as distributed by the jmdict-simplified project, whose documentation you
//! can find at <https://github.com/scriptin/jmdict-simplified>.

mod config;
mod density;
mod dictionary;
mod frequency;
mod jlpt;
mod plot;
mod progress;

use crate::{
    config::Config,
    density::LevelSummary,
    frequency::DuplicatePolicy,
    progress::{ProgressConfig, ProgressReport, Work},
};
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Plot how the vocabulary of each JLPT level is distributed across a corpus
/// word frequency list
///
/// Words from each level are looked up in the JMdict dictionary, then matched
/// against the frequency list using their kanji spellings first and their kana
/// readings second. The resulting frequency ranks are drawn as one density
/// histogram per level.
#[derive(Parser, Debug)]
#[command(version, author)]
pub struct Args {
    /// Directory where the dictionary download and the plot are stored
    ///
    /// The dictionary is only downloaded if this directory does not contain an
    /// extracted copy of it yet.
    #[arg(long, default_value = "build")]
    build_dir: PathBuf,

    /// Location of the zipped jmdict-simplified JSON dictionary
    #[arg(long, default_value = dictionary::DEFAULT_URL)]
    dictionary_url: Box<str>,

    /// Tab-separated word frequency list
    ///
    /// Each line should start with a frequency and a word, in this order. Lines
    /// are expected to be sorted by decreasing frequency: the position of a
    /// word in the file is used as its frequency rank.
    #[arg(short, long, default_value = "cb4960_novel_word_freq.txt")]
    frequencies: PathBuf,

    /// Directory containing the jlpt-n1.csv ... jlpt-n5.csv level lists
    #[arg(short, long, default_value = ".")]
    levels_dir: PathBuf,

    /// Where the histogram should be saved, as an SVG image
    ///
    /// Defaults to jlpt_histogram.svg inside of the build directory.
    #[arg(short, long, default_value = None)]
    output: Option<PathBuf>,

    /// Number of histogram bins (at most 1000000)
    ///
    /// Bins cover the range of frequency ranks actually observed at each level,
    /// so levels with a wider spread of ranks get wider bins.
    #[arg(short, long, default_value = "3000")]
    bins: NonZeroUsize,

    /// Highest frequency rank displayed on the plot
    #[arg(short, long, default_value = "20000")]
    max_rank: NonZeroUsize,

    /// Which occurrence of a word is kept when the frequency list contains it
    /// several times
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Last)]
    duplicate_words: DuplicatePolicy,
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        Self::parse().check()
    }

    /// Check CLI arguments for basic sanity
    fn check(self) -> Result<Self> {
        anyhow::ensure!(
            self.bins.get() <= MAX_BINS,
            "requested {} histogram bins, but at most {MAX_BINS} are supported",
            self.bins
        );
        if let Some(output) = &self.output {
            anyhow::ensure!(
                output.extension().is_some_and(|ext| ext == "svg"),
                "the histogram can only be saved as an SVG image, but {} does not have an .svg extension",
                output.display()
            );
        }
        Ok(self)
    }

    /// Histogram output path
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.build_dir.join("jlpt_histogram.svg"))
    }
}
//
#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments
    let args = Args::parse_and_check()?;
    let config = Config::new(args);

    // Set up progress reporting
    let report = ProgressReport::new();
    let stages = report.add(
        "Processing",
        ProgressConfig::new(Work::Steps(4)).dont_show_rate_eta(),
    );

    // Make sure the dictionary is available, then load it
    stages.set_message("loading JMdict");
    let client = reqwest::Client::new();
    let dictionary =
        dictionary::load(&config.build_dir, &config.dictionary_url, &client, &report).await?;
    stages.make_progress(1);

    // Look up the vocabulary of each JLPT level in the dictionary
    stages.set_message("reading JLPT level lists");
    let level_lists = jlpt::load(&dictionary, &config.levels_dir).await?;
    stages.make_progress(1);

    // Load the corpus word frequencies
    stages.set_message("reading word frequencies");
    let frequencies = frequency::load(&config.frequencies, config.duplicate_words).await?;
    stages.make_progress(1);

    // Match level vocabulary against the frequency list and plot the result
    stages.set_message("plotting JLPT histograms");
    let level_ranks = density::level_ranks(&level_lists, &frequencies);
    let summaries = density::summarize(&level_lists, &level_ranks);
    let plot_config = config.clone();
    tokio::task::spawn_blocking(move || {
        plot::render(&plot_config.output, &level_ranks, &plot_config.histogram)
    })
    .await
    .context("waiting for the histogram to be drawn")??;
    stages.make_progress(1);

    // Display a textual summary of the results
    write_summary(tokio::io::stdout(), &summaries, &config.output)
        .await
        .context("displaying the summary")
}

/// Write the per-level matching results and the histogram location
async fn write_summary(
    output: impl AsyncWrite + Unpin,
    summaries: &[LevelSummary],
    histogram_path: &Path,
) -> Result<()> {
    let mut output = BufWriter::new(output);
    for summary in summaries {
        output.write_all(format!("{summary}\n").as_bytes()).await?;
    }
    output
        .write_all(format!("Histogram saved to {}\n", histogram_path.display()).as_bytes())
        .await?;
    output.flush().await?;
    Ok(())
}

/// Upper bound on the number of histogram bins
///
/// Every level's histogram allocates one counter per bin.
pub const MAX_BINS: usize = 1_000_000;

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// JMdict entry identifier
pub type EntryId = u64;

/// Position of a word in the frequency list, 0 being the most frequent word
pub type Rank = usize;

/// Written form of a word, as found in the dictionary or frequency list
pub type Word = Box<str>;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
