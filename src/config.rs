//! Processing pipeline configuration

use crate::{frequency::DuplicatePolicy, Args};
use std::{num::NonZeroUsize, path::Path, sync::Arc};

/// Final process configuration
///
/// This is the result of digesting [`Args`]. Please refer to [`Args`] to know
/// more about individual fields.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Config {
    pub build_dir: Box<Path>,
    pub dictionary_url: Box<str>,
    pub frequencies: Box<Path>,
    pub levels_dir: Box<Path>,

    /// Histogram output path, with the build directory default applied
    pub output: Box<Path>,

    /// Subset of the configuration that affects how histograms are drawn
    pub histogram: HistogramConfig,

    pub duplicate_words: DuplicatePolicy,
}
//
impl Config {
    /// Determine process configuration from CLI arguments
    pub(crate) fn new(args: Args) -> Arc<Self> {
        let output = args.output();
        let Args {
            build_dir,
            dictionary_url,
            frequencies,
            levels_dir,
            output: _,
            bins,
            max_rank,
            duplicate_words,
        } = args;
        Arc::new(Self {
            build_dir: build_dir.into(),
            dictionary_url,
            frequencies: frequencies.into(),
            levels_dir: levels_dir.into(),
            output: output.into(),
            histogram: HistogramConfig { bins, max_rank },
            duplicate_words,
        })
    }
}

/// Subset of the configuration that affects how histograms are drawn
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HistogramConfig {
    pub bins: NonZeroUsize,
    pub max_rank: NonZeroUsize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config_from(cli: &[&str]) -> Arc<Config> {
        let args = std::iter::once("jlpt-density").chain(cli.iter().copied());
        Config::new(Args::try_parse_from(args).unwrap().check().unwrap())
    }

    #[test]
    fn default_paths_and_settings() {
        let config = config_from(&[]);
        assert_eq!(&*config.build_dir, Path::new("build"));
        assert_eq!(&*config.dictionary_url, crate::dictionary::DEFAULT_URL);
        assert_eq!(
            &*config.frequencies,
            Path::new("cb4960_novel_word_freq.txt")
        );
        assert_eq!(&*config.levels_dir, Path::new("."));
        assert_eq!(&*config.output, Path::new("build/jlpt_histogram.svg"));
        assert_eq!(config.histogram.bins.get(), 3000);
        assert_eq!(config.histogram.max_rank.get(), 20_000);
        assert_eq!(config.duplicate_words, DuplicatePolicy::Last);
    }

    #[test]
    fn output_follows_build_dir() {
        let config = config_from(&["--build-dir", "cache"]);
        assert_eq!(&*config.output, Path::new("cache/jlpt_histogram.svg"));

        let config = config_from(&["--build-dir", "cache", "-o", "plot.svg"]);
        assert_eq!(&*config.output, Path::new("plot.svg"));
    }

    #[test]
    fn histogram_and_duplicate_settings() {
        let config = config_from(&["-b", "10", "-m", "500", "--duplicate-words", "first"]);
        assert_eq!(config.histogram.bins.get(), 10);
        assert_eq!(config.histogram.max_rank.get(), 500);
        assert_eq!(config.duplicate_words, DuplicatePolicy::First);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Args::try_parse_from(["jlpt-density", "--bins", "0"]).is_err());
        let args = Args::try_parse_from(["jlpt-density", "-o", "plot.png"]).unwrap();
        assert!(args.check().is_err());
    }

    #[test]
    fn bin_count_is_capped() {
        let at_cap = crate::MAX_BINS.to_string();
        let args = Args::try_parse_from(["jlpt-density", "-b", &at_cap]).unwrap();
        assert!(args.check().is_ok());

        let over_cap = (crate::MAX_BINS + 1).to_string();
        let args = Args::try_parse_from(["jlpt-density", "-b", &over_cap]).unwrap();
        let error = args.check().unwrap_err();
        assert!(error.to_string().contains("histogram bins"));

        let huge = Args::try_parse_from(["jlpt-density", "--bins", "18446744073709551615"]);
        assert!(huge.map_or(true, |args| args.check().is_err()));
    }
}
