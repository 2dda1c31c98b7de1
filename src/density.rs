//! Distribution of JLPT vocabulary across the frequency list

use crate::{
    dictionary::DictionaryEntry,
    frequency::FrequencyTable,
    jlpt::{JlptLevel, LevelLists},
    Rank,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    num::NonZeroUsize,
};

/// Frequency ranks that were matched at each JLPT level
pub type LevelRanks = BTreeMap<JlptLevel, BTreeSet<Rank>>;

/// Frequency rank of a dictionary entry
///
/// Kanji spellings are tried first, then kana readings, and the first surface
/// form that appears in the frequency list wins.
pub fn matched_rank(entry: &DictionaryEntry, frequencies: &FrequencyTable) -> Option<Rank> {
    let (form, data) = entry
        .surface_forms()
        .find_map(|form| frequencies.get(form).map(|data| (form, data)))?;
    log::trace!(
        "Entry {} matched as {form:?} with rank {} ({} occurrences)",
        entry.id,
        data.rank,
        data.frequency
    );
    Some(data.rank)
}

/// Set of frequency ranks matched by a group of dictionary entries
///
/// Entries that are not in the frequency list do not contribute anything, and
/// entries that match the same rank are only counted once.
pub fn matched_ranks<'entry>(
    entries: impl IntoIterator<Item = &'entry DictionaryEntry>,
    frequencies: &FrequencyTable,
) -> BTreeSet<Rank> {
    entries
        .into_iter()
        .filter_map(|entry| matched_rank(entry, frequencies))
        .collect()
}

/// Matched frequency ranks for every JLPT level
pub fn level_ranks(lists: &LevelLists<'_>, frequencies: &FrequencyTable) -> LevelRanks {
    lists
        .iter()
        .map(|(&level, entries)| {
            let ranks = matched_ranks(entries.iter().copied(), frequencies);
            log::debug!(
                "Matched {} of {} {level} entries to the frequency list",
                ranks.len(),
                entries.len()
            );
            (level, ranks)
        })
        .collect()
}

/// Summarize the matching results of every JLPT level
pub fn summarize(lists: &LevelLists<'_>, ranks: &LevelRanks) -> Vec<LevelSummary> {
    lists
        .iter()
        .map(|(&level, entries)| {
            let ranks = ranks.get(&level);
            LevelSummary {
                level,
                entries: entries.len(),
                matched: ranks.map_or(0, BTreeSet::len),
                median_rank: ranks.and_then(median),
            }
        })
        .collect()
}

/// Lower median of a set of ranks
pub fn median(ranks: &BTreeSet<Rank>) -> Option<Rank> {
    ranks.iter().nth(ranks.len().checked_sub(1)? / 2).copied()
}

/// Matching results for one JLPT level
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LevelSummary {
    pub level: JlptLevel,

    /// Number of dictionary entries in the level's vocabulary list
    pub entries: usize,

    /// Number of distinct frequency ranks matched by these entries
    pub matched: usize,

    pub median_rank: Option<Rank>,
}
//
impl fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} entries matched",
            self.level, self.matched, self.entries
        )?;
        if let Some(median) = self.median_rank {
            write!(f, ", median frequency rank {median}")?;
        }
        Ok(())
    }
}

/// Density-normalized histogram with uniform bins
///
/// Bins are half-open, except for the last one which also includes its upper
/// edge. The total area under the histogram is 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// Lower edge of the first bin
    start: f64,

    /// Width of every bin
    bin_width: f64,

    /// Density of each bin
    densities: Box<[f64]>,
}
//
impl Histogram {
    /// Bin a set of ranks over the range that they span
    ///
    /// Returns `None` if there is no data to bin. When every rank is the same,
    /// the bins span one unit around it.
    pub fn density(ranks: &BTreeSet<Rank>, bins: NonZeroUsize) -> Option<Self> {
        let (min, max) = (*ranks.first()? as f64, *ranks.last()? as f64);
        let (start, end) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let bins = bins.get();
        let bin_width = (end - start) / bins as f64;

        let mut counts = vec![0usize; bins];
        for &rank in ranks {
            let bin = ((rank as f64 - start) / bin_width) as usize;
            counts[bin.min(bins - 1)] += 1;
        }

        let normalization = ranks.len() as f64 * bin_width;
        Some(Self {
            start,
            bin_width,
            densities: counts
                .into_iter()
                .map(|count| count as f64 / normalization)
                .collect(),
        })
    }

    /// Edges of the bins, including the upper edge of the last one
    pub fn bin_edges(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.densities.len()).map(|idx| self.start + idx as f64 * self.bin_width)
    }

    /// Highest density across all bins
    pub fn max_density(&self) -> f64 {
        self.densities.iter().copied().fold(0.0, f64::max)
    }

    /// Area under the histogram
    pub fn area(&self) -> f64 {
        self.densities.iter().sum::<f64>() * self.bin_width
    }

    /// Outline of the histogram as a closed step curve, cut at some maximal x
    /// coordinate
    ///
    /// The outline starts and ends on the x axis, so it can be drawn as a
    /// filled area.
    pub fn step_outline(&self, max_x: f64) -> Vec<(f64, f64)> {
        let mut outline = Vec::with_capacity(2 * self.densities.len() + 2);
        let mut edges = self.bin_edges();
        let Some(first_edge) = edges.next() else {
            return outline;
        };
        if first_edge >= max_x {
            return outline;
        }
        outline.push((first_edge, 0.0));
        let mut lower_edge = first_edge;
        for (&density, upper_edge) in self.densities.iter().zip(edges) {
            let upper_edge = upper_edge.min(max_x);
            outline.push((lower_edge, density));
            outline.push((upper_edge, density));
            if upper_edge >= max_x {
                break;
            }
            lower_edge = upper_edge;
        }
        let last_x = outline.last().map_or(first_edge, |&(x, _)| x);
        outline.push((last_x, 0.0));
        outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dictionary::SurfaceForm,
        frequency::{self, DuplicatePolicy},
    };

    fn forms(texts: &[&str]) -> Vec<SurfaceForm> {
        texts
            .iter()
            .map(|&text| SurfaceForm { text: text.into() })
            .collect()
    }

    fn entry(kanji: &[&str], kana: &[&str]) -> DictionaryEntry {
        DictionaryEntry {
            id: 1,
            kanji: forms(kanji),
            kana: forms(kana),
        }
    }

    fn frequencies(data: &str) -> FrequencyTable {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(frequency::read(data.as_bytes(), DuplicatePolicy::Last))
            .unwrap()
    }

    fn bins(count: usize) -> NonZeroUsize {
        NonZeroUsize::new(count).unwrap()
    }

    #[test]
    fn kanji_is_tried_before_kana() {
        let table = frequencies("9\tたべる\n8\t食べる\n7\t喰べる\n");
        let taberu = entry(&["食べる", "喰べる"], &["たべる"]);
        assert_eq!(matched_rank(&taberu, &table), Some(1));

        let rare_kanji = entry(&["鵯"], &["たべる"]);
        assert_eq!(matched_rank(&rare_kanji, &table), Some(0));

        let later_kanji = entry(&["鵯", "喰べる"], &["たべる"]);
        assert_eq!(matched_rank(&later_kanji, &table), Some(2));
    }

    #[test]
    fn unmatched_entries_contribute_nothing() {
        let table = frequencies("9\tA\n8\tB\n");
        let entries = [entry(&["X"], &["Y"]), entry(&[], &["B"]), entry(&["B"], &[])];
        assert_eq!(matched_ranks(&entries, &table), BTreeSet::from([1]));
        assert!(matched_ranks(&entries[..1], &table).is_empty());
    }

    #[test]
    fn end_to_end_ranks() {
        let table = frequencies("100\tA\n50\tB\n");
        let a = entry(&["A"], &[]);
        let lists = LevelLists::from([(JlptLevel::N5, vec![&a]), (JlptLevel::N1, vec![])]);

        let ranks = level_ranks(&lists, &table);
        assert_eq!(ranks[&JlptLevel::N5], BTreeSet::from([0]));
        assert!(ranks[&JlptLevel::N1].is_empty());

        let summaries = summarize(&lists, &ranks);
        assert_eq!(
            summaries[1],
            LevelSummary {
                level: JlptLevel::N5,
                entries: 1,
                matched: 1,
                median_rank: Some(0),
            }
        );
        assert_eq!(summaries[0].to_string(), "N1: 0/0 entries matched");
        assert_eq!(
            summaries[1].to_string(),
            "N5: 1/1 entries matched, median frequency rank 0"
        );
    }

    #[test]
    fn median_of_ranks() {
        assert_eq!(median(&BTreeSet::new()), None);
        assert_eq!(median(&BTreeSet::from([7])), Some(7));
        assert_eq!(median(&BTreeSet::from([1, 5, 9])), Some(5));
        assert_eq!(median(&BTreeSet::from([1, 5, 9, 12])), Some(5));
    }

    #[test]
    fn empty_histogram() {
        assert_eq!(Histogram::density(&BTreeSet::new(), bins(10)), None);
    }

    #[test]
    fn histogram_is_density_normalized() {
        let ranks = BTreeSet::from([0, 1, 2, 3, 10]);
        let histogram = Histogram::density(&ranks, bins(5)).unwrap();
        assert_eq!(histogram.densities.len(), 5);
        assert!((histogram.area() - 1.0).abs() < 1e-9);

        // Bins of width 2: [0, 2) holds 0 and 1, [2, 4) holds 2 and 3, and the
        // last bin includes its upper edge
        let expected = [0.2, 0.2, 0.0, 0.0, 0.1];
        for (density, expected) in histogram.densities.iter().zip(expected) {
            assert!((density - expected).abs() < 1e-9, "{density} != {expected}");
        }
        let edges = histogram.bin_edges().collect::<Vec<_>>();
        assert_eq!(edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn single_rank_histogram() {
        let histogram = Histogram::density(&BTreeSet::from([42]), bins(4)).unwrap();
        assert_eq!(histogram.bin_edges().next(), Some(41.5));
        assert_eq!(&*histogram.densities, &[0.0, 0.0, 4.0, 0.0]);
        assert!((histogram.area() - 1.0).abs() < 1e-9);
        assert_eq!(histogram.max_density(), 4.0);
    }

    #[test]
    fn step_outline_is_closed_and_clipped() {
        let ranks = BTreeSet::from([0, 1, 2, 3, 10]);
        let histogram = Histogram::density(&ranks, bins(5)).unwrap();

        let outline = histogram.step_outline(100.0);
        assert_eq!(outline.first(), Some(&(0.0, 0.0)));
        assert_eq!(outline.last(), Some(&(10.0, 0.0)));
        assert_eq!(outline.len(), 2 * 5 + 2);

        let clipped = histogram.step_outline(3.0);
        assert_eq!(
            clipped,
            vec![(0.0, 0.0), (0.0, 0.2), (2.0, 0.2), (2.0, 0.2), (3.0, 0.2), (3.0, 0.0)]
        );

        assert!(histogram.step_outline(0.0).is_empty());
    }
}
