//! JLPT vocabulary lists

use crate::{
    dictionary::{Dictionary, DictionaryEntry},
    EntryId, Result,
};
use anyhow::Context;
use std::{collections::BTreeMap, fmt, path::Path};
use tokio::fs;

/// JLPT proficiency level, from hardest (N1) to easiest (N5)
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum JlptLevel {
    N1,
    N2,
    N3,
    N4,
    N5,
}
//
impl JlptLevel {
    /// All levels, from hardest to easiest
    pub const ALL: [Self; 5] = [Self::N1, Self::N2, Self::N3, Self::N4, Self::N5];

    /// Numerical level, e.g. 5 for N5
    pub fn number(self) -> u8 {
        match self {
            Self::N1 => 1,
            Self::N2 => 2,
            Self::N3 => 3,
            Self::N4 => 4,
            Self::N5 => 5,
        }
    }

    /// Color used to represent this level, as RGB components
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::N1 => (0xd8, 0x4c, 0x43),
            Self::N2 => (0xf6, 0x93, 0x4b),
            Self::N3 => (0xdd, 0x9f, 0x40),
            Self::N4 => (0x48, 0xa1, 0x7a),
            Self::N5 => (0x58, 0x90, 0xc5),
        }
    }

    /// Name of the file that lists the vocabulary of this level
    pub fn file_name(self) -> String {
        format!("jlpt-n{}.csv", self.number())
    }
}
//
impl fmt::Display for JlptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.number())
    }
}

/// Dictionary entries of each JLPT level, in list order
pub type LevelLists<'dict> = BTreeMap<JlptLevel, Vec<&'dict DictionaryEntry>>;

/// Load the vocabulary lists of every JLPT level from a directory
pub async fn load<'dict>(dictionary: &'dict Dictionary, dir: &Path) -> Result<LevelLists<'dict>> {
    let mut lists = LevelLists::new();
    for level in JlptLevel::ALL {
        let path = dir.join(level.file_name());
        let context = || format!("reading {level} vocabulary from {}", path.display());
        let list = fs::read_to_string(&path).await.with_context(context)?;
        let entries = resolve(dictionary, &list).with_context(context)?;
        log::info!("Found {} JMdict entries for level {level}", entries.len());
        lists.insert(level, entries);
    }
    Ok(lists)
}

/// Look up the entries of a vocabulary list in the dictionary
///
/// The list contains one JMdict identifier per line. Lines containing a `#`
/// are comments or headers, and are ignored along with blank lines.
/// Identifiers that are not in the dictionary are skipped with a warning.
pub fn resolve<'dict>(
    dictionary: &'dict Dictionary,
    list: &str,
) -> Result<Vec<&'dict DictionaryEntry>> {
    let mut entries = Vec::new();
    for (line_idx, line) in list.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.contains('#') {
            continue;
        }
        let id = line.parse::<EntryId>().with_context(|| {
            format!("line {} is not a JMdict identifier: {line:?}", line_idx + 1)
        })?;
        match dictionary.get(&id) {
            Some(entry) => entries.push(entry),
            None => log::warn!("{id} missing from JMdict; skipping"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::SurfaceForm;
    use tempfile::TempDir;

    fn entry(id: EntryId, kanji: &str) -> DictionaryEntry {
        DictionaryEntry {
            id,
            kanji: vec![SurfaceForm { text: kanji.into() }],
            kana: Vec::new(),
        }
    }

    fn dictionary() -> Dictionary {
        [entry(1, "一"), entry(2, "二"), entry(3, "三")]
            .into_iter()
            .map(|entry| (entry.id, entry))
            .collect()
    }

    #[test]
    fn level_metadata() {
        assert_eq!(JlptLevel::N3.to_string(), "N3");
        assert_eq!(JlptLevel::N5.file_name(), "jlpt-n5.csv");
        assert_eq!(JlptLevel::N1.rgb(), (0xd8, 0x4c, 0x43));
        assert!(JlptLevel::ALL.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn resolve_keeps_list_order_and_skips_comments() {
        let dictionary = dictionary();
        let entries = resolve(&dictionary, "# JMdict ID\n3\n\n 1 \n# trailing\n").unwrap();
        let ids = entries.iter().map(|entry| entry.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn resolve_skips_unknown_ids() {
        let dictionary = dictionary();
        let entries = resolve(&dictionary, "2\n42\n3\n").unwrap();
        let ids = entries.iter().map(|entry| entry.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn resolve_rejects_garbage() {
        let dictionary = dictionary();
        let error = resolve(&dictionary, "1\nnot an id\n").unwrap_err();
        assert!(error.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn load_reads_every_level() {
        let dir = TempDir::new().unwrap();
        for level in JlptLevel::ALL {
            let list = format!("# {level}\n{}\n99\n", level.number().min(3));
            std::fs::write(dir.path().join(level.file_name()), list).unwrap();
        }

        let dictionary = dictionary();
        let lists = load(&dictionary, dir.path()).await.unwrap();
        assert_eq!(lists.keys().copied().collect::<Vec<_>>(), JlptLevel::ALL);
        assert_eq!(lists[&JlptLevel::N2][0].id, 2);
        assert_eq!(lists[&JlptLevel::N5][0].id, 3);
        assert!(lists.values().all(|entries| entries.len() == 1));
    }

    #[tokio::test]
    async fn load_fails_on_missing_list() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("jlpt-n1.csv"), "1\n").unwrap();
        let dictionary = dictionary();
        assert!(load(&dictionary, dir.path()).await.is_err());
    }
}
