//! JMdict acquisition and parsing
//!
//! The dictionary is distributed by the jmdict-simplified project as a zipped
//! JSON file. It is downloaded once into the build directory and extracted
//! there, then later runs reuse the extracted file without touching the
//! network.

use crate::{
    progress::{ProgressConfig, ProgressReport, Work},
    EntryId, Result, Word,
};
use anyhow::Context;
use futures::stream::StreamExt;
use reqwest::Response;
use serde::{de, Deserialize, Deserializer};
use std::{
    collections::HashMap,
    ffi::OsString,
    fs::File,
    io::{self, BufReader, ErrorKind, Read},
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tokio_util::io::StreamReader;

/// Default location of the zipped English JMdict
pub const DEFAULT_URL: &str =
    "https://github.com/scriptin/jmdict-simplified/releases/download/2.0.0/jmdict_eng.json.zip";

/// Name of the downloaded archive inside of the build directory
const ARCHIVE_NAME: &str = "jmdict_eng.json.zip";

/// Name of the extracted dictionary inside of the build directory
const JSON_NAME: &str = "jmdict_eng.json";

/// JMdict entries, keyed by identifier
pub type Dictionary = HashMap<EntryId, DictionaryEntry>;

/// Dictionary entry
///
/// Only the parts of the jmdict-simplified schema that we need are decoded,
/// everything else (senses, tags...) is ignored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct DictionaryEntry {
    /// Unique JMdict identifier
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntryId,

    /// Spellings of this word that use kanji
    #[serde(default)]
    pub kanji: Vec<SurfaceForm>,

    /// Phonetic spellings of this word
    #[serde(default)]
    pub kana: Vec<SurfaceForm>,
}
//
impl DictionaryEntry {
    /// Every way this word can be written, kanji spellings first
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> + '_ {
        (self.kanji.iter())
            .chain(&self.kana)
            .map(|form| &*form.text)
    }
}

/// One way of writing a dictionary entry
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SurfaceForm {
    /// Written form
    pub text: Word,
}

/// Top-level structure of the jmdict-simplified JSON file
#[derive(Debug, Deserialize)]
struct DictionaryFile {
    words: Vec<DictionaryEntry>,
}

/// Make sure the dictionary is available in the build directory, then load it
pub async fn load(
    build_dir: &Path,
    url: &str,
    client: &reqwest::Client,
    report: &ProgressReport,
) -> Result<Dictionary> {
    let json_path = ensure_extracted(build_dir, url, client, report).await?;
    let dictionary = tokio::task::spawn_blocking(move || parse_file(&json_path))
        .await
        .context("waiting for the dictionary to be parsed")??;
    log::info!("Loaded {} JMdict entries", dictionary.len());
    Ok(dictionary)
}

/// Make sure that an extracted copy of the dictionary exists in the build
/// directory and return its location
///
/// The archive is only downloaded if neither the extracted dictionary nor a
/// previously downloaded archive is present.
pub async fn ensure_extracted(
    build_dir: &Path,
    url: &str,
    client: &reqwest::Client,
    report: &ProgressReport,
) -> Result<PathBuf> {
    let json_path = build_dir.join(JSON_NAME);
    if fs::try_exists(&json_path)
        .await
        .with_context(|| format!("checking for {}", json_path.display()))?
    {
        log::debug!("Reusing extracted dictionary at {}", json_path.display());
        return Ok(json_path);
    }
    fs::create_dir_all(build_dir)
        .await
        .with_context(|| format!("creating build directory {}", build_dir.display()))?;

    // Download the archive, unless a previous run already did
    let archive_path = build_dir.join(ARCHIVE_NAME);
    if fs::try_exists(&archive_path)
        .await
        .with_context(|| format!("checking for {}", archive_path.display()))?
    {
        log::info!("Reusing downloaded archive at {}", archive_path.display());
    } else {
        download(client, url, &archive_path, report).await?;
    }

    // Extract it
    let destination = build_dir.to_owned();
    tokio::task::spawn_blocking(move || extract(&archive_path, &destination))
        .await
        .context("waiting for the dictionary archive to be extracted")??;
    anyhow::ensure!(
        fs::try_exists(&json_path).await?,
        "dictionary archive from {url} does not contain {JSON_NAME}"
    );
    Ok(json_path)
}

/// Download a file
///
/// The data is first written to a temporary file next to the destination,
/// which is renamed once the download is complete. This way, an interrupted
/// download is never mistaken for a complete one.
async fn download(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    report: &ProgressReport,
) -> Result<()> {
    // Start the download
    let context = || format!("initiating download of {url}");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(Response::error_for_status)
        .with_context(context)?;
    log::info!("Downloading {url} into {}", path.display());

    // Track download progress if the download size is known
    let bytes = response
        .content_length()
        .map(|len| report.add("Downloading JMdict", ProgressConfig::new(Work::Bytes(len))));
    let mut body = StreamReader::new(response.bytes_stream().map(move |res| {
        res
            // Track how many bytes have been downloaded so far
            .inspect(|bytes_block| {
                if let Some(bytes) = &bytes {
                    bytes.make_progress(bytes_block.len() as u64);
                }
            })
            // Translate reqwest errors into I/O errors
            .map_err(|e| io::Error::new(ErrorKind::Other, Box::new(e)))
    }));

    // Save the data to disk
    let partial_path = partial_path(path);
    let context = || format!("downloading {url} into {}", partial_path.display());
    let mut file = fs::File::create(&partial_path)
        .await
        .with_context(context)?;
    tokio::io::copy(&mut body, &mut file)
        .await
        .with_context(context)?;
    file.flush().await.with_context(context)?;
    fs::rename(&partial_path, path)
        .await
        .with_context(|| format!("moving finished download to {}", path.display()))
}

/// Extract every file from a zip archive into a directory
fn extract(archive_path: &Path, destination: &Path) -> Result<()> {
    let context = || format!("opening archive {}", archive_path.display());
    let archive = File::open(archive_path).with_context(context)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(archive)).with_context(context)?;
    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .with_context(|| format!("reading member #{index} of {}", archive_path.display()))?;
        let Some(relative_path) = member.enclosed_name() else {
            anyhow::bail!(
                "archive member {:?} would be extracted outside of {}",
                member.name(),
                destination.display()
            );
        };
        let target = destination.join(relative_path);
        if member.is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("creating directory {}", target.display()))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }

        // Same partial file logic as downloads
        let partial_target = partial_path(&target);
        let context = || format!("extracting {}", target.display());
        let mut output = File::create(&partial_target).with_context(context)?;
        io::copy(&mut member, &mut output).with_context(context)?;
        std::fs::rename(&partial_target, &target).with_context(context)?;
        log::debug!("Extracted {}", target.display());
    }
    Ok(())
}

/// Temporary location of a file that is being written
fn partial_path(path: &Path) -> PathBuf {
    let mut partial = OsString::from(path.as_os_str());
    partial.push(".part");
    partial.into()
}

/// Parse the extracted dictionary file
pub fn parse_file(path: &Path) -> Result<Dictionary> {
    let context = || format!("parsing dictionary {}", path.display());
    let file = File::open(path).with_context(context)?;
    parse(BufReader::new(file)).with_context(context)
}

/// Parse jmdict-simplified JSON data
///
/// If several entries share an identifier, the last one is kept.
pub fn parse(reader: impl Read) -> Result<Dictionary> {
    let DictionaryFile { words } = serde_json::from_reader(reader)?;
    Ok(words.into_iter().map(|entry| (entry.id, entry)).collect())
}

/// Decode an entry identifier
///
/// Depending on the jmdict-simplified release, identifiers are either stored
/// as JSON numbers or as strings of digits.
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntryId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(EntryId),
        Text(Box<str>),
    }
    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid JMdict entry identifier {text:?}"))),
    }
}
