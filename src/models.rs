use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::utils::{asciify, path_safe, zero_pad};

static PAGE_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\w+)").expect("page filename pattern is valid")
});

const NO_VOLUME_LABEL: &str = "01";
const NO_TITLE: &str = "No title available for this chapter.";

/// Remote fields that show up as strings, numbers or `null` depending on
/// the entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Str(String),
    Int(i64),
    Float(f64),
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Str(s)) => Some(s),
        Some(Loose::Int(n)) => Some(n.to_string()),
        Some(Loose::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

/// Returns the value when it is present and not blank.
fn declared(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize, Debug, Clone)]
pub struct MangaDetails {
    pub title: String,
}

/// One entry of the chapter listing embedded in the manga metadata.
#[derive(Deserialize, Debug, Clone)]
pub struct ChapterEntry {
    #[serde(skip)]
    pub id: String,
    pub lang_code: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub chapter: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub title: Option<String>,
}

impl ChapterEntry {
    pub fn declared_volume(&self) -> Option<&str> {
        declared(&self.volume)
    }

    /// Volume as an integer; blank or non-integer volumes yield `None`.
    pub fn volume_number(&self) -> Option<i64> {
        self.declared_volume()?.trim().parse().ok()
    }

    /// Label of the `Volume <NN>` folder this chapter will be written to.
    pub fn volume_label(&self) -> String {
        volume_label(&self.volume)
    }
}

#[derive(Debug, Clone)]
pub struct MangaInfo {
    pub id: u64,
    pub title: String,
    /// Listing in the order the service returned it.
    pub chapters: Vec<ChapterEntry>,
}

impl MangaInfo {
    /// ASCII title, usable as a folder or archive name.
    pub fn ascii_title(&self) -> String {
        path_safe(&asciify(&self.title))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChapterInfo {
    pub hash: String,
    pub server: String,
    pub page_array: Vec<String>,
    pub manga_id: u64,
    #[serde(default, deserialize_with = "loose_string")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub chapter: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub title: Option<String>,
}

impl ChapterInfo {
    pub fn volume_label(&self) -> String {
        volume_label(&self.volume)
    }

    pub fn chapter_label(&self) -> String {
        zero_pad(self.chapter.as_deref().unwrap_or_default())
    }

    pub fn ascii_title(&self) -> Option<String> {
        declared(&self.title).map(|title| path_safe(&asciify(title)))
    }

    pub fn display_title(&self) -> String {
        self.ascii_title()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string())
    }

    /// `<server>/<hash>/<filename>`; `server` must already be absolute.
    pub fn page_url(&self, server: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            server.trim_end_matches('/'),
            self.hash.trim_matches('/'),
            filename
        )
    }
}

fn volume_label(volume: &Option<String>) -> String {
    match declared(volume) {
        Some(v) => zero_pad(v),
        None => NO_VOLUME_LABEL.to_string(),
    }
}

/// A page reference from a chapter's `page_array`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub filename: String,
    pub number: String,
    pub extension: String,
}

impl Page {
    /// Pulls the first `<digits>.<extension>` run out of the filename.
    pub fn parse(filename: &str) -> Option<Self> {
        let caps = PAGE_FILENAME.captures(filename)?;
        Some(Self {
            filename: filename.to_string(),
            number: caps[1].to_string(),
            extension: caps[2].to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        format!("x{}.{}", zero_pad(&self.number), self.extension)
    }
}

/// Where a chapter's pages live, relative to the download root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub manga_title: String,
    pub volume_label: String,
    pub chapter_label: String,
}

impl DownloadTarget {
    pub fn volume_dir(manga_title: &str, volume_label: &str) -> PathBuf {
        Path::new(manga_title).join(format!("Volume {}", volume_label))
    }

    pub fn relative_path(&self) -> PathBuf {
        Self::volume_dir(&self.manga_title, &self.volume_label)
            .join(format!("Chapter {}", self.chapter_label))
    }
}

impl fmt::Display for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_path().display())
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub name: String,
    pub source: PathBuf,
}

impl ArchiveRequest {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPage {
    pub filename: String,
    pub chapter_label: String,
}

#[derive(Debug, Clone)]
pub struct ChapterDownload {
    pub chapter_id: String,
    pub target: DownloadTarget,
    /// Directory holding the pages, under the download root.
    pub path: PathBuf,
    pub title: Option<String>,
    pub pages_written: usize,
    pub skipped: Vec<SkippedPage>,
}

#[derive(Debug, Default)]
pub struct DownloadReport {
    pub chapters: Vec<ChapterDownload>,
    pub archives: Vec<PathBuf>,
}

impl DownloadReport {
    pub fn skipped_pages(&self) -> usize {
        self.chapters.iter().map(|c| c.skipped.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter_info(volume: Option<&str>, chapter: Option<&str>, title: Option<&str>) -> ChapterInfo {
        ChapterInfo {
            hash: "abc".to_string(),
            server: "https://s1.example.org/data/".to_string(),
            page_array: Vec::new(),
            manga_id: 1,
            volume: volume.map(str::to_string),
            chapter: chapter.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn page_parse_plain() {
        let page = Page::parse("x1.png").unwrap();
        assert_eq!(page.number, "1");
        assert_eq!(page.extension, "png");
        assert_eq!(page.file_name(), "x01.png");
    }

    #[test]
    fn page_parse_hashed_name() {
        let page = Page::parse("R12-0f3.jpg").unwrap();
        assert_eq!(page.number, "3");
        assert_eq!(page.extension, "jpg");
    }

    #[test]
    fn page_parse_wide_number() {
        let page = Page::parse("p003.jpeg").unwrap();
        assert_eq!(page.file_name(), "x03.jpeg");
    }

    #[test]
    fn page_parse_no_digits() {
        assert!(Page::parse("cover.png").is_none());
        assert!(Page::parse("12").is_none());
    }

    #[test]
    fn chapter_without_volume_defaults() {
        assert_eq!(chapter_info(None, Some("3"), None).volume_label(), "01");
        assert_eq!(chapter_info(Some(""), Some("3"), None).volume_label(), "01");
        assert_eq!(chapter_info(Some("0"), Some("3"), None).volume_label(), "00");
    }

    #[test]
    fn chapter_title_fallback() {
        assert_eq!(
            chapter_info(None, None, Some("")).display_title(),
            "No title available for this chapter."
        );
        assert_eq!(chapter_info(None, None, Some("Café")).display_title(), "Cafe");
    }

    #[test]
    fn titles_are_single_path_components() {
        let manga = MangaInfo {
            id: 1,
            title: "Fate/Zero".to_string(),
            chapters: Vec::new(),
        };
        assert_eq!(manga.ascii_title(), "Fate-Zero");
        assert_eq!(
            chapter_info(None, None, Some("Part 1/2")).ascii_title().as_deref(),
            Some("Part 1-2")
        );
    }

    #[test]
    fn page_url_joins_slashes() {
        let info = chapter_info(None, None, None);
        assert_eq!(
            info.page_url("https://s1.example.org/data/", "x1.png"),
            "https://s1.example.org/data/abc/x1.png"
        );
        assert_eq!(
            info.page_url("https://s1.example.org/data", "x1.png"),
            "https://s1.example.org/data/abc/x1.png"
        );
    }

    #[test]
    fn download_target_layout() {
        let target = DownloadTarget {
            manga_title: "Okami".to_string(),
            volume_label: "01".to_string(),
            chapter_label: "10.5".to_string(),
        };
        assert_eq!(
            target.relative_path(),
            Path::new("Okami").join("Volume 01").join("Chapter 10.5")
        );
    }
}
