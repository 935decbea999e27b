#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mgdl::api::Fetch;
use mgdl::config::MgdlConfig;
use mgdl::logger::LogMode;
use mgdl::{MgdlError, MgdlResult};
use serde_json::{json, Value};

pub const BASE_URL: &str = "https://mangadex.test";
pub const IMAGE_SERVER: &str = "https://img.mangadex.test/data/";
pub const MANGA_ID: u64 = 51;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("common")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

pub fn manga_url(id: u64) -> String {
    format!("{}/api?type=manga&id={}", BASE_URL, id)
}

pub fn chapter_url(id: &str) -> String {
    format!("{}/api?server=null&type=chapter&id={}", BASE_URL, id)
}

pub fn page_url(hash: &str, filename: &str) -> String {
    format!("{}{}/{}", IMAGE_SERVER, hash, filename)
}

pub fn page_bytes(hash: &str, filename: &str) -> Vec<u8> {
    format!("image bytes of {}/{}", hash, filename).into_bytes()
}

/// In-memory transport keyed by full URL (query string included).
#[derive(Default)]
pub struct FakeFetch {
    responses: HashMap<String, Vec<u8>>,
    calls: RefCell<Vec<String>>,
}

impl FakeFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    pub fn with_manga_fixture(self, id: u64, fixture: &str) -> Self {
        self.with(manga_url(id), load_fixture(fixture))
    }

    /// Registers chapter metadata only; page requests will fail.
    pub fn with_chapter_meta(self, id: &str, volume: Value, chapter: &str, title: &str, pages: &[&str]) -> Self {
        let body = json!({
            "id": id.parse::<u64>().unwrap_or_default(),
            "hash": format!("h{}", id),
            "server": IMAGE_SERVER,
            "page_array": pages,
            "volume": volume,
            "chapter": chapter,
            "title": title,
            "manga_id": MANGA_ID,
            "lang_code": "gb",
            "status": "OK",
        });
        self.with(chapter_url(id), body.to_string())
    }

    /// Registers chapter metadata and every page that has a number in it.
    pub fn with_chapter(self, id: &str, volume: Value, chapter: &str, title: &str, pages: &[&str]) -> Self {
        let hash = format!("h{}", id);
        let mut fake = self.with_chapter_meta(id, volume, chapter, title, pages);
        for page in pages {
            fake = fake.with(page_url(&hash, page), page_bytes(&hash, page));
        }
        fake
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == url).count()
    }

    fn respond(&self, key: String) -> MgdlResult<Vec<u8>> {
        self.calls.borrow_mut().push(key.clone());
        self.responses
            .get(&key)
            .cloned()
            .ok_or_else(|| MgdlError::Remote(format!("404 Not Found for {}", key)))
    }
}

impl Fetch for FakeFetch {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> MgdlResult<Vec<u8>> {
        let key = if query.is_empty() {
            url.to_string()
        } else {
            let query = query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            format!("{}?{}", url, query)
        };
        self.respond(key)
    }

    fn open(&self, url: &str) -> MgdlResult<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.respond(url.to_string())?)))
    }
}

/// The manga fixture with every English chapter and its pages registered.
pub fn okami_fetch() -> FakeFetch {
    FakeFetch::new()
        .with_manga_fixture(MANGA_ID, "manga_51.json")
        .with_chapter("1001", json!("1"), "1", "Beginnings", &["x1.png", "x2.png", "x3.png"])
        .with_chapter("1002", json!("1"), "2", "", &["x1.png", "x2.png"])
        .with_chapter("1004", json!("2"), "10.5", "Interlude", &["p1.jpg"])
        .with_chapter("1005", json!(""), "11", "Loose Leaf", &["01.png", "credits.png"])
        .with_chapter("1006", json!("10"), "30", "Far Ahead", &["x1.png"])
}

pub fn test_config(root: &Path) -> MgdlConfig {
    MgdlConfig {
        base_url: BASE_URL.to_string(),
        lang_code: "gb".to_string(),
        dl_folder: root.join("dl"),
        dest_folder: root.join("cbz"),
        overwrite: true,
        log_mode: LogMode::Quiet,
        max_attempts: 1,
        timeout: Duration::from_secs(5),
    }
}

/// Sorted `relative path -> contents` listing of every file under `dir`.
pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(dir)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}
