pub mod http;

pub use http::{Fetch, HttpClient};

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{error::Category, Map, Value};
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    error::{MgdlError, MgdlResult},
    models::{ChapterEntry, ChapterInfo, MangaDetails, MangaInfo},
};

pub const DEFAULT_BASE_URL: &str = "https://mangadex.org";

#[derive(Deserialize)]
struct MangaResponse {
    manga: MangaDetails,
    chapter: Map<String, Value>,
}

/// Client for the `/api` metadata endpoints.
///
/// Manga metadata is memoised per id for the lifetime of the client; the
/// cache lock is held across the request so each id is fetched at most once
/// even when the client is shared.
pub struct ApiClient<F: Fetch> {
    fetch: F,
    base_url: String,
    manga_cache: Mutex<HashMap<u64, Arc<MangaInfo>>>,
}

impl<F: Fetch> ApiClient<F> {
    pub fn new(fetch: F, base_url: &str) -> Self {
        Self {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
            manga_cache: Mutex::new(HashMap::new()),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn fetch_manga(&self, manga_id: u64) -> MgdlResult<Arc<MangaInfo>> {
        let mut cache = self
            .manga_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(manga) = cache.get(&manga_id) {
            return Ok(Arc::clone(manga));
        }

        let id = manga_id.to_string();
        let body = self
            .fetch
            .get(&self.api_url(), &[("type", "manga"), ("id", id.as_str())])?;
        let response: MangaResponse = decode(&body, &format!("manga {}", manga_id))?;

        let chapters = response
            .chapter
            .into_iter()
            .map(|(chapter_id, details)| {
                let mut entry: ChapterEntry = serde_json::from_value(details).map_err(|err| {
                    MgdlError::Data(format!("chapter {} of manga {}: {}", chapter_id, manga_id, err))
                })?;
                entry.id = chapter_id;
                Ok(entry)
            })
            .collect::<MgdlResult<Vec<_>>>()?;

        let manga = Arc::new(MangaInfo {
            id: manga_id,
            title: response.manga.title,
            chapters,
        });
        cache.insert(manga_id, Arc::clone(&manga));

        Ok(manga)
    }

    pub fn fetch_chapter(&self, chapter_id: &str) -> MgdlResult<ChapterInfo> {
        let body = self.fetch.get(
            &self.api_url(),
            &[("server", "null"), ("type", "chapter"), ("id", chapter_id)],
        )?;

        decode(&body, &format!("chapter {}", chapter_id))
    }

    /// Image server for a chapter; relative servers hang off the API host.
    pub fn image_server(&self, chapter: &ChapterInfo) -> String {
        if chapter.server.starts_with('/') {
            format!("{}{}", self.base_url, chapter.server)
        } else {
            chapter.server.clone()
        }
    }

    pub fn page_url(&self, chapter: &ChapterInfo, filename: &str) -> String {
        chapter.page_url(&self.image_server(chapter), filename)
    }

    pub fn open_page(&self, url: &str) -> MgdlResult<Box<dyn Read>> {
        self.fetch.open(url)
    }
}

/// Unparseable bodies are remote failures; well-formed JSON with missing or
/// mistyped fields is a data failure.
fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> MgdlResult<T> {
    serde_json::from_slice(body).map_err(|err| match err.classify() {
        Category::Data => MgdlError::Data(format!("{}: {}", what, err)),
        _ => MgdlError::Remote(format!("{} is not valid JSON: {}", what, err)),
    })
}
