use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    api::{ApiClient, Fetch},
    archive::Archiver,
    cli::Command,
    config::MgdlConfig,
    error::{MgdlError, MgdlResult},
    filter,
    logger::{Logger, MaybeBar},
    models::{
        ArchiveRequest, ChapterDownload, ChapterEntry, ChapterInfo, DownloadReport,
        DownloadTarget, MangaInfo, Page, SkippedPage,
    },
    utils::zero_pad,
};

type Result<T> = MgdlResult<T>;

/// Downloads one manga: chapter pages into
/// `<dl_folder>/<Title>/Volume <NN>/Chapter <NN>/` and, on request, the
/// finished chapters or volumes into `.cbz` archives.
pub struct Downloader<F: Fetch> {
    api: ApiClient<F>,
    archiver: Archiver,
    logger: Logger,
    manga_id: u64,
    lang_code: String,
    dl_folder: PathBuf,
}

impl<F: Fetch> Downloader<F> {
    pub fn new(api: ApiClient<F>, manga_id: u64, config: &MgdlConfig, logger: Logger) -> Result<Self> {
        fs::create_dir_all(&config.dl_folder)?;
        fs::create_dir_all(&config.dest_folder)?;

        Ok(Self {
            api,
            archiver: Archiver::new(&config.dest_folder, config.overwrite),
            logger,
            manga_id,
            lang_code: config.lang_code.clone(),
            dl_folder: config.dl_folder.clone(),
        })
    }

    pub fn run(&self, command: &Command, cbz: bool) -> Result<DownloadReport> {
        let report = match command {
            Command::All => self.download_all(cbz)?,
            Command::Volume(number) => self.download_volume(*number, cbz)?,
            Command::Chapter(number) => self.download_chapter(number, cbz)?,
        };

        let skipped = report.skipped_pages();
        if skipped > 0 {
            self.logger.warn(format!(
                "{} page(s) could not be processed and were skipped",
                skipped
            ));
        }

        Ok(report)
    }

    fn manga(&self) -> Result<Arc<MangaInfo>> {
        let spinner = self
            .logger
            .add_spinner(Some(format!("Fetching manga {}", self.manga_id)))?;
        let manga = self.api.fetch_manga(self.manga_id);
        self.logger.finish_spinner(spinner);
        manga
    }

    pub fn download_all(&self, cbz: bool) -> Result<DownloadReport> {
        let manga = self.manga()?;
        let title = manga.ascii_title();
        let labels = filter::volume_labels(&manga.chapters, &self.lang_code);

        if labels.is_empty() {
            self.logger.warn(format!(
                "No chapters of {} available in language '{}'",
                title, self.lang_code
            ));
            return Ok(DownloadReport::default());
        }

        self.logger.info(format!(
            "Will download the following volumes for the manga {}: {}",
            title,
            labels.join(", ")
        ));

        let mut report = DownloadReport::default();
        for label in &labels {
            let chapters = filter::by_volume_label(&manga.chapters, &self.lang_code, label);
            self.download_volume_chapters(&title, label, &chapters, cbz, &mut report)?;
        }

        Ok(report)
    }

    pub fn download_volume(&self, volume: i64, cbz: bool) -> Result<DownloadReport> {
        let manga = self.manga()?;
        let title = manga.ascii_title();
        let chapters = filter::by_volume(&manga.chapters, &self.lang_code, volume);

        let mut report = DownloadReport::default();
        if chapters.is_empty() {
            self.logger.warn(format!(
                "Unable to find volume {} of {} in language '{}'!",
                volume, title, self.lang_code
            ));
            return Ok(report);
        }

        let label = zero_pad(volume);
        self.download_volume_chapters(&title, &label, &chapters, cbz, &mut report)?;

        Ok(report)
    }

    fn download_volume_chapters(
        &self,
        title: &str,
        label: &str,
        chapters: &[&ChapterEntry],
        cbz: bool,
        report: &mut DownloadReport,
    ) -> Result<()> {
        self.logger.info(format!(
            "Downloading Volume {} of {} ({} chapters)",
            label,
            title,
            chapters.len()
        ));

        for chapter in chapters {
            report.chapters.push(self.download_chapter_id(&chapter.id)?);
        }

        if cbz {
            let request = ArchiveRequest::new(
                format!("{} - Volume {}", title, label),
                self.dl_folder.join(DownloadTarget::volume_dir(title, label)),
            );
            report.archives.push(self.archive(&request)?);
        }

        Ok(())
    }

    /// A chapter number that does not exist is reported and yields an empty
    /// report rather than an error.
    pub fn download_chapter(&self, number: &str, cbz: bool) -> Result<DownloadReport> {
        let manga = self.manga()?;

        let entry = match filter::find_by_number(&manga.chapters, &self.lang_code, number) {
            Ok(entry) => entry,
            Err(MgdlError::NotFound(msg)) => {
                self.logger.warn(format!("{}!", msg));
                return Ok(DownloadReport::default());
            }
            Err(err) => return Err(err),
        };

        let mut report = DownloadReport::default();
        let download = self.download_chapter_id(&entry.id)?;

        if cbz {
            let target = &download.target;
            let name = match download.title.as_deref().filter(|t| !t.is_empty()) {
                Some(chapter_title) => format!(
                    "{} - Chapter {} - {}",
                    target.manga_title, target.chapter_label, chapter_title
                ),
                None => format!("{} - Chapter {}", target.manga_title, target.chapter_label),
            };
            let request = ArchiveRequest::new(name, download.path.clone());
            report.archives.push(self.archive(&request)?);
        }

        report.chapters.push(download);
        Ok(report)
    }

    /// Fetch one chapter's metadata and write its pages to disk.
    ///
    /// Pages whose filename has no `<digits>.<ext>` part are skipped and
    /// reported; a failed page request aborts the chapter.
    pub fn download_chapter_id(&self, chapter_id: &str) -> Result<ChapterDownload> {
        let chapter = self.api.fetch_chapter(chapter_id)?;
        let manga = self.api.fetch_manga(chapter.manga_id)?;

        let target = DownloadTarget {
            manga_title: manga.ascii_title(),
            volume_label: chapter.volume_label(),
            chapter_label: chapter.chapter_label(),
        };

        self.logger.info(format!(
            "Downloading Volume {}, Chapter {}: {}",
            target.volume_label,
            target.chapter_label,
            chapter.display_title()
        ));

        let chapter_path = self.dl_folder.join(target.relative_path());
        let bar = self.logger.add_bar(chapter.page_array.len() as u64)?;
        bar.set_prefix(format!("Chapter {}", target.chapter_label));

        let pages = self.download_pages(&chapter, &target, &chapter_path, &bar);
        self.logger.finish_bar(bar);
        let (pages_written, skipped) = pages?;

        Ok(ChapterDownload {
            chapter_id: chapter_id.to_string(),
            target,
            path: chapter_path,
            title: chapter.ascii_title(),
            pages_written,
            skipped,
        })
    }

    fn download_pages(
        &self,
        chapter: &ChapterInfo,
        target: &DownloadTarget,
        chapter_path: &Path,
        bar: &MaybeBar,
    ) -> Result<(usize, Vec<SkippedPage>)> {
        let mut written = 0;
        let mut skipped = Vec::new();

        for filename in &chapter.page_array {
            bar.inc(1);

            let Some(page) = Page::parse(filename) else {
                self.logger.warn(format!(
                    "Oops, unable to process image {} in chapter {}!",
                    filename, target.chapter_label
                ));
                skipped.push(SkippedPage {
                    filename: filename.clone(),
                    chapter_label: target.chapter_label.clone(),
                });
                continue;
            };

            let url = self.api.page_url(chapter, &page.filename);
            let mut body = self.api.open_page(&url)?;

            fs::create_dir_all(chapter_path)?;
            let mut file = File::create(chapter_path.join(page.file_name()))?;
            io::copy(&mut body, &mut file)?;
            written += 1;
        }

        Ok((written, skipped))
    }

    fn archive(&self, request: &ArchiveRequest) -> Result<PathBuf> {
        let path = self.archiver.archive(request)?;
        self.logger.success(format!(
            "Created the CBZ file: {}",
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        ));
        Ok(path)
    }
}
