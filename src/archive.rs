use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    error::{MgdlError, MgdlResult},
    models::ArchiveRequest,
};

pub const ARCHIVE_EXTENSION: &str = "cbz";

/// Packs download folders into `.cbz` files inside `dest_folder`.
pub struct Archiver {
    dest_folder: PathBuf,
    overwrite: bool,
}

impl Archiver {
    pub fn new(dest_folder: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            dest_folder: dest_folder.into(),
            overwrite,
        }
    }

    /// Zip everything under `request.source` and leave it as
    /// `<dest_folder>/<name>.cbz`. The intermediate `.zip` never survives.
    pub fn archive(&self, request: &ArchiveRequest) -> MgdlResult<PathBuf> {
        let source = &request.source;
        if !source.is_dir() {
            return Err(MgdlError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", source.display()),
            )));
        }

        // Names may contain dots ("Chapter 10.5"), so extensions are appended
        // rather than set.
        let zip_path = self.dest_folder.join(format!("{}.zip", request.name));
        let cbz_path = self
            .dest_folder
            .join(format!("{}.{}", request.name, ARCHIVE_EXTENSION));

        if cbz_path.exists() && !self.overwrite {
            return Err(MgdlError::Archive(format!(
                "{} already exists and overwriting is disabled",
                cbz_path.display()
            )));
        }

        fs::create_dir_all(&self.dest_folder)?;

        let stored = write_zip(source, &zip_path).and_then(|files| match files {
            0 => Err(MgdlError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} contains no files", source.display()),
            ))),
            _ => Ok(()),
        });
        if let Err(err) = stored {
            let _ = fs::remove_file(&zip_path);
            return Err(err);
        }

        if cbz_path.exists() {
            fs::remove_file(&cbz_path)?;
        }
        fs::rename(&zip_path, &cbz_path)?;

        Ok(cbz_path)
    }
}

/// Writes `source`'s tree into `zip_path` with entry names relative to
/// `source`. Returns the number of files stored.
fn write_zip(source: &Path, zip_path: &Path) -> MgdlResult<usize> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut files = 0;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|err| MgdlError::Archive(err.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut input = File::open(entry.path())?;
            io::copy(&mut input, &mut zip)?;
            files += 1;
        }
    }

    zip.finish()?;
    Ok(files)
}
