use dirs::home_dir;
use std::fmt::Display;
use std::path::PathBuf;
use unicode_normalization::UnicodeNormalization;

use crate::MgdlError;

type Result<T> = std::result::Result<T, MgdlError>;

/// Strip diacritics through compatibility decomposition and drop whatever
/// is still not ASCII afterwards.
pub fn asciify(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}

/// Replace path separators so a title stays a single path component.
pub fn path_safe(s: &str) -> String {
    s.replace(['/', '\\'], "-")
}

/// Format a volume, chapter or page number as a sortable token.
///
/// Integers are padded to two digits. Anything else is returned untouched,
/// except three-character values (`"1.5"`) which get a single leading zero
/// so they sort next to their two-digit neighbours. Directory names depend
/// on this exact output.
pub fn zero_pad(value: impl Display) -> String {
    let raw = value.to_string();

    match raw.trim().parse::<i128>() {
        Ok(number) => format!("{:02}", number),
        Err(_) if raw.chars().count() == 3 => format!("0{}", raw),
        Err(_) => raw,
    }
}

pub fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home_dir() {
            return Ok(home.join(stripped));
        } else {
            return Err(MgdlError::Config(
                "Could not determine home directory".to_string(),
            ));
        }
    }

    Ok(path)
}
