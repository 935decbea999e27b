use std::cmp::Ordering;

use crate::{
    error::{MgdlError, MgdlResult},
    models::ChapterEntry,
};

/// Chapters in `lang_code`, in listing order.
pub fn by_language<'a>(chapters: &'a [ChapterEntry], lang_code: &str) -> Vec<&'a ChapterEntry> {
    chapters
        .iter()
        .filter(|chapter| chapter.lang_code == lang_code)
        .collect()
}

/// Chapters in `lang_code` whose declared volume is exactly `volume`.
/// Chapters without a volume never match.
pub fn by_volume<'a>(
    chapters: &'a [ChapterEntry],
    lang_code: &str,
    volume: i64,
) -> Vec<&'a ChapterEntry> {
    by_language(chapters, lang_code)
        .into_iter()
        .filter(|chapter| chapter.volume_number() == Some(volume))
        .collect()
}

/// Chapters in `lang_code` that end up in the `Volume <label>` folder,
/// including the ones without a volume when `label` is the default.
pub fn by_volume_label<'a>(
    chapters: &'a [ChapterEntry],
    lang_code: &str,
    label: &str,
) -> Vec<&'a ChapterEntry> {
    by_language(chapters, lang_code)
        .into_iter()
        .filter(|chapter| chapter.volume_label() == label)
        .collect()
}

/// Distinct volume folder labels for `lang_code`, ascending by value.
pub fn volume_labels(chapters: &[ChapterEntry], lang_code: &str) -> Vec<String> {
    let mut labels: Vec<String> = by_language(chapters, lang_code)
        .into_iter()
        .map(ChapterEntry::volume_label)
        .collect();

    labels.sort_by(|a, b| compare_labels(a, b));
    labels.dedup();
    labels
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// First chapter in `lang_code` whose number equals `number`.
///
/// Integer chapter numbers are compared numerically (`"03"` finds `"3"`);
/// anything else, like `"10.5"`, must match the requested text exactly.
pub fn find_by_number<'a>(
    chapters: &'a [ChapterEntry],
    lang_code: &str,
    number: &str,
) -> MgdlResult<&'a ChapterEntry> {
    let requested = number.trim();

    by_language(chapters, lang_code)
        .into_iter()
        .find(|chapter| {
            let Some(value) = chapter.chapter.as_deref() else {
                return false;
            };
            match value.trim().parse::<i64>() {
                Ok(n) => requested.parse::<i64>() == Ok(n),
                Err(_) => value == requested,
            }
        })
        .ok_or_else(|| {
            MgdlError::NotFound(format!(
                "Unable to find the chapter {} in language '{}'",
                number, lang_code
            ))
        })
}
