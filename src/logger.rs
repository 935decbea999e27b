use clap::ValueEnum;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{MgdlError, MgdlResult};

#[derive(Clone, Copy, ValueEnum, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    Quiet,
    Plain,
    #[default]
    Fancy,
}

/// Status reporting for a run. Fancy mode draws indicatif bars and prints
/// status lines above them, plain mode prints prefixed lines, quiet mode
/// only lets warnings through (on stderr).
pub struct Logger {
    mode: LogMode,
    multi: Option<MultiProgress>,
}

impl Logger {
    pub fn new(mode: LogMode) -> Self {
        let multi = match mode {
            LogMode::Fancy => Some(MultiProgress::new()),
            _ => None,
        };
        Self { mode, multi }
    }

    /// Where status lines go. A hidden `MultiProgress` (output is not a
    /// terminal) swallows `println`, so those lines go to stdout directly.
    fn sink(&self) -> Sink<'_> {
        match (&self.multi, self.mode) {
            (Some(mp), _) if !mp.is_hidden() => Sink::Bars(mp),
            (_, LogMode::Quiet) => Sink::Discard,
            _ => Sink::Stdout,
        }
    }

    fn line(&self, tag: &str, msg: &str) {
        match self.sink() {
            Sink::Bars(mp) => {
                let _ = mp.println(format!("[{tag}] {msg}"));
            }
            Sink::Stdout => println!("[{tag}] {msg}"),
            Sink::Discard => {}
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.line("INFO", msg.as_ref());
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.line("SUCCESS", msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        match self.mode {
            LogMode::Quiet => eprintln!("[WARN] {}", msg.as_ref()),
            _ => self.line("WARN", msg.as_ref()),
        }
    }

    pub fn add_spinner(&self, msg: Option<String>) -> MgdlResult<MaybeSpinner> {
        let inner = match self.mode {
            LogMode::Fancy => {
                let spinner = new_spinner()?;
                let spinner = match &self.multi {
                    Some(mp) => mp.add(spinner),
                    None => spinner,
                };
                if let Some(ref msg) = msg {
                    spinner.set_message(msg.clone());
                }
                Some(spinner)
            }
            LogMode::Plain => {
                if let Some(ref msg) = msg {
                    println!("[INFO] {msg}");
                }
                None
            }
            LogMode::Quiet => None,
        };

        Ok(MaybeSpinner { inner })
    }

    pub fn finish_spinner(&self, spinner: MaybeSpinner) {
        if let Some(bar) = spinner.inner {
            if let Some(ref mp) = self.multi {
                bar.finish_and_clear();
                mp.remove(&bar);
            }
        }
    }

    pub fn add_bar(&self, size: u64) -> MgdlResult<MaybeBar> {
        let inner = match self.mode {
            LogMode::Fancy => {
                let bar = new_progress_bar(size)?;
                Some(match &self.multi {
                    Some(mp) => mp.add(bar),
                    None => bar,
                })
            }
            _ => None,
        };

        Ok(MaybeBar { inner })
    }

    pub fn finish_bar(&self, bar: MaybeBar) {
        if let Some(pb) = bar.inner {
            if let Some(ref mp) = self.multi {
                pb.finish_and_clear();
                mp.remove(&pb);
            }
        }
    }
}

enum Sink<'a> {
    Bars(&'a MultiProgress),
    Stdout,
    Discard,
}

// -- Null-object wrappers ----------------------------------------------------

pub struct MaybeSpinner {
    inner: Option<ProgressBar>,
}

pub struct MaybeBar {
    inner: Option<ProgressBar>,
}

impl MaybeBar {
    pub fn set_prefix(&self, msg: String) {
        if let Some(ref bar) = self.inner {
            bar.set_prefix(msg);
        }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(ref bar) = self.inner {
            bar.inc(delta);
        }
    }
}

// -- Progress bar / spinner constructors (private) ---------------------------

fn new_progress_bar(size: u64) -> MgdlResult<ProgressBar> {
    let bar = ProgressBar::new(size);
    let style = ProgressStyle::with_template("{prefix:>12} {elapsed_precise} {wide_bar} {pos}/{len} pages")
        .map_err(|e| MgdlError::Logger(e.to_string()))?;
    bar.set_style(style);
    Ok(bar)
}

fn new_spinner() -> MgdlResult<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .map_err(|e| MgdlError::Logger(e.to_string()))?;
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(50));
    Ok(spinner)
}
