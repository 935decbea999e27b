use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logger::LogMode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Numeric id of the manga on the service
    manga_id: u64,

    /// Language code of the chapters to download
    #[arg(short, long)]
    lang: Option<String>,

    /// Folder the chapter images are written to
    #[arg(long)]
    dl_folder: Option<PathBuf>,

    /// Folder the .cbz archives are written to
    #[arg(long)]
    dest_folder: Option<PathBuf>,

    #[arg(long)]
    base_url: Option<String>,

    /// Package the download into .cbz archives
    #[arg(long, overrides_with = "no_cbz")]
    cbz: bool,

    #[arg(long, overrides_with = "cbz")]
    no_cbz: bool,

    /// Fail instead of replacing an existing archive
    #[arg(long)]
    no_overwrite: bool,

    #[arg(long, value_enum)]
    log_mode: Option<LogMode>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Download every volume (the default)
    All,
    /// Download a single volume
    Volume { number: i64 },
    /// Download a single chapter, e.g. `12` or `10.5`
    Chapter { number: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Command {
    #[default]
    All,
    Volume(i64),
    Chapter(String),
}

impl Command {
    /// Whole volumes are archived unless asked otherwise, single chapters
    /// are not.
    pub fn default_cbz(&self) -> bool {
        !matches!(self, Command::Chapter(_))
    }
}

#[derive(Debug, Default)]
pub struct Args {
    pub manga_id: u64,
    pub lang: Option<String>,
    pub dl_folder: Option<PathBuf>,
    pub dest_folder: Option<PathBuf>,
    pub base_url: Option<String>,
    pub cbz: Option<bool>,
    pub overwrite: Option<bool>,
    pub log_mode: Option<LogMode>,
    pub command: Command,
}

impl Args {
    pub fn cbz(&self) -> bool {
        self.cbz.unwrap_or_else(|| self.command.default_cbz())
    }
}

pub fn parse() -> Args {
    from_cli(CliArgs::parse())
}

pub fn try_parse_from<I, T>(itr: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(itr).map(from_cli)
}

fn from_cli(cli: CliArgs) -> Args {
    let cbz = match (cli.cbz, cli.no_cbz) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let command = match cli.command {
        None | Some(CliCommand::All) => Command::All,
        Some(CliCommand::Volume { number }) => Command::Volume(number),
        Some(CliCommand::Chapter { number }) => Command::Chapter(number),
    };

    Args {
        manga_id: cli.manga_id,
        lang: cli.lang,
        dl_folder: cli.dl_folder,
        dest_folder: cli.dest_folder,
        base_url: cli.base_url,
        cbz,
        overwrite: cli.no_overwrite.then_some(false),
        log_mode: cli.log_mode,
        command,
    }
}
