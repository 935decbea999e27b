use mgdl::{
    api::{ApiClient, HttpClient},
    cli, config,
    downloader::Downloader,
    logger::Logger,
    MgdlResult,
};

fn run() -> MgdlResult<()> {
    let args = cli::parse();
    let config = config::Config::load()?.resolve(&args)?;

    let http = HttpClient::new(config.timeout, config.max_attempts)?;
    let api = ApiClient::new(http, &config.base_url);
    let dldr = Downloader::new(api, args.manga_id, &config, Logger::new(config.log_mode))?;

    dldr.run(&args.command, args.cbz())?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("[ERROR] {}", err);
        std::process::exit(1);
    }
}
