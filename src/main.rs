use clap::Parser;
use log::{error, info, LevelFilter};

use sleeknotes::{App, Cli, Config, FileKeyValueStore, NoteStorage, Result, Session, Workspace};

pub fn initialize_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    config.validate()?;

    let store = FileKeyValueStore::open(&config.data_dir)?;
    let session = Session::open(NoteStorage::new(store), &config)?;
    let workspace = Workspace::new(session, &config);

    let app = App::new(workspace, config, config_path, cli.verbose);
    app.run(cli.command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    info!("Application shutting down");
}
