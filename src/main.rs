use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod controller;
mod inputter;
mod logging;
mod model;
mod ui;

use controller::Controller;
use model::{Model, Status};
use storerate::dataset::Dataset;
use storerate::domain::{AppConfig, StoreError};
use storerate::loader;
use ui::TableUI;

/// Terminal console for browsing users, stores and ratings.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory with users, stores and ratings files (csv, parquet or arrow). Demo data if omitted.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Log file, `~` and environment variables are expanded
    #[arg(long, default_value = "storerate.log")]
    log_file: PathBuf,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Number of recent reviews on the store dashboard
    #[arg(long, default_value_t = 3)]
    recent: usize,
}

impl Args {
    fn into_config(self) -> AppConfig {
        let config = AppConfig::default()
            .with_event_poll_time(self.poll_ms)
            .with_max_column_width(self.max_column_width)
            .with_recent_reviews(self.recent)
            .with_log_file(self.log_file);
        match self.data {
            Some(dir) => config.with_data_dir(logging::expand_path(&dir)),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let config = Args::parse().into_config();
    match run(&config) {
        Err(e) => {
            ratatui::restore();
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn load(config: &AppConfig) -> Result<Dataset, StoreError> {
    match &config.data_dir {
        Some(dir) => loader::load_dataset(dir),
        None => {
            info!("No data directory given, using demo data");
            Dataset::demo()
        }
    }
}

fn run(config: &AppConfig) -> Result<(), StoreError> {
    let log_path = logging::init_logging(&config.log_file)?;
    info!("Starting storerate, logging to {}", log_path.display());

    let dataset = load(config)?;

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(config, dataset, size.width as usize, size.height as usize)?;
    let ui = TableUI::new(config);
    let controller = Controller::new(config);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye");
    Ok(())
}
