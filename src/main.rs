pub mod types;
pub mod config;
pub mod error;
pub mod data;
pub mod filter;
pub mod aggregate;
pub mod view;
pub mod session;
pub mod render;
pub mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file; built-in defaults when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive map dashboard
    Serve {
        /// CSV file to start from instead of the configured one
        #[arg(short, long, value_name = "CSV")]
        data: Option<PathBuf>,
    },
    /// Print the filtered listing and summary charts to the terminal
    Report {
        #[arg(short, long, value_name = "CSV")]
        data: Option<PathBuf>,
        /// District (kabupaten) to keep
        #[arg(long, default_value = "")]
        district: String,
        /// Category (kategori) to keep
        #[arg(long, default_value = "")]
        category: String,
        /// Case-insensitive substring of the business name
        #[arg(long, default_value = "")]
        name: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("umkm_map=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_table(app_config: &config::AppConfig, data_path: Option<PathBuf>) -> anyhow::Result<types::RecordTable> {
    let source = data::DataSource::from_path(data_path.or_else(|| app_config.input.data_csv.clone()));
    let outcome = data::load(&source).with_context(|| format!("Failed to load records from {:?}", source))?;
    Ok(outcome.table)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let app_config = config::AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { data } => {
            let table = load_table(&app_config, data)?;
            server::start_server(app_config, table).await?;
        }
        Commands::Report { data, district, category, name } => {
            let table = load_table(&app_config, data)?;
            let mut session = session::Session::new(table, &app_config.filter.all_label, app_config.map.clone());

            session.select_district(&district);
            session.select_category(&category);
            let view = session.search_name(&name);

            print!("{}", render::render_report(&view)?);
        }
    }

    Ok(())
}
