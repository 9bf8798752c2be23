use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueHint};

use spotify_dash::config::{CONFIG_ENV, CONFIG_PATH, DashConfig};
use spotify_dash::data::materialize::{ArtifactStore, MaterializeOptions, materialize_file};

/// Turn a raw chart dump into the small CSVs the dashboard reads at startup.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to spotify-dash.json in the working directory)
    #[arg(short, long, env = CONFIG_ENV, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Raw chart dump; overrides `raw_dataset` from the config
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output directory; overrides `artifact_dir` from the config
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    out_dir: Option<PathBuf>,

    /// Extra personal artist (repeatable)
    #[arg(short, long = "artist")]
    artists: Vec<String>,

    /// File with one personal artist per line
    #[arg(long, value_hint = ValueHint::FilePath)]
    artist_file: Option<PathBuf>,

    /// Also write charts200.csv with the top200 rows
    #[arg(long)]
    write_filtered: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
    let mut config = DashConfig::load_from(&config_path)?;

    if let Some(input) = cli.input {
        config.raw_dataset = input;
    }
    if let Some(out_dir) = cli.out_dir {
        config.artifact_dir = out_dir;
    }
    config.personal_artists.extend(cli.artists);
    if let Some(path) = cli.artist_file {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        config.personal_artists.extend(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }
    config.write_filtered_table |= cli.write_filtered;

    let artists = config.artist_set();
    if artists.is_empty() {
        log::warn!("No personal artists configured; my_arts and my_streams will be empty");
    }

    let store = ArtifactStore::new(&config.artifact_dir);
    let options = MaterializeOptions {
        write_filtered_table: config.write_filtered_table,
    };
    let tables = materialize_file(&config.raw_dataset, &artists, &store, &options)?;

    println!(
        "Wrote {} world rows, {} personal rows across {} regions to {}",
        tables.world_streams.len(),
        tables.my_streams.len(),
        tables.my_arts.len(),
        store.dir().display()
    );
    Ok(())
}
