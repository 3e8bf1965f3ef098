use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use sf_save::save::{Body, Save};

#[derive(Parser)]
#[command(name = "sf-save")]
#[command(about = "Reads a Satisfactory save file")]
struct Args {
  /// Path to the .sav file
  path: PathBuf,

  /// Dump the whole decoded save as JSON
  #[arg(long)]
  json: bool,

  /// Write the JSON dump to a file instead of stdout
  #[arg(long, requires = "json")]
  output: Option<PathBuf>,
}

fn main() -> ExitCode {
  env_logger::init_from_env(Env::default().default_filter_or("info"));
  let args = Args::parse();

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{e}");
      ExitCode::FAILURE
    },
  }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
  let now = Instant::now();

  info!("> Reading {}", args.path.display());
  let save = sf_save::read_file(&args.path)?;
  info!("> Successfully parsed save file in {} ms", now.elapsed().as_millis());

  if args.json {
    let json = serde_json::to_string_pretty(&save)?;
    match &args.output {
      Some(output) => fs::write(output, json)?,
      None => println!("{json}"),
    }
  } else {
    log_summary(&save);
  }

  Ok(())
}

fn log_summary(save: &Save) {
  let header = &save.header;
  info!("Session: {} ({})", header.session_name, header.map_name);
  if let Some(save_name) = &header.save_name {
    info!("Save name: {save_name}");
  }
  info!(
    "Header version {}, save version {}, build {}",
    header.header_version, header.save_version, header.build_version
  );
  if let Some(saved_at) = header.saved_at() {
    info!("Saved at: {saved_at}");
  }
  info!("Played: {}h {}m", header.played_seconds / 3600, header.played_seconds % 3600 / 60);

  match &save.body {
    Body::Legacy(body) => {
      info!("{} objects, {} collectables", body.objects.len(), body.collectables.len());
    },
    Body::Levels(body) => {
      if let Some(grid) = &body.grid {
        info!("{} grid partitions", grid.partitions.len());
      }
      info!("{} levels, {} objects", body.levels.len(), save.objects().count());
    },
  }
}
