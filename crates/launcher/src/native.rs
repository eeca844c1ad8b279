use std::path::PathBuf;
use std::process::ExitCode;

use bevy::app::AppExit;
use clap::Parser;

use client::{ClientSettings, create_client_app};
use shared::data::PlayerDataAsset;
use shared::error::ControllerError;

#[derive(Parser, Debug)]
#[command(name = "player-controller")]
#[command(version = "0.1")]
#[command(about = "2D player controller sandbox")]
#[command(long_about = "
2D player controller sandbox

EXAMPLES:
    cargo run --bin launcher                                   # Default tuning
    cargo run --bin launcher -- --config assets/player.toml    # Load player tuning
    cargo run --bin launcher -- --inspector                    # World inspector and ground rays
    cargo run --bin launcher -- --headless --log-filter debug  # No window, verbose logs
")]
pub struct Cli {
    #[arg(short, long)]
    #[arg(help = "TOML file with the player tuning")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub headless: bool,

    #[arg(long, default_value_t = false)]
    #[arg(help = "Show the world inspector and ground-probe gizmos")]
    pub inspector: bool,

    #[arg(long)]
    #[arg(help = "Log filter, e.g. \"info,shared=debug\"")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn settings(&self) -> Result<ClientSettings, ControllerError> {
        let player_data = match &self.config {
            Some(path) => PlayerDataAsset::load(path)?,
            None => PlayerDataAsset::default(),
        };
        player_data.validate()?;

        Ok(ClientSettings {
            player_data,
            headless: self.headless,
            inspector: self.inspector,
            log_filter: self.log_filter.clone(),
        })
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to load player configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    match create_client_app(settings).run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}
