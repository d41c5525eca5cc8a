//! xact - XACT sound bank tool.
//!
//! Inspects sound banks, resolves cues without playing them, renders cues
//! to WAV files and converts text banks to the binary encoding.
//!
//! Banks are given either by name, looked up in the configured search
//! paths, or as a path to a `.xsb` / `_xsb.txt` file.

mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use xact_soundbank::{
    encode_sound_bank, encode_wave_bank, CueRef, DirectoryProvider, SoundBank, SoundBankFile,
    SoundType,
};

use config::Config;
use render::WavSink;

#[derive(Parser, Debug)]
#[command(name = "xact")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect, resolve and render XACT sound banks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.config/xact/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Additional resource directories, searched before the configured ones
    #[arg(short = 'd', long = "dir", value_name = "DIR", global = true)]
    dirs: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the contents of a sound bank
    Info {
        /// Sound bank name or file
        bank: String,

        /// Print the bank as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a cue would play, without loading any waves
    Resolve {
        /// Sound bank name or file
        bank: String,

        #[command(flatten)]
        cue: CueArgs,
    },

    /// Render a cue to a WAV file
    Render {
        /// Sound bank name or file
        bank: String,

        #[command(flatten)]
        cue: CueArgs,

        /// Output WAV file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Cut off looping cues after this many seconds
        #[arg(long)]
        max_seconds: Option<f64>,

        /// Sound type passed to the sink (music, sfx, voice, video)
        #[arg(long)]
        sound_type: Option<SoundType>,
    },

    /// Write a sound bank in the binary encoding
    Convert {
        /// Sound bank name or file
        bank: String,

        /// Output `.xsb` file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Also write every referenced wave bank as `.xwb` next to the output
        #[arg(long)]
        wave_banks: bool,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    Path,
}

#[derive(clap::Args, Debug)]
struct CueArgs {
    /// Cue name, or index with --index
    cue: String,

    /// Treat the cue as an index into the cue table
    #[arg(long)]
    index: bool,

    /// Variation selector, matched against the variation weight ranges
    #[arg(short, long, default_value = "0")]
    variation: u32,
}

impl CueArgs {
    fn cue_ref(&self) -> Result<CueRef> {
        if self.index {
            let index = self
                .cue
                .parse::<usize>()
                .with_context(|| format!("Invalid cue index '{}'", self.cue))?;
            Ok(CueRef::Index(index))
        } else {
            Ok(CueRef::Name(self.cue.clone()))
        }
    }
}

#[derive(Serialize)]
struct BankJson<'a> {
    format: String,
    #[serde(flatten)]
    bank: &'a SoundBankFile,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let load_config = || -> Result<Config> {
        let mut config = Config::load(cli.config.as_deref())?;
        config.prepend_search_paths(&cli.dirs);
        Ok(config)
    };

    match cli.command {
        Commands::Info { bank, json } => {
            let bank = load_bank(&mut load_config()?, &bank)?;
            if json {
                let out = BankJson {
                    format: bank.format().to_string(),
                    bank: bank.file(),
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", describe(&bank));
            }
        }
        Commands::Resolve { bank, cue } => {
            let bank = load_bank(&mut load_config()?, &bank)?;
            let cue_ref = cue.cue_ref()?;
            match bank.resolve_cue(&cue_ref, cue.variation)? {
                Some(plan) => println!(
                    "cue {} -> sound {} -> wave {} of '{}' ({})",
                    cue_ref, plan.sound_index, plan.wave_index, plan.wave_bank, plan.loops
                ),
                None => println!("cue {}: nothing to play", cue_ref),
            }
        }
        Commands::Render {
            bank,
            cue,
            output,
            max_seconds,
            sound_type,
        } => {
            let mut config = load_config()?;
            let max_seconds = max_seconds.unwrap_or(config.render.max_seconds);
            if !max_seconds.is_finite() || max_seconds <= 0.0 {
                anyhow::bail!("--max-seconds must be positive, got {}", max_seconds);
            }
            let sound_type = sound_type.unwrap_or(config.render.sound_type);

            let bank = load_bank(&mut config, &bank)?;
            let cue_ref = cue.cue_ref()?;
            let sink = WavSink::new(&output, max_seconds);
            let handle = bank.play_cue(&cue_ref, cue.variation, sound_type, &sink)?;

            match sink.rendered() {
                Some(stats) if !handle.is_none() => {
                    println!(
                        "Rendered {:.2}s ({} ch, {} Hz) to {}{}",
                        stats.seconds(),
                        stats.channels,
                        stats.sample_rate,
                        sink.path().display(),
                        if stats.complete { "" } else { " (cut off)" }
                    );
                }
                _ => log::warn!("Cue {} plays nothing, no file written", cue_ref),
            }
        }
        Commands::Convert {
            bank,
            output,
            wave_banks,
        } => {
            let bank = load_bank(&mut load_config()?, &bank)?;
            let bytes = encode_sound_bank(bank.file())?;
            fs::write(&output, bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote sound bank '{}' to {}", bank.name(), output.display());

            if wave_banks {
                let dir = output.parent().unwrap_or_else(|| Path::new("."));
                for name in bank.wave_bank_names() {
                    let wave_bank = bank.wave_bank(name)?;
                    let path = dir.join(format!("{}.xwb", name));
                    let bytes = encode_wave_bank(wave_bank.name(), wave_bank.waves())?;
                    fs::write(&path, bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "Wrote wave bank '{}' ({} waves) to {}",
                        name,
                        wave_bank.len(),
                        path.display()
                    );
                }
            }
        }
        Commands::Config(command) => run_config(&command)?,
    }

    Ok(())
}

fn run_config(command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
        }
        ConfigCommand::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Split a bank argument into an extra search directory and a bank name.
///
/// An existing file contributes its directory; `menu.xsb` and
/// `menu_xsb.txt` both name the bank `menu`.
fn bank_location(arg: &str) -> (Option<PathBuf>, String) {
    let path = Path::new(arg);
    if !path.is_file() {
        return (None, arg.to_string());
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| arg.to_string());
    let name = stem.strip_suffix("_xsb").unwrap_or(&stem).to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (Some(dir), name)
}

fn load_bank(config: &mut Config, arg: &str) -> Result<SoundBank> {
    let (dir, name) = bank_location(arg);
    if let Some(dir) = dir {
        config.prepend_search_paths(&[dir]);
    }
    if config.resources.search_paths.is_empty() {
        config.resources.search_paths.push(PathBuf::from("."));
    }

    let provider = Arc::new(DirectoryProvider::from_config(&config.resources));
    log::debug!("Searching {:?}", provider.search_paths());
    SoundBank::load(provider, &name).with_context(|| format!("Could not open bank '{}'", arg))
}

fn describe(bank: &SoundBank) -> String {
    let file = bank.file();
    let mut out = String::new();

    out.push_str(&format!("{} ({})\n", file.info(), bank.format()));

    out.push_str("\nWave banks:\n");
    for (index, name) in file.wave_banks().iter().enumerate() {
        out.push_str(&format!("  [{}] {}\n", index, name));
    }

    out.push_str("\nSounds:\n");
    for (index, sound) in file.sounds().iter().enumerate() {
        out.push_str(&format!(
            "  [{}] '{}' loops {}\n",
            index,
            sound.name,
            sound.loops()
        ));
        for (track_index, track) in sound.tracks.iter().enumerate() {
            let waves: Vec<String> = track
                .waves
                .iter()
                .map(|wave| {
                    if wave.bank.is_empty() {
                        "-".to_string()
                    } else {
                        format!("{}:{}", wave.bank, wave.index)
                    }
                })
                .collect();
            let events: Vec<&str> = track.events.iter().map(|e| e.kind().name()).collect();
            out.push_str(&format!(
                "      track {}: waves [{}] events [{}] loops {}\n",
                track_index,
                waves.join(", "),
                events.join(", "),
                xact_soundbank::effective_loops(sound, track)
            ));
        }
    }

    out.push_str("\nCues:\n");
    for (index, cue) in file.cues().iter().enumerate() {
        out.push_str(&format!("  [{}] {}\n", index, cue.name));
        for variation in &cue.variations {
            out.push_str(&format!(
                "      {}..={} -> sound {}\n",
                variation.weight_min, variation.weight_max, variation.sound_index
            ));
        }
    }

    out
}
