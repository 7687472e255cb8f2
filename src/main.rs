use crate::AppError::ConfigError;
use clap::{Parser, ValueEnum};
use config::Config;
use ptbkit::{
    from_bytes, to_bytes, Barline, ChordName, Dynamic, FileVersion, PtbError as LibPtbError,
    Serializable, Staff, StreamError, TempoMarker, Tuning,
};
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

mod config;

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("ptbkit=info"))
        .init();

    // args
    let args = CliArgs::parse();
    let input = PathBuf::from(&args.input);
    if !input.exists() {
        let err = ConfigError(format!("Input file not found {input:?}"));
        return Err(err);
    }

    // read local config
    let mut local_config = Config::read_config()?;
    let file_version = match args.file_version {
        Some(version) => version,
        None => local_config
            .get_default_file_version()?
            .unwrap_or(FileVersion::CURRENT),
    };
    if args.remember_version {
        local_config.set_default_file_version(Some(file_version))?;
        log::info!("Default file version set to {file_version}");
    }

    let data = std::fs::read(&input)?;
    log::info!(
        "Decoding {:?} from {input:?} ({} bytes) as version {file_version}",
        args.kind,
        data.len()
    );
    let migrate = args.migrate.as_deref().map(Path::new);
    match args.kind {
        EntityKind::Tuning => {
            let tuning: Tuning = decode(&data, file_version)?;
            println!("Spelling: {}", tuning.spelling());
            inspect(&tuning, migrate)
        }
        EntityKind::ChordName => {
            let chord: ChordName = decode(&data, file_version)?;
            println!("Chord: {}", chord.text());
            inspect(&chord, migrate)
        }
        EntityKind::Staff => {
            let staff: Staff = decode(&data, file_version)?;
            inspect(&staff, migrate)
        }
        EntityKind::Dynamic => {
            let dynamic: Dynamic = decode(&data, file_version)?;
            println!("Volume: {}", dynamic.volume());
            inspect(&dynamic, migrate)
        }
        EntityKind::Barline => {
            let barline: Barline = decode(&data, file_version)?;
            inspect(&barline, migrate)
        }
        EntityKind::TempoMarker => {
            let marker: TempoMarker = decode(&data, file_version)?;
            println!("Tempo: {} bpm", marker.beats_per_minute());
            inspect(&marker, migrate)
        }
    }
}

fn decode<T: Serializable + Default>(data: &[u8], version: FileVersion) -> Result<T, AppError> {
    from_bytes(data, version).map_err(AppError::from)
}

/// Print the entity and optionally rewrite it in the current layout
fn inspect<T: Serializable + Debug>(entity: &T, migrate: Option<&Path>) -> Result<(), AppError> {
    println!("{entity:#?}");
    if let Some(output) = migrate {
        let bytes = to_bytes(entity)?;
        std::fs::write(output, &bytes)?;
        log::info!(
            "Migrated to version {} in {output:?} ({} bytes)",
            FileVersion::CURRENT,
            bytes.len()
        );
    }
    Ok(())
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EntityKind {
    Tuning,
    ChordName,
    Staff,
    Dynamic,
    Barline,
    TempoMarker,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Kind of entity stored in the input file.
    #[arg(long, value_enum)]
    kind: EntityKind,
    /// Path to the serialized entity.
    #[arg(long)]
    input: String,
    /// File version the entity was written with (1.0, 1.0.2, 1.5 or 1.7).
    #[arg(long)]
    file_version: Option<FileVersion>,
    /// Optional path to write the entity back in the current layout.
    #[arg(long)]
    migrate: Option<String>,
    /// Store the file version as the default in the local configuration.
    #[arg(long, default_value_t = false)]
    remember_version: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<LibPtbError> for AppError {
    fn from(error: LibPtbError) -> Self {
        match error {
            LibPtbError::ParsingError(s) => Self::ParsingError(s),
            LibPtbError::ConfigError(s) => Self::ConfigError(s),
            LibPtbError::IoError(s) => Self::OtherError(s),
            LibPtbError::StreamError(err) => Self::ParsingError(err.to_string()),
            LibPtbError::ValidationError(err) => Self::OtherError(err.to_string()),
        }
    }
}

impl From<StreamError> for AppError {
    fn from(error: StreamError) -> Self {
        Self::ParsingError(error.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}
