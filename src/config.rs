use std::{
    fs::{create_dir_all, File},
    io::{BufReader, Write},
    path::PathBuf,
};

use home::home_dir;
use ptbkit::{FileVersion, PtbError};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    default_file_version: Option<String>,
}

impl Config {
    // folder placed in $HOME directory
    const FOLDER: &'static str = ".ptbkit";

    /// Version used when none is given on the command line
    pub fn get_default_file_version(&self) -> Result<Option<FileVersion>, PtbError> {
        self.default_file_version
            .as_deref()
            .map(str::parse::<FileVersion>)
            .transpose()
    }

    pub fn set_default_file_version(
        &mut self,
        new_version: Option<FileVersion>,
    ) -> Result<(), PtbError> {
        let new_version = new_version.map(|version| version.to_string());
        if self.default_file_version == new_version {
            // no op
            Ok(())
        } else {
            self.default_file_version = new_version;
            self.save_config()
        }
    }

    fn get_base_path() -> Result<PathBuf, PtbError> {
        let home = home_dir()
            .ok_or_else(|| PtbError::ConfigError("Could not find home directory".to_string()))?;
        let path = home.join(Self::FOLDER);
        Ok(path)
    }

    fn get_path() -> Result<PathBuf, PtbError> {
        let base = Self::get_base_path()?;
        Ok(base.join("config.json"))
    }

    /// Creates config if it does not exist
    pub fn read_config() -> Result<Self, PtbError> {
        let base_path = Self::get_base_path()?;
        if !base_path.exists() {
            create_dir_all(base_path)?;
        }
        let config_path = Self::get_path()?;
        if !config_path.exists() {
            // create empty config
            Config::default().save_config()?;
        }
        let file = File::open(config_path)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader).map_err(|err| {
            PtbError::ConfigError(format!("Could not read local configuration {err:}"))
        })?;
        Ok(config)
    }

    /// Assumes the config folder exists
    pub fn save_config(&self) -> Result<(), PtbError> {
        let config_path = Self::get_path()?;
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            PtbError::ConfigError(format!("Could not save local configuration {err:}"))
        })?;
        let mut file = File::create(config_path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
