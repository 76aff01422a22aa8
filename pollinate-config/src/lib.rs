use clap::ValueEnum;
use log::debug;
use pollinate_core::{DroneLaunch, SimulationError, SimulationParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    InvalidParams(#[from] SimulationError),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// --- Enums for Choices ---

/// Named parameter sets for the two standard field layouts.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Large field swept by six drones launched from the bottom edge.
    #[default]
    BottomRow,
    /// Smaller field with a single far-sighted drone starting anywhere.
    RandomStart,
}

impl Preset {
    pub fn params(self) -> SimulationParams {
        match self {
            Preset::BottomRow => SimulationParams {
                field_size: 1100.0,
                flower_count: 4500,
                vision_radius: 50.0,
                pollination_radius: 25.0,
                drone_speed: 2.0,
                min_cluster_points: 3,
                drone_count: 6,
                exclusion_multiplier: 1.5,
                launch: DroneLaunch::BottomRow,
                seed: None,
                grid_cell_size: None,
            },
            Preset::RandomStart => SimulationParams {
                field_size: 800.0,
                flower_count: 4000,
                vision_radius: 110.0,
                pollination_radius: 25.0,
                drone_speed: 2.0,
                min_cluster_points: 3,
                drone_count: 1,
                exclusion_multiplier: 2.0,
                launch: DroneLaunch::Random,
                seed: None,
                grid_cell_size: None,
            },
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializerType {
    #[default]
    Json,
    Binary,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Stdio,
    File,
    #[default]
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(format!(
                "{} (extension {:?}, expected .json or .toml)",
                path.display(),
                other.unwrap_or("")
            ))),
        }
    }
}

// --- Configuration Sections ---
// Unset values fall back to the selected preset.

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSettings {
    pub size: Option<f32>,
    pub flower_count: Option<usize>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DroneSettings {
    pub count: Option<usize>,
    pub speed: Option<f32>,
    pub vision_radius: Option<f32>,
    pub launch: Option<DroneLaunch>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringSettings {
    pub pollination_radius: Option<f32>,
    pub min_cluster_points: Option<usize>,
    pub exclusion_multiplier: Option<f32>,
}

/// Presence of this section enables the spatial grid. Without a cell size the
/// pollination radius is used.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialGridConfig {
    pub cell_size: Option<f32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SerializerConfig {
    #[serde(rename = "type", default)]
    pub serializer_type: SerializerType,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SenderConfig {
    #[serde(rename = "type", default)]
    pub sender_type: SenderType,
    /// Output file for the `file` sender.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    #[serde(default)]
    pub serializer: SerializerConfig,
    #[serde(default)]
    pub sender: SenderConfig,
    /// Emit a snapshot every N ticks.
    #[serde(default = "default_every_n_ticks")]
    pub every_n_ticks: u32,
}

fn default_every_n_ticks() -> u32 { 1 }
fn default_framerate() -> u32 { 60 }

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerConfig::default(),
            sender: SenderConfig::default(),
            every_n_ticks: default_every_n_ticks(),
        }
    }
}

// --- Top-Level Config Struct ---

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub preset: Preset,
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stop after this many ticks; run until interrupted when unset.
    #[serde(default)]
    pub max_ticks: Option<u64>,
    #[serde(default)]
    pub field: FieldSettings,
    #[serde(default)]
    pub drones: DroneSettings,
    #[serde(default)]
    pub clustering: ClusteringSettings,
    #[serde(default)]
    pub spatial_grid: Option<SpatialGridConfig>,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Config {
    /// A config with no overrides on top of `preset`.
    pub fn from_preset(preset: Preset) -> Self {
        Config {
            preset,
            framerate: default_framerate(),
            seed: None,
            max_ticks: None,
            field: FieldSettings::default(),
            drones: DroneSettings::default(),
            clustering: ClusteringSettings::default(),
            spatial_grid: None,
            transport: TransportConfig::default(),
        }
    }

    /// Resolves the preset and every override into simulation parameters.
    pub fn simulation_params(&self) -> SimulationParams {
        let base = self.preset.params();
        let pollination_radius = self.clustering.pollination_radius.unwrap_or(base.pollination_radius);

        SimulationParams {
            field_size: self.field.size.unwrap_or(base.field_size),
            flower_count: self.field.flower_count.unwrap_or(base.flower_count),
            vision_radius: self.drones.vision_radius.unwrap_or(base.vision_radius),
            pollination_radius,
            drone_speed: self.drones.speed.unwrap_or(base.drone_speed),
            min_cluster_points: self.clustering.min_cluster_points.unwrap_or(base.min_cluster_points),
            drone_count: self.drones.count.unwrap_or(base.drone_count),
            exclusion_multiplier: self.clustering.exclusion_multiplier.unwrap_or(base.exclusion_multiplier),
            launch: self.drones.launch.unwrap_or(base.launch),
            seed: self.seed.or(base.seed),
            grid_cell_size: self
                .spatial_grid
                .as_ref()
                .map(|grid| grid.cell_size.unwrap_or(pollination_radius)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.framerate == 0 {
            return Err(ConfigError::Validation("Framerate cannot be zero.".to_string()));
        }
        if self.transport.every_n_ticks == 0 {
            return Err(ConfigError::Validation(
                "transport.every_n_ticks must be greater than 0.".to_string(),
            ));
        }
        if self.transport.sender.sender_type == SenderType::File && self.transport.sender.path.is_none() {
            return Err(ConfigError::Validation(
                "The 'file' sender needs transport.sender.path.".to_string(),
            ));
        }
        self.simulation_params().validate()?;
        Ok(())
    }
}

// --- Loading Functions ---

pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let config: Config = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a config file. The format follows the extension.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content, format)?;
    debug!("Loaded {:?} config from {}", format, path.display());
    Ok(config)
}
