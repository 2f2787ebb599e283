use crate::Tick;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
	fs::{read_to_string, write},
	io,
	path::PathBuf,
	sync::{Arc, LazyLock},
};

pub static CONFIG_PATH: LazyLock<Option<PathBuf>> =
	LazyLock::new(|| dirs::config_dir().map(|dir| dir.join("keylight.toml")));

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
	/// playback speed, 40 to 80
	pub tempo: u8,
	/// ticks per display row, 1 to 8
	pub scale: u8,
	pub ingest: IngestConfig,
	pub clock: ClockConfig,
	pub keyboard: KeyboardConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			tempo: 65,
			scale: 7,
			ingest: IngestConfig::default(),
			clock: ClockConfig::default(),
			keyboard: KeyboardConfig::default(),
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
	/// Added to every event's tick, so notes reach the play line slightly
	/// before they are due.
	pub tick_offset: Tick,
}

impl Default for IngestConfig {
	fn default() -> Self {
		Self { tick_offset: -16 }
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ClockConfig {
	/// display rows scrolled per firing, before scaling
	pub step: Tick,
	/// ticks moved by paging forward or backward
	pub page: Tick,
	pub initial_delay_ms: u64,
}

impl Default for ClockConfig {
	fn default() -> Self {
		Self {
			step: 12,
			page: 2000,
			initial_delay_ms: 200,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyboardConfig {
	pub client_name: Arc<str>,
	/// channel whose note-on messages switch the key lights
	pub guide_channel: u8,
	/// channel autoplayed notes are sent on
	pub play_channel: u8,
	pub program: u8,
	pub light_velocity: u8,
	/// port name fragments of software synthesizers and loopback ports,
	/// which are only used when no hardware port exists
	pub software_ports: Vec<Arc<str>>,
}

impl Default for KeyboardConfig {
	fn default() -> Self {
		Self {
			client_name: "keylight".into(),
			guide_channel: 0,
			play_channel: 1,
			program: 0,
			light_velocity: 1,
			software_ports: ["Through", "Synth", "TiMidity", "FluidSynth", "Wavetable"]
				.into_iter()
				.map(Arc::from)
				.collect(),
		}
	}
}

impl Config {
	/// Reads the config file, falling back to the defaults. A missing file is
	/// created with the defaults.
	#[must_use]
	pub fn read() -> Self {
		let Some(path) = CONFIG_PATH.as_deref() else {
			warn!("no config directory, using the default config");
			return Self::default();
		};

		match read_to_string(path) {
			Ok(config) => toml::from_str(&config).unwrap_or_else(|err| {
				warn!("invalid config {}: {err}", path.display());
				Self::default()
			}),
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				let config = Self::default();
				config.write();
				config
			}
			Err(err) => {
				warn!("couldn't read config {}: {err}", path.display());
				Self::default()
			}
		}
	}

	pub fn write(&self) {
		let Some(path) = CONFIG_PATH.as_deref() else {
			return;
		};

		let result = toml::to_string(self)
			.map_err(io::Error::other)
			.and_then(|config| write(path, config));

		match result {
			Ok(()) => info!("wrote config to {}", path.display()),
			Err(err) => warn!("couldn't write config {}: {err}", path.display()),
		}
	}
}
