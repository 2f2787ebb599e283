use crate::{Event, KeyboardConfig, LightDiff, Pitch};
use async_channel::Sender;
use keylight_utils::{NoDebug, unique_id};
use log::{info, trace, warn};
use midir::{
	Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection, SendError,
};
use smol::{Task, Timer};
use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
	time::Duration,
};

mod message;
mod ports;

pub use message::ShortMessage;
pub use ports::preferred_port;

unique_id!(play_id);

/// Where messages for the device go.
pub trait OutputPort: Send {
	fn send(&mut self, bytes: &[u8]) -> Result<(), SendError>;
}

impl OutputPort for MidiOutputConnection {
	fn send(&mut self, bytes: &[u8]) -> Result<(), SendError> {
		Self::send(self, bytes)
	}
}

#[derive(Debug, Default)]
struct Output {
	port: Option<NoDebug<Box<dyn OutputPort>>>,
	/// the latest `play` call for each sounding pitch
	owners: HashMap<Pitch, play_id::Id>,
}

impl Output {
	fn send(&mut self, message: ShortMessage) {
		let Some(port) = &mut self.port else {
			return;
		};

		if let Err(err) = port.send(&message.to_bytes()) {
			warn!("couldn't send {message:?}: {err}");
		}
	}
}

/// The keyboard the user plays on: its keys come in as events, autoplayed
/// notes and guide lights go out.
///
/// Either direction may be missing, in which case the operations on it do
/// nothing.
#[derive(Debug)]
pub struct Keyboard {
	output: Arc<Mutex<Output>>,
	input: Option<NoDebug<MidiInputConnection<()>>>,
	guide_channel: u8,
	play_channel: u8,
	program: u8,
	light_velocity: u8,
}

impl Keyboard {
	/// Connects to the preferred input and output ports. Key presses are sent
	/// to `events`.
	#[must_use]
	pub fn open(config: &KeyboardConfig, events: Sender<Event>) -> Self {
		let output = open_output(config).map(|port| Box::new(port) as Box<dyn OutputPort>);
		let input = open_input(config, events);

		let keyboard = Self::new(output, input, config);
		keyboard.clear_lights();
		keyboard
	}

	/// A keyboard without input, sending to `port`.
	#[must_use]
	pub fn with_output(port: impl OutputPort + 'static, config: &KeyboardConfig) -> Self {
		Self::new(Some(Box::new(port)), None, config)
	}

	#[must_use]
	pub fn disconnected(config: &KeyboardConfig) -> Self {
		Self::new(None, None, config)
	}

	fn new(
		port: Option<Box<dyn OutputPort>>,
		input: Option<MidiInputConnection<()>>,
		config: &KeyboardConfig,
	) -> Self {
		Self {
			output: Arc::new(Mutex::new(Output {
				port: port.map(NoDebug),
				owners: HashMap::new(),
			})),
			input: input.map(NoDebug),
			guide_channel: config.guide_channel,
			play_channel: config.play_channel,
			program: config.program,
			light_velocity: config.light_velocity,
		}
	}

	#[must_use]
	pub fn has_input(&self) -> bool {
		self.input.is_some()
	}

	#[must_use]
	pub fn has_output(&self) -> bool {
		lock(&self.output).port.is_some()
	}

	/// Strikes `pitch` and releases it after `duration`, unless it has been
	/// struck again in the meantime.
	pub fn play(&self, pitch: Pitch, velocity: u8, duration: Duration) {
		self.strike(pitch, velocity, duration).detach();
	}

	fn strike(&self, pitch: Pitch, velocity: u8, duration: Duration) -> Task<()> {
		let id = play_id::Id::unique();
		let channel = self.play_channel;

		{
			let mut output = lock(&self.output);
			output.owners.insert(pitch, id);

			output.send(ShortMessage::ProgramChange {
				channel,
				program: self.program,
			});
			output.send(ShortMessage::NoteOff { channel, pitch });
			output.send(ShortMessage::NoteOn {
				channel,
				pitch,
				velocity,
			});
		}

		let shared = self.output.clone();

		smol::spawn(async move {
			Timer::after(duration).await;

			let mut output = lock(&shared);
			if output.owners.get(&pitch) == Some(&id) {
				output.owners.remove(&pitch);
				output.send(ShortMessage::NoteOff { channel, pitch });
			} else {
				trace!("{pitch} was struck again, not releasing it");
			}
		})
	}

	/// Clears first if asked to, then switches lights on, then off.
	pub fn set_lights(&self, diff: &LightDiff) {
		let mut output = lock(&self.output);

		if diff.clear {
			self.clear(&mut output);
		}

		for &key in &diff.on {
			output.send(self.light(key, self.light_velocity));
		}

		for &key in &diff.off {
			output.send(self.light(key, 0));
		}
	}

	pub fn clear_lights(&self) {
		self.clear(&mut lock(&self.output));
	}

	fn clear(&self, output: &mut Output) {
		for key in 0..Pitch::MAX.0 {
			output.send(self.light(key, 0));
		}
	}

	const fn light(&self, key: u8, velocity: u8) -> ShortMessage {
		ShortMessage::NoteOn {
			channel: self.guide_channel,
			pitch: Pitch(key),
			velocity,
		}
	}

	/// Switches every light off and releases both ports. Notes that are still
	/// sounding may not be released.
	pub fn close(mut self) {
		self.shutdown();
	}

	fn shutdown(&mut self) {
		if self.input.take().is_some() {
			info!("closed midi input");
		}

		let mut output = lock(&self.output);
		if output.port.is_some() {
			self.clear(&mut output);
			output.port = None;
			info!("closed midi output");
		}

		output.owners.clear();
	}
}

impl Drop for Keyboard {
	fn drop(&mut self) {
		self.shutdown();
	}
}

fn lock(output: &Mutex<Output>) -> MutexGuard<'_, Output> {
	output.lock().unwrap_or_else(PoisonError::into_inner)
}

fn port_names<T>(ports: &[T], name: impl Fn(&T) -> Option<String>) -> Vec<String> {
	ports
		.iter()
		.map(|port| name(port).unwrap_or_default())
		.collect()
}

fn open_output(config: &KeyboardConfig) -> Option<MidiOutputConnection> {
	let output = MidiOutput::new(&config.client_name)
		.inspect_err(|err| warn!("no midi output available: {err}"))
		.ok()?;

	let ports = output.ports();
	let names = port_names(&ports, |port| output.port_name(port).ok());

	let Some(index) = preferred_port(&names, &config.software_ports) else {
		info!("no midi output device found");
		return None;
	};

	info!("using midi output {}", names[index]);

	output
		.connect(&ports[index], "keylight-out")
		.inspect_err(|err| warn!("couldn't connect to {}: {err}", names[index]))
		.ok()
}

fn open_input(config: &KeyboardConfig, events: Sender<Event>) -> Option<MidiInputConnection<()>> {
	let mut input = MidiInput::new(&config.client_name)
		.inspect_err(|err| warn!("no midi input available: {err}"))
		.ok()?;
	input.ignore(Ignore::All);

	let ports = input.ports();
	let names = port_names(&ports, |port| input.port_name(port).ok());

	let Some(index) = preferred_port(&names, &config.software_ports) else {
		info!("no midi input device found");
		return None;
	};

	info!("using midi input {}", names[index]);

	input
		.connect(
			&ports[index],
			"keylight-in",
			move |_, bytes, _| {
				let event = match ShortMessage::parse(bytes) {
					Some(ShortMessage::NoteOn { pitch, .. }) => Event::KeyDown(pitch),
					Some(ShortMessage::NoteOff { pitch, .. }) => Event::KeyUp(pitch),
					_ => return,
				};

				if let Err(err) = events.try_send(event) {
					trace!("dropped key event: {err}");
				}
			},
			(),
		)
		.inspect_err(|err| warn!("couldn't connect to {}: {err}", names[index]))
		.ok()
}
