use keylight_core::{Config, Keyboard, Session};
use log::{error, info, warn};
use std::{env, process::ExitCode};

mod trace;

fn main() -> ExitCode {
	trace::setup();

	let mut args = env::args_os().skip(1);
	let Some(path) = args.next() else {
		error!("usage: keylight <file.mid> [track numbers...]");
		return ExitCode::FAILURE;
	};

	let performed: Vec<usize> = args
		.filter_map(|arg| {
			let arg = arg.to_string_lossy();
			arg.parse()
				.inspect_err(|_| warn!("ignoring track number {arg:?}"))
				.ok()
		})
		.collect();

	let config = Config::read();
	let (events, inbox) = async_channel::unbounded();
	let keyboard = Keyboard::open(&config.keyboard, events.clone());
	let mut session = Session::new(config, keyboard);

	if let Err(err) = session.load(&path) {
		error!("{err}");
		return ExitCode::FAILURE;
	}

	for &number in &performed {
		let Some(track) = session.tracks().iter().find(|track| track.number == number) else {
			warn!("no track {number} with notes");
			continue;
		};

		info!("playing track {number} ({}) yourself", track.name);
		let id = track.id;

		if let Err(err) = session.set_autoplay(id, false) {
			warn!("{err}");
		}
	}

	session.play_pause();
	session.run_to_end(&inbox);

	drop(events);
	session.close();

	ExitCode::SUCCESS
}
