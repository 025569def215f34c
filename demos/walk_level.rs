use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use isolevel::formats::{load_level, save_level};
use isolevel::input::{Action, InputEvent, InputState};
use isolevel::level::LevelManager;

use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(help = "Level JSON to load. A flat grid is generated when omitted.")]
	level_path: Option<PathBuf>,
	#[arg(long, default_value_t = 5, help = "Rows of the generated grid")]
	rows: usize,
	#[arg(long, default_value_t = 5, help = "Columns of the generated grid")]
	cols: usize,
	#[arg(long, default_value_t = 84., help = "Tile size of the generated grid")]
	tile_size: f32,
	#[arg(long, default_value_t = 120, help = "Frames to simulate")]
	frames: usize,
	#[arg(long, help = "Write the level back out after simulating")]
	save: Option<PathBuf>,
	#[arg(short, long, help = "Log per-frame detail")]
	verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	tracing_subscriber::registry()
		.with(fmt::layer())
		.with(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO })
		.init();

	let mut level = match &cli.level_path {
		Some(path) => load_level(&fs::read_to_string(path)?)?,
		None => {
			let mut level = LevelManager::new(cli.rows, cli.cols, cli.tile_size)?;
			let (rows, cols) = (level.tiles().rows(), level.tiles().cols());
			level.set_tile_elevation(0, 0, -16.);
			level.set_tile_active(rows / 2, cols.saturating_sub(1), false);
			level.spawn_consumable("coin_0", "coin", 1, rows.saturating_sub(1), cols / 2)?;
			level
		}
	};

	if level.character("player").is_none() {
		let (row, col) = level.tiles().origin_index().unwrap_or((0, 0));
		level.spawn_character("player", row, col)?;
	}
	level.set_player("player");

	// walk right for a while, turn the camera, then walk down
	let script = [
		(0, InputEvent::KeyDown(Action::MoveRight)),
		(cli.frames / 3, InputEvent::KeyUp(Action::MoveRight)),
		(cli.frames / 3, InputEvent::KeyDown(Action::RotateRight)),
		(cli.frames / 3 + 1, InputEvent::KeyUp(Action::RotateRight)),
		(cli.frames / 2, InputEvent::KeyDown(Action::MoveDown)),
		(cli.frames * 3 / 4, InputEvent::KeyUp(Action::MoveDown)),
	];

	let mut input = InputState::new();
	for frame in 0..cli.frames {
		input.extend(script.iter().filter(|(at, _)| *at == frame).map(|(_, event)| *event));
		level.update(1. / 60., &input);
		input.end_frame();
	}

	if let Some(player) = level.player() {
		let node = level.graph().get(player).ok_or("player vanished")?;
		info!("Player ended at {:?}, view {}", node.position(), level.camera().view_direction());
	}

	println!("{}", level.graph());
	for item in level.draw_list() {
		let name = level.graph().get(item.node).map(|node| node.name()).unwrap_or("?");
		println!(
			"{name:>12} screen ({:>8.1}, {:>8.1}) {}",
			item.screen_position.x,
			item.screen_position.y,
			item.drawable.as_deref().unwrap_or("-")
		);
	}

	if let Some(path) = cli.save {
		fs::write(&path, save_level(&level))?;
		info!("Saved level to {}", path.display());
	}

	Ok(())
}
