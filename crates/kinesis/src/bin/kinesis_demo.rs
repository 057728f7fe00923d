//! # KINESIS Demo
//!
//! Headless run of the classic scene: ground, a player box and a grid of
//! balls. Physics ticks on its own thread while this thread plays the part
//! of the window: scripted input, camera follow, draw, present.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info kinesis_demo --config kinesis.toml --duration 10
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use kinesis::{
    build_demo_scene, follow, DemoSim, FpsCounter, KinesisConfig, KinesisResult, PlayerController,
    PlayerInput, RecordingSurface,
};
use kinesis_core::{PhysicsEngine, Surface};
use kinesis_physics::RigidWorld;
use tracing::info;

/// Command line options (simple parsing, no external deps).
#[derive(Default)]
struct Options {
    config: Option<PathBuf>,
    duration_secs: Option<u64>,
    tick_rate: Option<u32>,
}

fn main() -> ExitCode {
    init_tracing();

    let Some(options) = parse_args() else {
        return ExitCode::SUCCESS;
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("kinesis_demo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Returns `None` when only help was requested.
fn parse_args() -> Option<Options> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    options.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--duration" | "-d" => {
                if i + 1 < args.len() {
                    options.duration_secs = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--tick-rate" | "-t" => {
                if i + 1 < args.len() {
                    options.tick_rate = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: kinesis_demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>        TOML configuration file");
                println!("  -d, --duration <SECS>      Run for N seconds then exit");
                println!("  -t, --tick-rate <RATE>     Physics tick rate in Hz");
                println!("  -h, --help                 Show this help");
                return None;
            }
            _ => {}
        }
        i += 1;
    }

    Some(options)
}

/// Held and pressed keys for `frame`, on a four second loop:
/// right, jump, left, explode.
fn scripted_input(frame: u64, refresh_rate: u64) -> impl Iterator<Item = PlayerInput> {
    let cycle = frame % (4 * refresh_rate);
    let held = match cycle / refresh_rate {
        0 => Some(PlayerInput::Right),
        2 => Some(PlayerInput::Left),
        _ => None,
    };
    let pressed = if cycle == refresh_rate {
        Some(PlayerInput::Jump)
    } else if cycle == 3 * refresh_rate {
        Some(PlayerInput::Explode)
    } else {
        None
    };
    held.into_iter().chain(pressed)
}

fn run(options: &Options) -> KinesisResult<()> {
    let mut config = match &options.config {
        Some(path) => KinesisConfig::load(path)?,
        None => KinesisConfig::default(),
    };
    if let Some(duration) = options.duration_secs {
        config.display.duration_secs = Some(duration);
    }
    if let Some(tick_rate) = options.tick_rate {
        config.scheduler.tick_rate = tick_rate;
    }
    config.validate()?;

    let mut sim = DemoSim::new(RigidWorld::new(&config.world), config.scheduler.clone())?;
    let scene = build_demo_scene(&mut sim, &config.scene)?;

    let scheduler = sim.start()?;
    let controller = PlayerController::new(
        scheduler.commands(),
        scene.player,
        scene.ball_sprite,
        config.scene.clone(),
    );
    let poses = scheduler.poses();
    let mut facade = scheduler.render_facade();

    let viewport = config.display.viewport();
    let zoom = config.scene.physics_scale * 2.0;
    let refresh_rate = u64::from(config.display.refresh_rate);
    let limit = config.display.duration_secs.map(Duration::from_secs);
    // Stand-in for vsync.
    let vsync = crossbeam_channel::tick(Duration::from_secs(1) / config.display.refresh_rate);

    let mut surface = RecordingSurface::new(viewport);
    let mut fps = FpsCounter::new();
    let start = Instant::now();
    let mut frame = 0u64;

    info!(
        refresh_rate,
        tick_rate = config.scheduler.tick_rate,
        duration_secs = ?config.display.duration_secs,
        "display loop started"
    );

    loop {
        if limit.is_some_and(|limit| start.elapsed() >= limit) {
            break;
        }
        if vsync.recv().is_err() {
            break;
        }

        for input in scripted_input(frame, refresh_rate) {
            if let Err(err) = controller.apply(input) {
                // The scheduler exited on its own; report its failure first.
                scheduler.stop()?;
                return Err(err.into());
            }
        }

        if let Some(player) = poses.pose(scene.player_object) {
            surface.set_view(follow(player.transform.translation, zoom, viewport));
        }

        surface.clear();
        let report = facade.draw(&mut surface);
        surface.present();

        if let Some(frames) = fps.frame() {
            let last = surface.last_frame();
            info!(
                fps = frames,
                tick = report.tick,
                instances = report.instances,
                visible = last.visible,
                "frame rate"
            );
        }
        frame += 1;
    }

    let sim = scheduler.stop()?;
    let stats = sim.stats();
    let player = sim.world().position(scene.player);

    println!("┌─ KINESIS SUMMARY ───────────────────────────────────────────────");
    println!("│ Run Time:           {:.1}s", start.elapsed().as_secs_f64());
    println!("│ Frames Presented:   {}", surface.frames());
    println!("│ Instances Drawn:    {}", surface.total_instances());
    println!("│ Physics Ticks:      {}", sim.tick_count());
    println!("│ Bodies:             {}", sim.registry().len());
    println!("│ Avg Tick Time:      {} μs", stats.avg_tick_us);
    println!("│ Max Tick Time:      {} μs", stats.max_tick_us);
    println!("│ Late Ticks:         {}", stats.late_ticks);
    println!("│ Player Position:    ({:.2}, {:.2})", player.x, player.y);
    println!("└─────────────────────────────────────────────────────────────────");

    Ok(())
}
