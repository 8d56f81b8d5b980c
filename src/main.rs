use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{error, info};

use udaciracer::client::logging::init_logging;
use udaciracer::client::{Config, HttpRaceService};
use udaciracer::core::leaderboard::{progress_board, results_board, user_position, LeaderboardRow};
use udaciracer::core::{
    event_channel, Catalog, Dispatched, EventStream, InputEventRouter, LifecycleEvent,
    PollOutcome, RaceLifecycleController, RaceService, RacerId, SessionStore, TrackId, UiEvent,
};

/// View refresh cadence
const FRAME: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Config file (default: ./udaciracer.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Race server URL, overrides the config file
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available tracks
    Tracks,
    /// List available racers
    Racers,
    /// Race the given racer on the given track; press Enter to accelerate
    Race {
        #[arg(short, long)]
        racer: RacerId,

        #[arg(short, long)]
        track: TrackId,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(Config::CONFIG_FILENAME));
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = args.server {
        config.server.url = url;
    }

    init_logging(&config.logging);
    info!(server = %config.server.url, "UdaciRacer client starting...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Could not start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(args.command, config))
}

async fn run(command: Commands, config: Config) -> ExitCode {
    let service: Arc<dyn RaceService> = match HttpRaceService::from_settings(&config.server) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!(error = %e, "Failed to create race server client");
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = SessionStore::new();
    let (sink, stream) = event_channel();
    let controller = Arc::new(
        RaceLifecycleController::new(service, store, sink).with_timing(config.race.timing()),
    );

    let catalog = controller.load_catalog().await;
    // Catalog events are only needed by the race view
    stream.drain();

    match command {
        Commands::Tracks => list_tracks(&catalog),
        Commands::Racers => list_racers(&catalog),
        Commands::Race { racer, track } => race(controller, stream, &catalog, racer, track).await,
    }
}

fn list_tracks(catalog: &Catalog) -> ExitCode {
    let Some(tracks) = &catalog.tracks else {
        eprintln!("Problem getting tracks, is the race server running?");
        return ExitCode::FAILURE;
    };
    for track in tracks {
        println!("{:>4}  {}", track.id, track.name);
    }
    ExitCode::SUCCESS
}

fn list_racers(catalog: &Catalog) -> ExitCode {
    let Some(racers) = &catalog.racers else {
        eprintln!("Problem getting racers, is the race server running?");
        return ExitCode::FAILURE;
    };
    println!("{:>4}  {:<16} {:>6} {:>6} {:>6}", "id", "driver", "speed", "accel", "handl");
    for racer in racers {
        println!(
            "{:>4}  {:<16} {:>6} {:>6} {:>6}",
            racer.id, racer.driver_name, racer.top_speed, racer.acceleration, racer.handling
        );
    }
    ExitCode::SUCCESS
}

async fn race(
    controller: Arc<RaceLifecycleController>,
    stream: EventStream,
    catalog: &Catalog,
    racer: RacerId,
    track: TrackId,
) -> ExitCode {
    let track_name = catalog
        .tracks
        .iter()
        .flatten()
        .find(|t| t.id == track)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| format!("Track {}", track));
    let racer_name = catalog
        .racers
        .iter()
        .flatten()
        .find(|r| r.id == racer)
        .map(|r| r.driver_name.clone())
        .unwrap_or_else(|| format!("Racer {}", racer));

    let mut router = InputEventRouter::new(controller, Handle::current());
    router.dispatch(UiEvent::TrackChosen {
        id: track,
        name: track_name,
    });
    router.dispatch(UiEvent::RacerChosen {
        id: racer,
        name: racer_name,
    });
    let Dispatched::Race(mut run) = router.dispatch(UiEvent::RaceSubmitted) else {
        return ExitCode::FAILURE;
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut frame = tokio::time::interval(FRAME);
    let mut view = RaceView::default();

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            line = lines.next_line(), if stdin_open && !view.ended => match line {
                Ok(Some(_)) => {
                    router.dispatch(UiEvent::AcceleratePressed);
                }
                _ => stdin_open = false,
            },
            _ = frame.tick() => view.render(&stream),
        }
    };
    view.render(&stream);

    match result {
        Ok(Ok(outcome)) if matches!(outcome.poll, PollOutcome::Finished(_)) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Race task failed");
            ExitCode::FAILURE
        }
    }
}

/// Terminal rendering of one race run
#[derive(Default)]
struct RaceView {
    /// Racer the run was submitted with, taken from `RaceCreated`
    user: Option<RacerId>,
    /// Set once a terminal event has been drawn; accelerate input stops
    ended: bool,
}

impl RaceView {
    /// Draw pending lifecycle events as terminal text
    fn render(&mut self, stream: &EventStream) {
        for event in stream.drain() {
            self.ended |= event.is_terminal();
            match event {
                LifecycleEvent::Selected { name, .. } => println!("{} is selected", name),
                LifecycleEvent::RaceCreated {
                    racer_id,
                    track_label,
                    ..
                } => {
                    self.user = Some(racer_id);
                    println!("Race: {}", track_label);
                    println!("Press Enter as fast as you can to make your racer go faster!");
                }
                LifecycleEvent::CountdownTick(remaining) => {
                    println!("Race starts in... {}", remaining)
                }
                LifecycleEvent::Progress(positions) => {
                    println!("{}", board_line("No.", &progress_board(&positions, self.user)))
                }
                LifecycleEvent::Finished(positions) => {
                    println!("Race Results");
                    for row in results_board(&positions, self.user) {
                        println!("{:>3}. {}", row.rank, row.label);
                    }
                    let mine = self
                        .user
                        .and_then(|user| user_position(&positions, user))
                        .and_then(|p| p.final_position);
                    if let Some(place) = mine {
                        println!("You finished #{}", place);
                    }
                }
                LifecycleEvent::Stopped(status) => println!("Race stopped ({})", status),
                LifecycleEvent::ValidationFailed(message) | LifecycleEvent::Error(message) => {
                    eprintln!("{}", message)
                }
                LifecycleEvent::Degraded { operation, message } => {
                    eprintln!("{} failed: {}", operation, message)
                }
                LifecycleEvent::TracksLoaded(_) | LifecycleEvent::RacersLoaded(_) => {}
            }
        }
    }
}

fn board_line(header: &str, rows: &[LeaderboardRow]) -> String {
    let cells: Vec<String> = rows
        .iter()
        .map(|row| format!("{}. {}", row.rank, row.label))
        .collect();
    format!("{} {}", header, cells.join(" | "))
}
