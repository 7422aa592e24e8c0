use std::env;
use std::fs;
use std::process;

use fretscroll::audio::{AudioGateway, SampleBackend};
use fretscroll::events::{Event, Topic};
use fretscroll::{AudioError, Command, Session, TrainerConfig};

/// Writes every triggered sample to the log instead of a sound card
struct LogBackend;

impl SampleBackend for LogBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn trigger(&mut self, sample_key: &str, duration_secs: f64) -> Result<(), AudioError> {
        tracing::info!("♪ {} ({:.2}s)", sample_key, duration_secs);
        Ok(())
    }
}

struct Options {
    config_path: Option<String>,
    seed: Option<u64>,
    tempo: Option<u16>,
    ticks: usize,
}

fn usage() -> ! {
    eprintln!("Usage: fretscroll [--config <file.yaml>] [--seed <n>] [--tempo <bpm>] [--ticks <n>]");
    process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        config_path: None,
        seed: None,
        tempo: None,
        ticks: 1200,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).unwrap_or_else(|| usage());
        match args[i].as_str() {
            "--config" => options.config_path = Some(value.clone()),
            "--seed" => options.seed = Some(value.parse().unwrap_or_else(|_| usage())),
            "--tempo" => options.tempo = Some(value.parse().unwrap_or_else(|_| usage())),
            "--ticks" => options.ticks = value.parse().unwrap_or_else(|_| usage()),
            _ => usage(),
        }
        i += 2;
    }
    options
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    // Read config
    let source = match &options.config_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => String::new(),
    };

    let mut config = match TrainerConfig::from_yaml(&source) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let mut session = match Session::new(config, AudioGateway::new(Box::new(LogBackend))) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Could not start session: {}", e);
            process::exit(1);
        }
    };

    session.subscribe(Topic::NoteActivated, |event| {
        if let Event::NoteActivated { pitch, string, fret, .. } = event {
            tracing::info!("{} -> string {} fret {}", pitch, string, fret);
        }
    });

    if !session.initialize_audio() {
        tracing::warn!("continuing without audio");
    }
    if let Some(bpm) = options.tempo {
        session.execute(Command::SetTempo(bpm));
    }
    session.execute(Command::Play);

    for _ in 0..options.ticks {
        session.tick_frame();
        if session.timeline().is_complete() {
            break;
        }
    }

    let played = session.timeline().notes().iter().filter(|n| n.played).count();
    println!(
        "{}: {}/{} notes played at {} bpm in {:.1}s",
        session.current_pattern_name().unwrap_or("-"),
        played,
        session.timeline().notes().len(),
        session.transport().tempo_bpm,
        session.clock_ms() / 1000.0
    );
}
