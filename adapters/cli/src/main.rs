#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a fortune wheel session headlessly.

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use fortune_wheel_content::{load_response_bank, AnimationIndex, GameConfig, ResultsSnapshot};
use fortune_wheel_core::{AudioPort, Phase, SessionEvent};
use fortune_wheel_system_draw_sequencer::{
    DrawSequencer, FirstDraw, SequencerConfig, SessionContent,
};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

type Session = DrawSequencer<ChaCha8Rng, LoggedAudio, AnimationIndex>;

/// Simulated time a single draw may take before the session is abandoned.
const DRAW_TIME_LIMIT: Duration = Duration::from_secs(600);

#[derive(Debug, Parser)]
#[command(name = "fortune-wheel", version, about = "Plays a multi-draw fortune wheel session")]
struct Args {
    /// Game configuration with the questions and their candidates.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    /// Response bank keyed by draw number and tier.
    #[arg(long, default_value = "data/TextResp.json")]
    responses: PathBuf,
    /// Directory holding `<ordinal>.<tier>.gif` reveal animations.
    #[arg(long, default_value = "assets/gifs")]
    animations: PathBuf,
    /// Seed for every random draw; chosen at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
    /// Wait for a trigger before the first spin instead of spinning immediately.
    #[arg(long)]
    await_first: bool,
    /// Writes the results as JSON to this path.
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Audio port that reports signals through the log.
#[derive(Debug, Default)]
struct LoggedAudio;

impl AudioPort for LoggedAudio {
    fn on_spin_start(&mut self) {
        debug!("audio: spin start");
    }

    fn on_spin_stop(&mut self) {
        debug!("audio: spin stop");
    }
}

/// Entry point for the fortune wheel command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let snapshot = play(&args)?;

    println!("Results");
    for draw in &snapshot.draws {
        if let Some(question) = &draw.question {
            println!("{}. {question}", draw.draw);
        }
        println!(
            "   {} ({}.{}): {}",
            draw.label, draw.ordinal, draw.tier, draw.flavor_text
        );
    }

    if let Some(path) = &args.save {
        snapshot
            .save(path)
            .with_context(|| format!("failed to save results to {}", path.display()))?;
    }
    Ok(())
}

fn play(args: &Args) -> Result<ResultsSnapshot> {
    let config = GameConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let draws = config
        .wheel_specs()
        .context("configuration describes an unusable wheel")?;
    let responses = load_response_bank(&args.responses)
        .with_context(|| format!("failed to load {}", args.responses.display()))?;
    let content =
        SessionContent::new(draws, responses).context("configuration contains no questions")?;
    let animations = AnimationIndex::scan(&args.animations)
        .with_context(|| format!("failed to scan {}", args.animations.display()))?;

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("session seed {seed}");

    let first_draw = if args.await_first {
        FirstDraw::AwaitTrigger
    } else {
        FirstDraw::AutoSpin
    };
    let mut sequencer: Session = DrawSequencer::new(
        content,
        ChaCha8Rng::seed_from_u64(seed),
        LoggedAudio,
        animations,
        SequencerConfig {
            first_draw,
            ..SequencerConfig::default()
        },
    );

    let dt = Duration::from_secs_f64(1.0 / f64::from(args.fps));
    let draws = u32::try_from(sequencer.total_draws()).unwrap_or(u32::MAX);
    let time_limit = DRAW_TIME_LIMIT.saturating_mul(draws);
    let mut elapsed = Duration::ZERO;
    let mut events = Vec::new();

    while sequencer.phase() != Phase::Results {
        if elapsed > time_limit {
            bail!(
                "session did not finish within {:.0} simulated seconds",
                time_limit.as_secs_f64()
            );
        }

        let _ = sequencer.trigger_spin(&mut events);
        sequencer
            .update(dt, &mut events)
            .with_context(|| format!("draw {} failed", sequencer.current_draw() + 1))?;
        elapsed += dt;

        for event in events.drain(..) {
            report(&event, &sequencer);
        }
    }

    let records = sequencer.final_records()?;
    Ok(ResultsSnapshot::from_records(records, &config))
}

fn report(event: &SessionEvent, sequencer: &Session) {
    match event {
        SessionEvent::DrawResolved { draw, record } => println!(
            "Draw {}: {} ({}) - {}",
            draw + 1,
            record.selection.segment_label(),
            record.selection.outcome_key(),
            record.flavor_text
        ),
        SessionEvent::RevealStarted { animated: true, .. } => {
            if let Some(asset) = sequencer.reveal_animation() {
                info!("playing {}", asset.path.display());
            }
        }
        other => debug!("{other:?}"),
    }
}
