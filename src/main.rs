use std::process::ExitCode;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use wordica::audio::{AudioSink, MicRecorder, Recorder, SpeakerSink};
use wordica::{
    ApiClient, Category, Config, FeedbackKind, Session, SpeechBackend, TurnPhase, TurnSequencer,
};

/// Wordica - voice-driven vocabulary practice
#[derive(Parser)]
#[command(name = "wordica", version, about)]
struct Cli {
    /// Base URL of the speech backend
    #[arg(long, env = "WORDICA_API_BASE")]
    api_base: Option<String>,

    /// Category to practice (animals, fruits, numbers, ...)
    #[arg(short, long)]
    category: Option<Category>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Synthesize and play a phrase through the backend
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! Welcome to Wordica.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,wordica=info",
        1 => "info,wordica=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::Say { text } => say(cli.api_base.as_deref(), &text).await,
        };
    }

    let config = Config::load(cli.api_base.as_deref(), cli.category)?;
    tracing::debug!(?config, "loaded configuration");

    run_practice(config).await
}

/// Run the interactive practice loop
#[allow(clippy::future_not_send, clippy::too_many_lines)]
async fn run_practice(config: Config) -> anyhow::Result<()> {
    let backend = ApiClient::new(&config.api_base, config.request_timeout_secs)?;
    let recorder = MicRecorder::new()?;
    let player = SpeakerSink::new()?;

    let session = Arc::new(Mutex::new(Session::new(config.category)));
    let mut sequencer = TurnSequencer::new(
        Arc::clone(&session),
        backend,
        recorder,
        player,
        config.cache_dir.clone(),
    );

    println!("Wordica: practicing {}", config.category);
    println!("Commands: <enter> record/stop, next, prev, repeat, cat <name>, status, quit");
    print_card(&session);

    // First item is spoken once automatically
    if let Err(e) = sequencer.speak_current(false).await {
        tracing::warn!(error = %e, "prompt playback failed");
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(&mut sequencer, &session, line.trim()).await {
                    break;
                }
            }
        }
    }

    tracing::info!("practice session ended");
    Ok(())
}

/// Dispatch one console command; returns false to quit
#[allow(clippy::future_not_send)]
async fn handle_command<B, R, P>(
    sequencer: &mut TurnSequencer<B, R, P>,
    session: &Arc<Mutex<Session>>,
    input: &str,
) -> bool
where
    B: SpeechBackend,
    R: Recorder,
    P: AudioSink,
{
    match input {
        "" | "rec" | "r" => {
            let recording = lock_session(session).phase() == TurnPhase::Recording;
            if recording {
                match sequencer.finish_turn().await {
                    Ok(Some(report)) => {
                        let kind = sequencer
                            .feedback()
                            .kind_at(Instant::now())
                            .unwrap_or(if report.correct {
                                FeedbackKind::Correct
                            } else {
                                FeedbackKind::Wrong
                            });
                        println!("{}", flash_line(kind, &report.heard));
                        print_card(session);
                        if let Err(e) = sequencer.speak_current(false).await {
                            tracing::warn!(error = %e, "prompt playback failed");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "turn abandoned"),
                }
            } else {
                match sequencer.start_recording() {
                    Ok(true) => println!("  recording... press enter to stop"),
                    Ok(false) => println!("  busy, wait for the reply to finish"),
                    Err(e) => tracing::warn!(error = %e, "could not start recording"),
                }
            }
        }
        "next" | "n" => {
            lock_session(session).go_next();
            print_card(session);
            if let Err(e) = sequencer.speak_current(false).await {
                tracing::warn!(error = %e, "prompt playback failed");
            }
        }
        "prev" | "p" => {
            lock_session(session).go_prev();
            print_card(session);
            if let Err(e) = sequencer.speak_current(false).await {
                tracing::warn!(error = %e, "prompt playback failed");
            }
        }
        "repeat" => {
            if let Err(e) = sequencer.speak_current(true).await {
                tracing::warn!(error = %e, "prompt playback failed");
            }
        }
        "status" => print_card(session),
        "quit" | "q" => return false,
        other => {
            if let Some(name) = other.strip_prefix("cat ") {
                match name.parse::<Category>() {
                    Ok(cat) => {
                        lock_session(session).select_category(cat);
                        print_card(session);
                        if let Err(e) = sequencer.speak_current(false).await {
                            tracing::warn!(error = %e, "prompt playback failed");
                        }
                    }
                    Err(e) => println!("  {e}"),
                }
            } else {
                println!("  unknown command: {other}");
            }
        }
    }
    true
}

/// Lock the shared session, recovering the data from a poisoned mutex
fn lock_session(session: &Arc<Mutex<Session>>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Render the feedback flash as a colored result line
fn flash_line(kind: FeedbackKind, heard: &str) -> String {
    match kind {
        FeedbackKind::Correct => "  \x1b[32mcorrect!\x1b[0m".to_string(),
        FeedbackKind::Wrong => format!("  \x1b[31mheard \"{heard}\", try again\x1b[0m"),
    }
}

/// Print the current item and the progress dots
fn print_card(session: &Arc<Mutex<Session>>) {
    let session = lock_session(session);
    let dots: String = (0..session.items().len())
        .map(|i| {
            let dot = match session.outcome(i) {
                Some(wordica::Outcome::Correct) => '+',
                Some(wordica::Outcome::Wrong) => 'x',
                None => '.',
            };
            if i == session.index() {
                format!("[{dot}]")
            } else {
                format!(" {dot} ")
            }
        })
        .collect();

    let prev = if session.can_go_prev() { "<" } else { " " };
    let next = if session.can_go_next() { ">" } else { " " };
    println!(
        "{} {:^12} {}  {}",
        prev,
        session.current_item(),
        next,
        dots
    );
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut recorder = MicRecorder::new()?;
    recorder.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = recorder.peek_samples();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    let wav = recorder.stop()?;
    println!("\nCaptured {} bytes of WAV audio.", wav.len());
    println!("If you saw movement in the meter, your mic is working!");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let sample_rate = 16000_u32;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    let wav = wordica::audio::samples_to_wav(&samples, sample_rate)?;

    let mut player = SpeakerSink::new()?;
    player.play_to_end(&wav).await?;

    println!("If you heard the tone, your speakers are working!");
    Ok(())
}

/// Synthesize a phrase through the backend and play it
#[allow(clippy::future_not_send)]
async fn say(api_base: Option<&str>, text: &str) -> anyhow::Result<()> {
    let config = Config::load(api_base, None)?;
    let backend = ApiClient::new(&config.api_base, config.request_timeout_secs)?;

    println!("Synthesizing: \"{text}\"");
    let audio = backend.synthesize(text).await?;
    println!("Got {} bytes of audio data", audio.len());

    let mut player = SpeakerSink::new()?;
    player.play_to_end(&audio).await?;

    Ok(())
}
