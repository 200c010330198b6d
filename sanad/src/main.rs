// sanad - Arabic learning-journeys quiz companion with a talking mascot

mod caption;
mod config;
mod content;
mod mascot;
mod progress;
mod quiz;

use std::io::Write as _;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::debug;
use speech_client::{KNOWN_BACKENDS, LocalSpeech, QuotaState, SpeechOrchestrator};

use caption::CaptionEngine;
use config::SanadConfig;
use content::{College, Test};
use mascot::MascotState;
use progress::UserProgress;
use quiz::{Advance, NextAction, TestSession};

#[derive(Parser, Debug)]
#[command(name = "sanad")]
#[command(about = "Quiz companion for the Sanad learning journeys", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List colleges, unlocked levels and hearts
    Colleges,

    /// Run one quiz test for a college
    Quiz {
        /// College id (e.g. medicine)
        college: String,

        /// Test index to play (0-based)
        #[arg(short, long, default_value_t = 0)]
        test: usize,

        /// Voice identity for remote synthesis
        #[arg(short, long)]
        voice: Option<String>,

        /// Disable speech output (captions still animate)
        #[arg(long, default_value_t = false)]
        no_audio: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the remote synthesis voice
    SetVoice {
        /// Voice name to use
        voice: String,
    },
    /// Set the remote speech backend
    SetBackend {
        /// Backend name (e.g. gemini)
        backend: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Colleges => list_colleges(),
        Commands::Config { action } => handle_config_command(&action),
        Commands::Quiz {
            college,
            test,
            voice,
            no_audio,
        } => run_quiz(&college, test, voice, no_audio).await,
    }
}

fn list_colleges() -> Result<()> {
    let progress = UserProgress::load().context("Failed to load progress")?;
    let colleges = content::colleges();

    println!("منصة سند — الكليات المتاحة");
    println!("❤️  {} | ⭐ {}", progress.hearts, progress.xp);
    println!();

    for college in &colleges {
        println!("{} {} ({})", college.icon, college.name, college.id);
        for (index, test) in college.tests.iter().enumerate() {
            let marker = if progress.is_unlocked(&college.id, index) {
                "🔓"
            } else {
                "🔒"
            };
            println!("   {marker} [{index}] {}", test.title);
        }
        println!();
    }

    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = SanadConfig::load()?;
            println!("Configuration file: {:?}", SanadConfig::config_path()?);
            println!();
            println!("backend = \"{}\"", config.backend);
            println!("voice = \"{}\"", config.voice);
            println!("audio = {}", config.audio);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = SanadConfig::load()?;
            config.voice = voice.clone();
            config.save()?;
            println!("Default voice set to: {voice}");
        }
        ConfigAction::SetBackend { backend } => {
            if !KNOWN_BACKENDS.contains(&backend.as_str()) {
                bail!(
                    "Unknown speech backend: {}. Available: {}",
                    backend,
                    KNOWN_BACKENDS.join(", ")
                );
            }
            let mut config = SanadConfig::load()?;
            config.backend = backend.clone();
            config.save()?;
            println!("Default backend set to: {backend}");
        }
    }
    Ok(())
}

async fn run_quiz(
    college_id: &str,
    test_index: usize,
    voice_override: Option<String>,
    no_audio: bool,
) -> Result<()> {
    let config = SanadConfig::load().context("Failed to load configuration")?;
    let colleges = content::colleges();
    let college = content::find_college(&colleges, college_id).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown college: {}. Available: {}",
            college_id,
            colleges
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    let test = college
        .tests
        .get(test_index)
        .ok_or_else(|| anyhow::anyhow!("College {} has no test {}", college_id, test_index))?;

    let mut progress = UserProgress::load().context("Failed to load progress")?;
    if !progress.is_unlocked(college_id, test_index) {
        bail!(
            "Test {} is still locked for {} (unlocked up to {})",
            test_index,
            college_id,
            progress.unlocked_index(college_id)
        );
    }

    let speech = build_orchestrator(&config, voice_override, no_audio);
    let mut captions = CaptionEngine::new();
    let mut mascot = MascotState::Idle;
    let mut fallback_note_shown = false;

    print_quiz_header(college, test);

    let mut session = TestSession::new(college_id, test_index, test.clone());
    loop {
        let question = session.current_question().clone();

        println!();
        println!(
            "السؤال {} من {} | ❤️  {} | النقاط: {}",
            session.current_index() + 1,
            session.total_questions(),
            progress.hearts,
            session.score()
        );

        mascot = speak_line(
            &speech,
            &mut captions,
            mascot,
            &question.text,
            caption::QUESTION_FLOOR_SECONDS,
            &mut fallback_note_shown,
        )
        .await;

        for (index, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", index + 1);
        }

        let selected = read_selection(question.options.len())?;
        session.select(selected);

        // The mascot scribbles the answer down for a moment before the
        // check happens
        mascot = mascot.on_select();
        println!("{} منصور يدوّن إجابتك...", mascot.face());
        tokio::time::sleep(mascot::WRITING_HOLD).await;
        mascot = mascot.on_writing_elapsed(session.attempt().is_checked);

        let outcome = session.check().context("Check without a selection")?;
        mascot = outcome.mascot;
        debug!(
            "Question {} checked, correct: {:?}",
            session.attempt().question_id,
            session.attempt().is_correct
        );

        if outcome.correct {
            println!("{} أحسنت يا بطل!", mascot.face());
        } else {
            println!("{} معليش، منصور يعلمك", mascot.face());
            println!(
                "الجواب الصح هو: {}",
                question.options[question.correct_answer_index]
            );
        }
        println!("💡 {}", question.explanation);

        progress.submit_answer(&session.college_id, session.test_index, outcome.correct);

        mascot = speak_line(
            &speech,
            &mut captions,
            mascot,
            outcome.feedback,
            caption::FEEDBACK_FLOOR_SECONDS,
            &mut fallback_note_shown,
        )
        .await;

        match session.advance() {
            Advance::Next => {
                wait_for_enter("اضغط Enter للاستمرار...")?;
            }
            Advance::Complete(result) => {
                // Leaving the quiz view: nothing timer-driven may survive
                captions.cancel();
                show_results(
                    &speech,
                    &mut captions,
                    &mut progress,
                    &session,
                    result,
                    &mut fallback_note_shown,
                )
                .await?;
                break;
            }
        }
    }

    Ok(())
}

fn build_orchestrator(
    config: &SanadConfig,
    voice_override: Option<String>,
    no_audio: bool,
) -> SpeechOrchestrator {
    let voice = voice_override.unwrap_or_else(|| config.voice.clone());

    if no_audio || !config.audio {
        return SpeechOrchestrator::new(
            None,
            LocalSpeech::unavailable(),
            QuotaState::new(),
            &voice,
        );
    }

    // A missing API key just means the on-device voice carries the session;
    // speech problems are never fatal to the quiz
    let remote = match speech_client::create_backend(&config.backend) {
        Ok(backend) => Some(backend),
        Err(e) => {
            debug!("Remote speech backend unavailable: {e}");
            None
        }
    };

    SpeechOrchestrator::new(remote, LocalSpeech::discover(), QuotaState::new(), &voice)
}

fn print_quiz_header(college: &College, test: &Test) {
    debug!("Starting test {}", test.id);
    println!();
    println!("{} {} — {}", college.icon, college.name, test.title);
    println!("{}", test.description);
}

/// Speak one line and reveal it word-by-word on stdout, returning the
/// mascot state once the reveal completes
async fn speak_line(
    speech: &SpeechOrchestrator,
    captions: &mut CaptionEngine,
    mascot: MascotState,
    text: &str,
    floor_seconds: f64,
    fallback_note_shown: &mut bool,
) -> MascotState {
    let result = speech.speak(text).await;
    debug!(
        "Utterance took the {:?} path, {:.2}s",
        result.source, result.duration_seconds
    );

    if speech.is_fallback_active() && !*fallback_note_shown {
        *fallback_note_shown = true;
        println!("ℹ️  يعمل الصوت الآن بجودة اقتصادية لتوفير الموارد.");
    }

    let talking = mascot.on_utterance_start();
    print!("{} ", talking.face());
    let _ = std::io::stdout().flush();

    let mut printed = 0usize;
    let handle = captions.start(
        text,
        result.duration_seconds,
        floor_seconds,
        move |revealed| {
            // The prefix only ever grows, so printing the new tail keeps
            // the words appearing in place
            print!("{}", &revealed[printed..]);
            let _ = std::io::stdout().flush();
            printed = revealed.len();
        },
        || {},
    );

    handle.wait().await;
    println!();

    talking.on_reveal_done()
}

fn read_selection(option_count: usize) -> Result<usize> {
    loop {
        print!("اختيارك (1-{option_count}): ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            bail!("Input closed before an answer was chosen");
        }

        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=option_count).contains(&choice) => return Ok(choice - 1),
            _ => println!("اختر رقماً من 1 إلى {option_count}"),
        }
    }
}

fn wait_for_enter(prompt: &str) -> Result<()> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(())
}

async fn show_results(
    speech: &SpeechOrchestrator,
    captions: &mut CaptionEngine,
    progress: &mut UserProgress,
    session: &TestSession,
    result: quiz::TestResult,
    fallback_note_shown: &mut bool,
) -> Result<()> {
    let verdict = quiz::evaluate(result);
    let passed = progress.on_test_complete(
        &session.college_id,
        session.test_index,
        result.score,
        result.total,
    );
    progress.save().context("Failed to save progress")?;

    println!();
    println!("━━━━━━ نتيجتك النهائية ━━━━━━");
    println!(
        "{}  {} من {}",
        MascotState::on_results(passed).face(),
        result.score,
        result.total
    );

    speak_line(
        speech,
        captions,
        MascotState::on_results(passed),
        quiz::result_feedback(verdict),
        caption::FEEDBACK_FLOOR_SECONDS,
        fallback_note_shown,
    )
    .await;

    match verdict.next_action() {
        NextAction::NextLevel => println!(
            "🚀 المستوى التالي بانتظارك: sanad quiz {} --test {}",
            session.college_id,
            session.test_index + 1
        ),
        NextAction::Retry => println!(
            "🔄 أعد المحاولة: sanad quiz {} --test {}",
            session.college_id, session.test_index
        ),
    }

    Ok(())
}
