use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

use quiz_core::model::{FeedbackToken, QuizSession};
use quiz_core::scheduler::{FeedbackScheduler, ScheduleHandle};
use quiz_core::Clock;
use services::{
    CatalogConfig, CatalogLoader, HttpCatalogLoader, QuestionFactory, QuizError, QuizLoopService,
    QuizStep, StaticCatalogLoader, StatisticsService, StepAdvance,
};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuestions { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    questions_amount: u32,
    api_key: Option<String>,
    api_url: Option<String>,
    offline: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--questions <n>]");
    eprintln!("                      [--api-key <key>] [--api-url <url>] [--offline]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --questions 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTIONS, QUIZ_API_KEY, QUIZ_API_URL");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut questions_amount = std::env::var("QUIZ_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(10);
        let mut api_key = None;
        let mut api_url = None;
        let mut offline = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    questions_amount = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuestions { raw: value.clone() })?;
                }
                "--api-key" => api_key = Some(require_value(args, "--api-key")?),
                "--api-url" => api_url = Some(require_value(args, "--api-url")?),
                "--offline" => offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            questions_amount,
            api_key,
            api_url,
            offline,
        })
    }

    fn catalog_loader(&self) -> Arc<dyn CatalogLoader> {
        if self.offline {
            return Arc::new(StaticCatalogLoader::bundled());
        }

        let config = match (&self.api_key, &self.api_url) {
            (Some(key), url) => Some(CatalogConfig {
                base_url: url.clone().unwrap_or_else(|| {
                    "https://tv-api.com/en/API/MostPopularMovies".into()
                }),
                api_key: key.clone(),
            }),
            (None, _) => CatalogConfig::from_env(),
        };

        match config {
            Some(config) => Arc::new(HttpCatalogLoader::new(config)),
            None => {
                tracing::info!("no API key configured; using the bundled catalog");
                Arc::new(StaticCatalogLoader::bundled())
            }
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Delivers scheduled feedback tokens into the app's event channel.
struct TokioScheduler {
    tx: mpsc::UnboundedSender<FeedbackToken>,
}

impl TokioScheduler {
    fn new() -> (Self, mpsc::UnboundedReceiver<FeedbackToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FeedbackScheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, token: FeedbackToken) -> ScheduleHandle {
        let handle = ScheduleHandle::new();
        let guard = handle.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !guard.is_cancelled() {
                let _ = tx.send(token);
            }
        });
        handle
    }
}

type Input = Lines<BufReader<Stdin>>;

enum RoundEnd {
    Replay,
    Quit,
}

/// Prompt until the player answers yes, no, or quits.
async fn read_answer(input: &mut Input) -> Option<bool> {
    loop {
        print_prompt("Your answer [y/n, q to quit]: ");
        let line = match input.next_line().await {
            Ok(Some(line)) => line,
            // EOF or a broken pipe ends the game.
            Ok(None) | Err(_) => return None,
        };
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Some(true),
            "n" | "no" => return Some(false),
            "q" | "quit" => return None,
            _ => println!("Please answer y or n."),
        }
    }
}

async fn confirm(input: &mut Input, prompt: &str) -> bool {
    print_prompt(prompt);
    matches!(
        input.next_line().await,
        Ok(Some(line)) if matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    )
}

fn print_prompt(prompt: &str) {
    use std::io::Write;
    print!("{prompt}");
    let _ = std::io::stdout().flush();
}

fn show_step(step: &QuizStep) {
    println!();
    println!("Question {} [artwork: {}]", step.counter, step.question.image().as_str());
    println!("{}", step.question.text());
}

async fn run_round(
    service: &QuizLoopService,
    session: &mut QuizSession,
    scheduler: &TokioScheduler,
    elapsed: &mut mpsc::UnboundedReceiver<FeedbackToken>,
    input: &mut Input,
) -> Result<RoundEnd, QuizError> {
    let mut step = service.begin(session).await?;

    loop {
        show_step(&step);

        let Some(answer) = read_answer(input).await else {
            return Ok(RoundEnd::Quit);
        };

        let outcome = service.answer(session, answer)?;
        println!("{}", if outcome.is_correct { "Correct!" } else { "Wrong!" });
        let handle = scheduler.schedule_after(service.feedback_interval(), outcome.token);

        loop {
            let Some(token) = elapsed.recv().await else {
                return Ok(RoundEnd::Quit);
            };
            match service.advance(session, token).await {
                // A stale timer from a superseded round; keep waiting.
                Ok(StepAdvance::Ignored) => {}
                Ok(StepAdvance::Next(next)) => {
                    step = next;
                    break;
                }
                Ok(StepAdvance::Finished(report)) => {
                    println!();
                    println!("Round over!");
                    println!("{}", report.message);
                    if confirm(input, "Play again? [y/n]: ").await {
                        return Ok(RoundEnd::Replay);
                    }
                    return Ok(RoundEnd::Quit);
                }
                Err(err) => {
                    // No pause may advance whatever round comes next.
                    handle.cancel();
                    return Err(err);
                }
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    let clock = Clock::default_clock();
    let statistics = Arc::new(StatisticsService::new(clock, Arc::clone(&storage.stats)));
    let factory = Arc::new(QuestionFactory::new(args.catalog_loader()));
    let service = QuizLoopService::new(clock, factory, Arc::clone(&statistics));

    let mut session = QuizSession::new(args.questions_amount)?;
    let (scheduler, mut elapsed) = TokioScheduler::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "Movie quiz: {} yes/no questions. Rounds played so far: {}.",
        args.questions_amount,
        statistics.games_count().await?
    );

    loop {
        match run_round(&service, &mut session, &scheduler, &mut elapsed, &mut input).await {
            Ok(RoundEnd::Replay) => {}
            Ok(RoundEnd::Quit) => break,
            Err(err) => {
                // Recoverable by contract: show the failure and offer a
                // retry that begins a fresh round.
                println!();
                println!("Something went wrong: {err}");
                if !confirm(&mut input, "Try again? [y/n]: ").await {
                    break;
                }
            }
        }
    }

    println!("Thanks for playing!");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
