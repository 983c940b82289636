use std::fmt;

use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{Role, UserProfile};
use storage::keys;
use storage::repository::Stores;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into());
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>    SQLite URL (default: sqlite:quiz.sqlite3)");
    eprintln!("  --now <rfc3339>      Fixed current time for deterministic seeding");
    eprintln!("  -h, --help           Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL");
}

struct DemoUser {
    email: &'static str,
    name: &'static str,
    days_ago: i64,
    quizzes_taken: u32,
    average_score: u32,
}

const DEMO_USERS: [DemoUser; 3] = [
    DemoUser {
        email: "user1@example.com",
        name: "Alisher Zokirov",
        days_ago: 0,
        quizzes_taken: 5,
        average_score: 78,
    },
    DemoUser {
        email: "user2@example.com",
        name: "Malika Rahimova",
        days_ago: 1,
        quizzes_taken: 3,
        average_score: 92,
    },
    DemoUser {
        email: "user3@example.com",
        name: "Bobur Karimov",
        days_ago: 2,
        quizzes_taken: 8,
        average_score: 65,
    },
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let stores = Stores::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    for user in &DEMO_USERS {
        let profile = UserProfile::new(user.email, user.name, Role::User, None)?;
        stores.profiles.upsert_directory_entry(&profile).await?;

        let last_active = now - Duration::days(user.days_ago);
        stores
            .raw()
            .set(
                &keys::last_active(user.email),
                &last_active.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            )
            .await?;
        stores
            .raw()
            .set(
                &keys::quizzes_taken(user.email),
                &user.quizzes_taken.to_string(),
            )
            .await?;
        let total = u64::from(user.average_score) * u64::from(user.quizzes_taken);
        stores
            .raw()
            .set(&keys::total_score(user.email), &total.to_string())
            .await?;
    }

    println!(
        "Seeded {} demo users into {}",
        DEMO_USERS.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
