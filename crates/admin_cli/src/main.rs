use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal,
};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "bottega_admin")]
#[command(about = "Admin utilities for Bottega (provision merchant accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./bottega.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Merchant(Merchant),
}

#[derive(Args, Debug)]
struct Merchant {
    #[command(subcommand)]
    command: MerchantCommand,
}

#[derive(Subcommand, Debug)]
enum MerchantCommand {
    Create(MerchantCreateArgs),
}

#[derive(Args, Debug)]
struct MerchantCreateArgs {
    #[arg(long)]
    username: String,
}

/// Prompt on stderr and read a line with echo disabled.
fn read_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    write!(out, "{prompt}")?;
    out.flush()?;

    terminal::enable_raw_mode()?;
    let input = read_line_hidden();
    let _ = terminal::disable_raw_mode();
    writeln!(out)?;

    input
}

fn read_line_hidden() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => return Ok(buf),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => buf.push(ch),
            _ => {}
        }
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Merchant(Merchant {
            command: MerchantCommand::Create(args),
        }) => {
            let password = read_password("Password: ")?;
            if password.is_empty() {
                eprintln!("password must not be empty");
                std::process::exit(2);
            }
            if read_password("Confirm password: ")? != password {
                eprintln!("passwords do not match");
                std::process::exit(2);
            }

            // The CLI never issues tokens; the engine only requires a
            // non-empty secret to build.
            let engine = Engine::builder()
                .database(db)
                .token_secret("bottega-admin")
                .build()
                .await?;

            match engine.bootstrap_merchant(&args.username, &password).await {
                Ok(user) => println!("created merchant: {}", user.username),
                Err(EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.username);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}
