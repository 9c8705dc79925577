use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, RegisterUserParams};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use token::TokenMaker;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser, Debug)]
#[command(name = "tripsplit_admin")]
#[command(about = "Admin utilities for Tripsplit (schema, users, categories, invitations, tokens)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tripsplit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
    User(User),
    Category(Category),
    Invitation(Invitation),
    Token(TokenArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, default_value = "UTC")]
    time_zone: String,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(CategoryCreateArgs),
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Invitation {
    #[command(subcommand)]
    command: InvitationCommand,
}

#[derive(Subcommand, Debug)]
enum InvitationCommand {
    /// Print the code of a user's latest invitation into a group, for
    /// delivery to the invitee. The API never returns it to the inviter.
    Code(InvitationCodeArgs),
}

#[derive(Args, Debug)]
struct InvitationCodeArgs {
    #[arg(long)]
    group_id: i64,
    #[arg(long)]
    invitee_id: i64,
}

#[derive(Args, Debug)]
struct TokenArgs {
    #[command(subcommand)]
    command: TokenCommand,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Print an access token for an existing user.
    Issue(TokenIssueArgs),
}

#[derive(Args, Debug)]
struct TokenIssueArgs {
    #[arg(long)]
    user_id: i64,
    #[arg(long, default_value_t = 900)]
    duration_secs: i64,
    /// Same key the server signs with.
    #[arg(long, env = "TRIPSPLIT__TOKEN__SYMMETRIC_KEY", hide_env_values = true)]
    symmetric_key: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Ask for the new user's password, hidden, until both entries match.
fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < MIN_PASSWORD_LEN {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters.\r\n"
                ))
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
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
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Migrate => {
            println!("database is up to date");
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            let result = engine
                .register_user(RegisterUserParams {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    email: args.email.clone(),
                    phone: args.phone,
                    password,
                    image_path: String::new(),
                    time_zone: args.time_zone,
                })
                .await;
            match result {
                Ok(user) => println!("created user: {} ({})", args.email, user.id),
                Err(EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.email);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Category(Category {
            command: CategoryCommand::Create(args),
        }) => {
            let category = engine.create_category(&args.name).await?;
            println!("created category: {} ({})", category.name, category.id);
        }
        Command::Invitation(Invitation {
            command: InvitationCommand::Code(args),
        }) => {
            let invitation = match engine
                .queries()
                .get_current_invitation(args.group_id, args.invitee_id)
                .await
            {
                Ok(invitation) => invitation,
                Err(EngineError::KeyNotFound(_)) => {
                    eprintln!(
                        "no invitation for user {} in group {}",
                        args.invitee_id, args.group_id
                    );
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };
            eprintln!("status: {}", invitation.status.as_str());
            println!("{}", invitation.code);
        }
        Command::Token(TokenArgs {
            command: TokenCommand::Issue(args),
        }) => {
            let user = match engine.user(args.user_id).await {
                Ok(user) => user,
                Err(EngineError::KeyNotFound(_)) => {
                    eprintln!("user not found: {}", args.user_id);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };

            let tokens = TokenMaker::new(args.symmetric_key.as_bytes())?;
            let (token, payload) =
                tokens.create_token(user.id, chrono::Duration::seconds(args.duration_secs))?;
            eprintln!("expires at {}", payload.expired_at);
            println!("{token}");
        }
    }

    Ok(())
}
