use std::error::Error;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use engine::{Engine, FileStorage, Storage, UserRole, keys};

const ALL_KEYS: [&str; 6] = [
    keys::APPOINTMENTS,
    keys::FINANCES,
    keys::SERVICES,
    keys::MATERIALS,
    keys::CLIENTS,
    keys::USERS,
];

#[derive(Parser, Debug)]
#[command(name = "salone_admin")]
#[command(about = "Admin utilities for Salone (bootstrap storage/users)")]
struct Cli {
    /// Snapshot directory (also read from `SALONE_STORAGE`).
    #[arg(long, env = "SALONE_STORAGE", default_value = "./data")]
    storage: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create missing snapshots and seed the default provider accounts.
    Init,
    /// Reset every snapshot to an empty collection.
    Clear,
    User(User),
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
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "cosmetologist", value_parser = parse_role)]
    role: UserRole,
}

fn parse_role(raw: &str) -> Result<UserRole, String> {
    match raw {
        "cosmetologist" => Ok(UserRole::Cosmetologist),
        "admin" => Ok(UserRole::Admin),
        other => Err(format!("unknown role: {other}")),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let storage = Arc::new(FileStorage::new(&cli.storage)?);

    match cli.command {
        Command::Init => init(storage)?,
        Command::Clear => clear(storage.as_ref())?,
        Command::User(user) => match user.command {
            UserCommand::Create(args) => {
                let mut engine = Engine::builder().storage(storage).build()?;
                let user = engine.add_user(args.username, args.password, args.name, args.role)?;
                println!("created user {} ({})", user.username, user.id);
            }
        },
    }

    Ok(())
}

/// Mirrors first-run setup: every snapshot key exists afterwards, and the two
/// default provider accounts are available when no users were stored yet.
fn init(storage: Arc<FileStorage>) -> Result<(), Box<dyn Error>> {
    for key in ALL_KEYS {
        if storage.load(key)?.is_none() {
            storage.save(key, "[]")?;
            println!("created empty snapshot \"{key}\"");
        }
    }

    let mut engine = Engine::builder().storage(storage).build()?;
    if engine.users().is_empty() {
        for (username, password, name) in [
            ("anna", "anna123", "Анна"),
            ("maria", "maria123", "Мария"),
        ] {
            engine.add_user(
                username.to_string(),
                password.to_string(),
                name.to_string(),
                UserRole::Cosmetologist,
            )?;
            println!("created default user {username}");
        }
    } else {
        println!("users already present, skipping defaults");
    }

    Ok(())
}

fn clear(storage: &FileStorage) -> Result<(), Box<dyn Error>> {
    for key in ALL_KEYS {
        storage.save(key, "[]")?;
    }
    println!("storage cleared");
    Ok(())
}
