//! Create or update a ticket desk user directly in PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;

use ticket_desk::domain::ports::UserRepository;
use ticket_desk::domain::{DisplayName, Email, PasswordHash, Role, User, UserId};
use ticket_desk::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};

const PASSWORD_ENV: &str = "TICKET_DESK_NEW_PASSWORD";

/// `create-user` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-user",
    about = "Create a ticket desk user, or reset the name and password of an existing one",
    version
)]
struct CliArgs {
    /// Login email; matched case-insensitively against existing users.
    #[arg(long)]
    email: String,
    /// Display name shown on tickets and comments.
    #[arg(long)]
    name: String,
    /// Plain-text password. Falls back to `TICKET_DESK_NEW_PASSWORD` when omitted.
    #[arg(long)]
    password: Option<String>,
    /// Grant the administrator role.
    #[arg(long)]
    admin: bool,
    /// Database connection URL. Falls back to `TICKET_DESK_DATABASE_URL`, then
    /// `DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let database_url = resolve(
        args.database_url.clone(),
        &["TICKET_DESK_DATABASE_URL", "DATABASE_URL"],
    )
    .ok_or_else(|| eyre!("no database URL; pass --database-url or set DATABASE_URL"))?;
    let password = resolve(args.password.clone(), &[PASSWORD_ENV])
        .ok_or_else(|| eyre!("no password; pass --password or set {PASSWORD_ENV}"))?;

    run_pending_migrations(&database_url).wrap_err("prepare database schema")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("build Tokio runtime")?;
    runtime.block_on(async_main(args, database_url, password))
}

async fn async_main(args: CliArgs, database_url: String, password: String) -> Result<()> {
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;
    let users = DieselUserRepository::new(pool);

    let email = Email::new(&args.email).wrap_err("invalid --email")?;
    let existing = users
        .find_by_email(&email)
        .await
        .wrap_err("look up existing user")?;
    let created = existing.is_none();
    let user = apply(existing, email, &args.name, &password, args.admin)?;

    users.upsert(&user).await.wrap_err("store user")?;
    println!(
        "{} user {} <{}>",
        if created { "created" } else { "updated" },
        user.id(),
        user.email()
    );
    Ok(())
}

/// Build the user to store: a fresh account, or the existing one with its
/// name and password replaced. Existing roles are kept.
fn apply(
    existing: Option<User>,
    email: Email,
    name: &str,
    password: &str,
    admin: bool,
) -> Result<User> {
    let display_name = DisplayName::new(name).wrap_err("invalid --name")?;
    let hash = PasswordHash::derive(password).wrap_err("invalid password")?;

    let mut user = match existing {
        Some(mut user) => {
            user.set_display_name(display_name);
            user.set_password(hash);
            user
        }
        None => User::new(UserId::random(), email, display_name, hash),
    };
    if admin {
        user.grant(Role::Admin);
    }
    Ok(user)
}

/// First non-blank value from the flag or the named environment variables.
fn resolve(flag: Option<String>, vars: &[&str]) -> Option<String> {
    flag.into_iter()
        .chain(vars.iter().filter_map(|name| env::var(name).ok()))
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn email() -> Email {
        Email::new("grace@example.com").expect("valid email")
    }

    #[rstest]
    fn new_user_gets_baseline_role(email: Email) {
        let user = apply(None, email, "Grace", "compiler", false).expect("user");
        assert_eq!(user.display_name().as_str(), "Grace");
        assert!(user.password().verify("compiler"));
        assert!(!user.roles().contains(&Role::Admin));
    }

    #[rstest]
    fn existing_user_keeps_id_and_gains_admin(email: Email) {
        let original = User::new(
            UserId::random(),
            email.clone(),
            DisplayName::new("G").expect("name"),
            PasswordHash::derive("old").expect("hash"),
        );
        let id = *original.id();

        let user = apply(Some(original), email, "Grace Hopper", "new", true).expect("user");
        assert_eq!(*user.id(), id);
        assert_eq!(user.display_name().as_str(), "Grace Hopper");
        assert!(user.password().verify("new"));
        assert!(!user.password().verify("old"));
        assert!(user.roles().contains(&Role::Admin));
    }

    #[rstest]
    fn blank_name_is_rejected(email: Email) {
        let err = apply(None, email, "  ", "pw", false).expect_err("blank name");
        assert!(err.to_string().contains("--name"));
    }

    #[rstest]
    fn flag_wins_over_environment() {
        assert_eq!(
            resolve(Some("postgres://flag".into()), &["PATH"]),
            Some("postgres://flag".into())
        );
        assert_eq!(resolve(Some("  ".into()), &[]), None);
    }

    #[rstest]
    fn cli_parses_admin_flag() {
        let args = CliArgs::try_parse_from([
            "create-user",
            "--email",
            "a@example.com",
            "--name",
            "A",
            "--admin",
        ])
        .expect("valid args");
        assert!(args.admin);
        assert!(args.password.is_none());
    }
}
