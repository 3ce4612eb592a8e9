//! Operator CLI.
//!
//! # Responsibility
//! - Apply schema migrations to a database file outside the server.
//! - Provision accounts, including the first ADMIN.
//! - Print core version information for quick local sanity checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use internhub_core::auth::MIN_SECRET_BYTES;
use internhub_core::db::migrations::latest_version;
use internhub_core::db::ping;
use internhub_core::{core_version, init_logging, open_db, AuthService, NewUser, Role, TokenKeys};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "internhub")]
#[command(about = "InternHub operator tooling")]
struct Cli {
    /// Log level for this run
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core version and schema version
    Version,

    /// Open (or create) a database and apply pending migrations
    Migrate {
        /// SQLite database file
        #[arg(long, env = "DATABASE_PATH", default_value = "./internhub.db")]
        db: PathBuf,
    },

    /// Create a login account
    CreateUser {
        /// SQLite database file
        #[arg(long, env = "DATABASE_PATH", default_value = "./internhub.db")]
        db: PathBuf,
        #[arg(long)]
        username: String,
        /// Initial password; the user is asked to change it on first login
        #[arg(long, env = "INTERNHUB_PASSWORD", hide_env_values = true)]
        password: String,
        /// ADMIN, EMPLOYEE, MENTOR or INTERN
        #[arg(long, default_value = "ADMIN", value_parser = parse_role)]
        role: Role,
        /// Employee id (mentor/employee) or intern code (intern)
        #[arg(long)]
        emp_id: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(&value.trim().to_uppercase()).ok_or_else(|| {
        format!("unknown role `{value}` (expected ADMIN, EMPLOYEE, MENTOR or INTERN)")
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, None).context("starting logger")?;
    for line in run(cli.command)? {
        println!("{line}");
    }
    Ok(())
}

/// Executes one subcommand and returns the lines to print.
fn run(command: Command) -> Result<Vec<String>> {
    let output = match command {
        Command::Version => vec![
            format!("internhub_core version={}", core_version()),
            format!("internhub_core schema={}", latest_version()),
        ],
        Command::Migrate { db } => {
            let conn = open_db(&db).with_context(|| format!("opening {}", db.display()))?;
            ping(&conn)?;
            info!("event=cli_migrate module=cli status=ok");
            vec![format!("{} migrated to schema {}", db.display(), latest_version())]
        }
        Command::CreateUser {
            db,
            username,
            password,
            role,
            emp_id,
            name,
            email,
            department,
        } => {
            let conn = open_db(&db).with_context(|| format!("opening {}", db.display()))?;
            let user = AuthService::new(&conn, &hashing_keys()?)
                .create_user(NewUser {
                    username,
                    password,
                    role,
                    emp_id,
                    name,
                    email,
                    phone: None,
                    department,
                })
                .context("creating user")?;
            info!("event=cli_create_user module=cli status=ok role={}", user.role);
            vec![format!(
                "created {} user `{}` id={}",
                user.role, user.username, user.id
            )]
        }
    };
    Ok(output)
}

/// Keys for an `AuthService` that only hashes; tokens are never issued here.
fn hashing_keys() -> Result<TokenKeys> {
    Ok(TokenKeys::from_secret(&[0u8; MIN_SECRET_BYTES], 60)?)
}

#[cfg(test)]
mod tests {
    use super::{hashing_keys, parse_role, run, Cli};
    use clap::{CommandFactory, Parser};
    use internhub_core::db::migrations::{latest_version, schema_version};
    use internhub_core::{open_db, AuthService, Role};
    use std::path::Path;

    fn run_args(args: &[&str]) -> anyhow::Result<Vec<String>> {
        let cli = Cli::try_parse_from(std::iter::once("internhub").chain(args.iter().copied()))?;
        run(cli.command)
    }

    fn create_admin(db: &Path, username: &str) -> anyhow::Result<Vec<String>> {
        run_args(&[
            "create-user",
            "--db",
            db.to_str().unwrap(),
            "--username",
            username,
            "--password",
            "Adm1nPassw0rd",
            "--name",
            "Program Admin",
        ])
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!(parse_role("mentor"), Ok(Role::Mentor));
        assert_eq!(parse_role(" ADMIN "), Ok(Role::Admin));
        assert!(parse_role("root").is_err());
    }

    #[test]
    fn migrate_creates_database_at_latest_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("internhub.db");

        let output = run_args(&["migrate", "--db", db.to_str().unwrap()]).unwrap();
        assert!(output[0].ends_with(&format!("migrated to schema {}", latest_version())));

        let conn = open_db(&db).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn created_admin_can_log_in() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("internhub.db");

        let output = create_admin(&db, "root-admin").unwrap();
        assert!(output[0].starts_with("created ADMIN user `root-admin`"));

        let conn = open_db(&db).unwrap();
        let keys = hashing_keys().unwrap();
        let login = AuthService::new(&conn, &keys)
            .login("root-admin", "Adm1nPassw0rd")
            .unwrap();
        assert_eq!(login.user.role, Role::Admin);
    }

    #[test]
    fn duplicate_username_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("internhub.db");

        create_admin(&db, "root-admin").unwrap();
        let err = create_admin(&db, "root-admin").unwrap_err();
        assert!(format!("{err:#}").contains("creating user"));
    }
}
