use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::App;

#[derive(Parser)]
#[command(name = "recruit")]
#[command(about = "Recruit CLI - browse postings, manage bookmarks and your applicant profile", long_about = None)]
struct Cli {
    /// Config file to read instead of ~/.config/recruit/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API origin, overriding the config file and RECRUIT_API_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new applicant account and log in
    Signup {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List one page of postings
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        keyword: Option<String>,
        /// Extra listing filter as key=value (repeatable)
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
    },
    /// Toggle the bookmark on a posting
    Bookmark {
        post_id: String,
        /// Listing page the posting appears on
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List bookmarked postings
    Bookmarks,
    /// Show or update the applicant profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the applicant profile
    Show,
    /// Save the applicant profile
    Save {
        /// Two-digit admission year from the student ID (e.g. 21)
        #[arg(long)]
        year: u8,
        /// Department, main one first (repeatable)
        #[arg(long = "department", required = true)]
        departments: Vec<String>,
        /// CV file name; a fresh storage key is generated for it
        #[arg(long)]
        cv: Option<String>,
    },
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let app = App::build(cli.config.as_deref(), cli.base_url)?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&app, email, password).await?,
        Commands::Signup {
            name,
            email,
            password,
        } => commands::auth::signup(&app, name, email, password).await?,
        Commands::Logout => commands::auth::logout(&app),
        Commands::Whoami => commands::auth::whoami(&app).await?,
        Commands::Posts {
            page,
            keyword,
            filters,
        } => commands::posts::list(&app, page, keyword, filters).await?,
        Commands::Bookmark { post_id, page } => commands::posts::bookmark(&app, &post_id, page).await?,
        Commands::Bookmarks => commands::posts::bookmarks(&app).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&app).await?,
            ProfileAction::Save {
                year,
                departments,
                cv,
            } => commands::profile::save(&app, year, departments, cv).await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("type=intern").unwrap(),
            ("type".to_string(), "intern".to_string())
        );
        assert_eq!(
            parse_key_val("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_cli_parses_profile_save() {
        let cli = Cli::try_parse_from([
            "recruit",
            "profile",
            "save",
            "--year",
            "21",
            "--department",
            "CS",
            "--department",
            "Math",
        ])
        .unwrap();
        match cli.command {
            Commands::Profile {
                action: ProfileAction::Save { year, departments, cv },
            } => {
                assert_eq!(year, 21);
                assert_eq!(departments, vec!["CS", "Math"]);
                assert!(cv.is_none());
            }
            _ => panic!("unexpected command"),
        }
    }
}
