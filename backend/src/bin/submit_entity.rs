//! CLI front-end for the entity creation flow.
//!
//! Collects the form fields as flags, runs the same validation the portal
//! form runs, prints the generated YAML, and submits it to the backend.
//! Validation failures are printed per field and never reach the network.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use orgkeeper::client::{Severity, SubmissionClient};
use orgkeeper::domain::form::{FormState, fields};
use orgkeeper::domain::EntityKind;

#[derive(Parser)]
#[command(name = "submit-entity", about = "Create a catalog User or Group entity")]
struct Cli {
    /// Base URL of the backend service.
    #[arg(long, default_value = "http://localhost:7007")]
    backend_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a User entity.
    User {
        #[arg(long)]
        name: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        email: String,
        /// Group the user belongs to.
        #[arg(long)]
        member_of: Option<String>,
        /// Profile picture URL.
        #[arg(long)]
        picture: Option<String>,
    },
    /// Create a Group entity.
    Group {
        #[arg(long)]
        name: String,
        #[arg(long)]
        display_name: String,
        #[arg(long = "type")]
        group_type: Option<String>,
        /// Child group; repeat for several.
        #[arg(long = "child")]
        children: Vec<String>,
        #[arg(long)]
        parent: Option<String>,
    },
}

fn build_form(command: Command) -> FormState {
    match command {
        Command::User {
            name,
            display_name,
            email,
            member_of,
            picture,
        } => {
            let mut form = FormState::new(EntityKind::User);
            form.set_field(fields::NAME, name);
            form.set_field(fields::DISPLAY_NAME, display_name);
            form.set_field(fields::EMAIL, email);
            if let Some(member_of) = member_of {
                form.set_field(fields::MEMBER_OF, member_of);
            }
            if let Some(picture) = picture {
                form.set_field(fields::PICTURE, picture);
            }
            form
        }
        Command::Group {
            name,
            display_name,
            group_type,
            children,
            parent,
        } => {
            let mut form = FormState::new(EntityKind::Group);
            form.set_field(fields::NAME, name);
            form.set_field(fields::DISPLAY_NAME, display_name);
            if let Some(group_type) = group_type {
                form.set_field(fields::TYPE, group_type);
            }
            if !children.is_empty() {
                form.set_field(fields::CHILDREN, children);
            }
            if let Some(parent) = parent {
                form.set_field(fields::PARENT, parent);
            }
            form
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();

    let cli = Cli::parse();
    let mut form = build_form(cli.command);

    let document = match form.record() {
        Ok(record) => record.document(),
        Err(errors) => {
            for (field, message) in &errors {
                eprintln!("{field}: {message}");
            }
            eprintln!("validation failed; nothing was sent");
            return Ok(ExitCode::from(2));
        }
    };
    println!("{}", document.to_yaml().wrap_err("failed to render YAML")?);

    let base = Url::parse(&cli.backend_url).wrap_err("invalid backend URL")?;
    let client = SubmissionClient::new(base, Duration::from_secs(30))
        .wrap_err("failed to build HTTP client")?;

    let notification = client.submit_form(&mut form).await;
    match notification.severity() {
        Severity::Error => {
            eprintln!("{}", notification.message());
            Ok(ExitCode::FAILURE)
        }
        _ => {
            println!("{}", notification.message());
            Ok(ExitCode::SUCCESS)
        }
    }
}
