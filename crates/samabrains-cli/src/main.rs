//! `SamaBrains` CLI: send contact messages through the site's relay.
//!
//! A standalone HTTP client for `POST /api/send-email`. It runs the same
//! checks as the browser form before anything leaves the machine.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use samabrains_cli::form::{self, FormGuard, FormInput, HttpEndpoint};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/send-email";

// ── CLI structure ────────────────────────────────────────────────────

/// `SamaBrains` contact relay client.
#[derive(Parser)]
#[command(
    name = "samabrains",
    version,
    about = "SamaBrains CLI: send contact messages through the site relay",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         SAMABRAINS_ENDPOINT   Contact endpoint (default: {DEFAULT_ENDPOINT})\n\n\
         {DIM}Examples:{RESET}\n  \
         samabrains check --name Ada --email ada@example.com --message 'Hello'\n  \
         samabrains send --name Ada --email ada@example.com --message-file note.txt"
    ),
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and send a contact message.
    Send {
        #[command(flatten)]
        message: MessageArgs,
        /// Contact endpoint URL.
        #[arg(long, env = "SAMABRAINS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
    /// Run the local form checks without sending anything.
    Check {
        #[command(flatten)]
        message: MessageArgs,
    },
}

#[derive(Args)]
struct MessageArgs {
    /// Your name.
    #[arg(long)]
    name: String,
    /// Your email address, used as the reply-to.
    #[arg(long)]
    email: String,
    /// Message text.
    #[arg(long, required_unless_present = "message_file", conflicts_with = "message_file")]
    message: Option<String>,
    /// Read the message text from a file.
    #[arg(long, value_name = "PATH")]
    message_file: Option<PathBuf>,
}

impl MessageArgs {
    fn into_input(self) -> Result<FormInput> {
        let message = match (self.message, self.message_file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            (None, None) => String::new(),
        };
        Ok(FormInput {
            name: self.name,
            email: self.email,
            message,
        })
    }
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

fn print_summary(input: &FormInput) {
    kv_line("Name", input.name.trim());
    kv_line("Email", input.email.trim());
    kv_line(
        "Message",
        &format!("{} characters", input.message.trim().chars().count()),
    );
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Send { message, endpoint } => cmd_send(message.into_input()?, &endpoint).await,
        Commands::Check { message } => cmd_check(&message.into_input()?),
    }
}

async fn cmd_send(input: FormInput, endpoint: &str) -> Result<()> {
    let guard = FormGuard::new(HttpEndpoint::new(endpoint)?);

    println!();
    header("✉", "Sending contact message");
    kv_line("Endpoint", guard.endpoint().url());
    print_summary(&input);
    println!();

    if !is_secure_endpoint(endpoint) {
        warning("Endpoint is not using HTTPS, the message travels in clear text");
        println!();
    }

    let notification = guard.submit(input).await;
    if notification.is_success() {
        success(&notification.message);
        println!();
        Ok(())
    } else {
        bail!("{}", notification.message)
    }
}

/// HTTPS, or plain HTTP to this machine.
fn is_secure_endpoint(endpoint: &str) -> bool {
    endpoint.starts_with("https://")
        || ["http://127.0.0.1", "http://localhost", "http://[::1]"]
            .iter()
            .any(|local| {
                endpoint
                    .strip_prefix(local)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with([':', '/']))
            })
}

fn cmd_check(input: &FormInput) -> Result<()> {
    println!();
    header("✔", "Checking contact message");
    print_summary(input);
    println!();

    match form::check(input) {
        Ok(_) => {
            success("Ready to send");
            println!();
            Ok(())
        }
        Err(notification) => bail!("{}", notification.message),
    }
}
