//! vCard QR command line interface
//!
//! Builds a contact from flags or a snapshot file and produces the same
//! artifacts as the creator page.
//!
//! # Usage
//!
//! ```bash
//! # Write vcard.vcf, qrcode.svg and qrcode.png into ./out
//! vcard_qr_cli create --first-name Jaana --last-name Tikkanen \
//!     --phone pref:home:555 --phone work:123456789 --out out
//!
//! # Check a snapshot file without producing anything
//! vcard_qr_cli validate --file contact.yaml
//!
//! # Print the vCard text
//! vcard_qr_cli show --file contact.json --format text
//! ```

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vcard_qr::{
    AppConfig, ContactSnapshot, Creator, CreatorMode, PhoneEntry, PhoneType, SubmitOutcome,
    ValidationErrors,
};

#[derive(Parser)]
#[command(name = "vcard_qr_cli")]
#[command(version)]
#[command(about = "Create vCard files and QR codes from contact details")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, text, or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// YAML configuration file
    #[arg(long, short, global = true, env = "VCARD_QR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the contact and write vcard.vcf, qrcode.svg and qrcode.png
    Create {
        #[command(flatten)]
        contact: ContactArgs,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate the contact only
    Validate {
        #[command(flatten)]
        contact: ContactArgs,
    },

    /// Print the vCard for the contact
    Show {
        #[command(flatten)]
        contact: ContactArgs,
    },
}

#[derive(Args)]
struct ContactArgs {
    /// Snapshot file (.yaml, .yml or .json); flags override its names
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    /// Phone as [pref:]TYPE:NUMBER, repeatable; replaces the file's list
    #[arg(long = "phone", value_parser = parse_phone)]
    phones: Vec<PhoneEntry>,
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create { contact, out } => {
            cmd_create(&contact, out, cli.config.as_deref(), cli.format)
        }
        Commands::Validate { contact } => cmd_validate(&contact, cli.config.as_deref(), cli.format),
        Commands::Show { contact } => cmd_show(&contact, cli.config.as_deref(), cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vcard_qr=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_create(
    contact: &ContactArgs,
    out: Option<PathBuf>,
    config: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = AppConfig::load(config)?;
    let out = out.unwrap_or_else(|| config.output_dir.clone());
    let mut creator = Creator::with_default_renderer(CreatorMode::QrCode, config);
    creator.fill(&contact.snapshot()?);

    let snapshot = match creator.submit()? {
        SubmitOutcome::Accepted { snapshot, .. } => snapshot,
        SubmitOutcome::Rejected(errors) => return Err(rejected(&errors, format)),
        SubmitOutcome::RenderFailed(err) => return Err(err.into()),
    };
    let written = creator.bridge().write_all(&out)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "success": true,
                "contact": snapshot,
                "files": written,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            println!(
                "{} Created vCard for {} {}",
                "OK".green().bold(),
                snapshot.first_name,
                snapshot.last_name
            );
            for path in &written {
                println!("  {}", path.display());
            }
        }
    }
    Ok(())
}

fn cmd_validate(
    contact: &ContactArgs,
    config: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = AppConfig::load(config)?;
    let mut creator = Creator::with_default_renderer(CreatorMode::QrCode, config);
    creator.fill(&contact.snapshot()?);
    let errors = creator.state().errors.clone();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": errors.is_valid(),
                "errors": errors,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            if errors.is_valid() {
                println!("{} Contact is valid", "OK".green().bold());
            } else {
                print_errors(&errors);
            }
        }
    }

    if errors.blocks_submit() {
        bail!("validation failed");
    }
    Ok(())
}

fn cmd_show(contact: &ContactArgs, config: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::load(config)?;
    let mut creator = Creator::with_default_renderer(CreatorMode::QrCode, config);
    creator.fill(&contact.snapshot()?);

    match creator.submit()? {
        SubmitOutcome::Accepted { .. } => {}
        SubmitOutcome::Rejected(errors) => return Err(rejected(&errors, format)),
        SubmitOutcome::RenderFailed(err) => return Err(err.into()),
    }
    let view = creator.display_view();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Text => println!("{}", view.vcard),
        OutputFormat::Pretty => {
            for line in view.vcard.lines() {
                match line.split_once(':') {
                    Some((name, value)) => println!("{}:{}", name.cyan(), value),
                    None => println!("{line}"),
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

impl ContactArgs {
    /// File contents (if any) with flag overrides applied.
    fn snapshot(&self) -> anyhow::Result<ContactSnapshot> {
        let mut snapshot = match &self.file {
            Some(path) => read_snapshot(path)?,
            None => ContactSnapshot::default(),
        };
        if let Some(first) = &self.first_name {
            snapshot.first_name.clone_from(first);
        }
        if let Some(last) = &self.last_name {
            snapshot.last_name.clone_from(last);
        }
        if !self.phones.is_empty() {
            snapshot.phone.clone_from(&self.phones);
        }
        Ok(snapshot)
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<ContactSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let snapshot = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(snapshot)
}

/// Parse `[pref:]TYPE:NUMBER`. A bare number is an `Other` phone.
fn parse_phone(raw: &str) -> Result<PhoneEntry, String> {
    let (preferred, rest) = match raw.split_once(':') {
        Some((flag, rest)) if flag.eq_ignore_ascii_case("pref") => (true, rest),
        _ => (false, raw),
    };
    let (phone_type, number) = match rest.split_once(':') {
        Some((label, number)) => (PhoneType::from_label(label), number),
        None => (PhoneType::Other, rest),
    };
    let number = number.trim();
    if number.is_empty() {
        return Err(format!("no number in '{raw}'"));
    }
    Ok(PhoneEntry {
        preferred,
        phone_type,
        number: number.to_string(),
    })
}

fn print_errors(errors: &ValidationErrors) {
    for (path, error) in errors.iter() {
        eprintln!("  {} {}: {}", "x".red(), path, error.message);
    }
}

fn rejected(errors: &ValidationErrors, format: OutputFormat) -> anyhow::Error {
    if format != OutputFormat::Json {
        print_errors(errors);
    }
    let summary: Vec<&str> = errors.iter().map(|(_, e)| e.message.as_str()).collect();
    anyhow!("contact rejected: {}", summary.join(" "))
}
