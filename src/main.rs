mod config;
mod mailer;
mod template;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use crate::config::Config;
use crate::mailer::Emailer;

/// Send templated HTML email through an SMTP relay
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to config file
    #[clap(short, long, default_value = "~/.config/htmlmail/config.json")]
    config: String,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter config file to edit by hand
    Init,

    /// Send an email to one or more recipients
    Send {
        /// Recipient address(es), comma separated
        #[clap(short, long)]
        to: String,

        /// Subject line
        #[clap(short, long)]
        subject: String,

        /// Optional file to attach
        #[clap(short, long)]
        attachment: Option<PathBuf>,

        /// Template value as key=value; may be repeated
        #[clap(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

fn parse_template_values(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) => {
                values.insert(key.to_string(), value.to_string());
            }
            None => bail!("Invalid --set value '{}', expected key=value", pair),
        }
    }
    Ok(values)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let config_path = shellexpand::tilde(&args.config).into_owned();

    match args.command {
        Commands::Init => {
            let config = Config::default();
            config
                .save(&config_path)
                .context("Failed to write config file")?;
            println!("Wrote starter config to {}", config_path);
            println!("Edit it with your sender address, password and SMTP server.");
        }
        Commands::Send {
            to,
            subject,
            attachment,
            set,
        } => {
            let config = Config::load(&config_path).context("Failed to load config file")?;
            let values = parse_template_values(&set)?;

            let emailer = Emailer::from_account(&config.account);
            debug!(
                "Sending via {}:{}",
                emailer.smtp_server(),
                emailer.smtp_port()
            );

            emailer
                .send_email(&to, &subject, attachment.as_deref(), &values)
                .context("Failed to send email")?;
            println!("Sent '{}' to {}", subject, to);
        }
    }

    Ok(())
}
