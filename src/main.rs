mod config;

use clap::Parser;
use config::AppConfig;
use log::info;
use mail_dispatch::{Address, AttachmentSource, Emailer};
use rustls::crypto;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file with the SMTP endpoint and credentials
    #[arg(short, long)]
    config: Option<String>,

    /// Sender, `Name <user@host>` or a bare address; falls back to the
    /// config file's `smtp.from`
    #[arg(long)]
    from: Option<String>,

    /// Primary recipient, repeatable
    #[arg(long)]
    to: Vec<String>,

    /// Carbon-copy recipient, repeatable
    #[arg(long)]
    cc: Vec<String>,

    /// Blind-carbon-copy recipient, repeatable
    #[arg(long)]
    bcc: Vec<String>,

    /// Subject line
    #[arg(short, long)]
    subject: Option<String>,

    /// Plain-text body
    #[arg(long)]
    text: Option<String>,

    /// HTML body; may reference attachments via cid: URLs
    #[arg(long)]
    html: Option<String>,

    /// File attachment, repeatable
    #[arg(long)]
    attach: Vec<PathBuf>,
}

fn initialize_logger(config: &AppConfig) {
    let mut builder = env_logger::Builder::new();

    if let Some(level) = &config.log_level {
        builder.parse_filters(level);
    } else if let Ok(env_level) = std::env::var("RUST_LOG") {
        builder.parse_filters(&env_level);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }

    if config.quiet {
        builder.target(env_logger::Target::Pipe(Box::new(std::io::sink())));
    }

    builder.init();
}

fn main() -> anyhow::Result<()> {
    let _ = crypto::ring::default_provider().install_default();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::new_from_file(path),
        None => AppConfig::new(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Failed to load config: {:?}", e);
        if let Ok(path) = std::env::current_dir() {
            eprintln!("Current search path: {:?}", path);
        }
        eprintln!("Please create a `config.toml` or set MAIL_... environment variables, or specify a config file with --config.");
        std::process::exit(1);
    });

    initialize_logger(&config);

    let smtp = &config.smtp;
    let recipients = args.to.len() + args.cc.len() + args.bcc.len();

    let mut emailer = Emailer::new(
        smtp.host.clone(),
        smtp.port,
        smtp.username.clone(),
        smtp.password.clone(),
    )?
    .ssl(smtp.ssl)
    .starttls(smtp.starttls)
    .accept_invalid_certs(smtp.accept_invalid_certs)
    .debug(smtp.debug);

    if let Some(seconds) = smtp.timeout_seconds {
        emailer = emailer.timeout(Duration::from_secs(seconds));
    }

    if let Some(sender) = args.from.as_deref().or(smtp.from.as_deref()) {
        emailer = emailer.from(sender.parse::<Address>()?);
    }
    for address in &args.to {
        emailer = emailer.to(address.parse()?);
    }
    for address in &args.cc {
        emailer = emailer.cc(address.parse()?);
    }
    for address in &args.bcc {
        emailer = emailer.bcc(address.parse()?);
    }
    if let Some(subject) = args.subject {
        emailer = emailer.subject(subject);
    }
    if let Some(text) = args.text {
        emailer = emailer.text(text);
    }
    if let Some(html) = args.html {
        emailer = emailer.html(html);
    }
    for path in args.attach {
        emailer = emailer.add_attachment(AttachmentSource::file(path));
    }

    info!(
        "Sending message to {} recipient(s) via {}:{}",
        recipients, smtp.host, smtp.port
    );

    emailer.send()?;

    info!("Message sent.");
    Ok(())
}
