mod config;
mod report;

use clap::{CommandFactory, Parser, Subcommand};
use config::{config_path, default_config_toml, load_config, Config};
use libsibir_trace::{
    create_http_pool, validate_domain, GeoClient, GeoError, GithubClient, Prober, WhoisResolver,
};
use serde::Serialize;
use std::{io::Write, path::PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sibir")]
#[command(about = "SibirTrace - username, IP and WHOIS reconnaissance", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Output results as NDJSON (one JSON object per line)
    #[arg(long, short = 'j', global = true)]
    json: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check which platforms have a profile for a username
    Lookup { username: String },
    /// Show a GitHub user's public profile
    Github { user: String },
    /// Geolocate an IPv4/IPv6 address or a hostname
    Ip { target: String },
    /// Query WHOIS for a domain, following the IANA referral
    Whois { domain: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.print_default_config {
        println!("{}", default_config_toml());
        return Ok(());
    }

    if args.write_default_config {
        let Some(path) = args.config.clone().or_else(config_path) else {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, default_config_toml())?;
        println!("Default config written to: {}", path.display());
        return Ok(());
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let config = load_config(args.config.as_deref());
    let rt = tokio::runtime::Runtime::new()?;
    let ok = rt.block_on(run(command, &config, args.json))?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Runs one command. `Ok(false)` means a user-facing failure was reported.
async fn run(
    command: Command,
    config: &Config,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let probe_config = config.probe_config();
    let client = create_http_pool(&probe_config)?;
    info!("HTTP pool opened");

    let ok = match command {
        Command::Lookup { username } => {
            let prober = Prober::with_client(client.clone(), probe_config);
            let results = prober.probe(&username, &config.registry()).await;
            if json {
                for result in &results {
                    emit_json(result)?;
                }
            } else {
                print!("{}", report::render_lookup(&username, &results));
            }
            true
        }
        Command::Github { user } => {
            match GithubClient::new(client.clone()).profile(&user).await {
                Ok(profile) => {
                    if json {
                        emit_json(&profile)?;
                    } else {
                        print!("{}", report::render_github(&profile));
                    }
                    true
                }
                Err(e) => {
                    debug!(error = %e, "GitHub lookup failed");
                    fail(report::MSG_GITHUB_NOT_FOUND, json)
                }
            }
        }
        Command::Ip { target } => {
            match GeoClient::new(client.clone()).locate_target(&target).await {
                Ok(info) => {
                    if json {
                        emit_json(&info)?;
                    } else {
                        print!("{}", report::render_geo(&info));
                    }
                    true
                }
                Err(GeoError::Invalid(_)) => fail(report::MSG_INVALID_TARGET, json),
                Err(GeoError::Lookup(e)) => {
                    debug!(error = %e, "Geolocation failed");
                    fail(report::MSG_GEO_FAILED, json)
                }
            }
        }
        Command::Whois { domain } => match validate_domain(&domain) {
            Ok(domain) => {
                let resolver = WhoisResolver::with_config(config.whois_config());
                if json {
                    emit_json(&resolver.resolve(&domain).await)?;
                } else {
                    let text = resolver.resolve_text(&domain).await;
                    print!("{}", report::render_whois(&domain, &text));
                }
                true
            }
            Err(e) => {
                debug!(error = %e, "Rejected WHOIS query");
                fail(report::MSG_INVALID_DOMAIN, json)
            }
        },
    };

    drop(client);
    info!("HTTP pool closed");
    Ok(ok)
}

fn emit_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let line = serde_json::to_string(value)?;
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}

fn fail(message: &str, json: bool) -> bool {
    if json {
        println!("{}", report::error_json(message));
    } else {
        eprintln!("{message}");
    }
    false
}
