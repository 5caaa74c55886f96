//! Command-line interface for building and verifying website push packages.
//!
//! Builds a signed `pushPackage.zip` from a directory of assets using a
//! PKCS#12 or PEM-format Website Push ID certificate.

use clap::{ArgAction, Parser, Subcommand};
use pushpackage::PushPackager;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pushpackage")]
#[command(about = "Website push package builder")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and sign a push package from a directory
    Build {
        /// Directory holding website.json and icon.iconset/
        source: PathBuf,

        /// Output archive
        #[arg(short, long, default_value = "pushPackage.zip")]
        output: PathBuf,

        /// Certificate file (PEM format)
        #[arg(short = 'c', long)]
        certificate: Option<PathBuf>,

        /// Private key file (PKCS#8 PEM format)
        #[arg(short = 'k', long)]
        private_key: Option<PathBuf>,

        /// PKCS#12 file (.p12)
        #[arg(short = 'p', long)]
        pkcs12: Option<PathBuf>,

        /// Password for the PKCS#12 file
        #[arg(long, env = "PUSHPACKAGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Check the manifest and signature of an existing push package
    Verify {
        /// Package to verify
        package: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            source,
            output,
            certificate,
            private_key,
            pkcs12,
            password,
        } => {
            let mut packager = PushPackager::new();
            if let Some(path) = pkcs12 {
                packager = packager.pkcs12(path);
            }
            if let Some(path) = certificate {
                packager = packager.certificate(path);
            }
            if let Some(path) = private_key {
                packager = packager.private_key(path);
            }
            if let Some(password) = password {
                packager = packager.password(password);
            }

            debug!(source = %source.display(), output = %output.display(), "build requested");
            packager.build_dir(&source, &output)?;
            println!("Built: {}", output.display());
        }
        Command::Verify { package } => {
            let manifest = PushPackager::new().verify(&package)?;
            for (path, digest) in manifest.iter() {
                println!("{}  {}", digest, path);
            }
            println!("Verified: {} ({} assets)", package.display(), manifest.len());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
