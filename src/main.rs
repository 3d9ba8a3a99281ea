//! Pkgpluck - pluck files out of remote package archives.
//!
//! Streams `.pkg.tar.xz` archives from a repository listing and places the
//! entries selected by each package's rules onto the local filesystem. A
//! failed install rolls back every file it placed before the process exits
//! with a code identifying the failing stage.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use pkgpluck::config::{self, Package};
use pkgpluck::error::InstallError;
use pkgpluck::session::Session;
use pkgpluck::{install, resolve};

#[derive(Parser)]
#[command(name = "pkgpluck")]
#[command(about = "Pluck individual files out of remote package archives")]
#[command(
    after_help = "EXIT CODES:\n  1  configuration or usage error\n  2  URL resolution failed\n  3  download failed\n  4  decompression failed\n  5  malformed archive\n  6  destination write failed"
)]
struct Cli {
    /// Package definitions file (JSON); defaults to the built-in set
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install configured packages (all of them, or only NAMES)
    Install {
        /// Package names to install (default: every configured package)
        names: Vec<String>,

        /// Continue with remaining packages after a failure
        #[arg(long)]
        keep_going: bool,
    },

    /// Print the archive URL a package resolves to, without installing
    Resolve {
        /// Configured package name
        name: String,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show the active package configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let packages = match config::load(cli.config.as_deref()) {
        Ok(packages) => packages,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Install { names, keep_going } => cmd_install(&packages, &names, keep_going),
        Commands::Resolve { name } => cmd_resolve(&packages, &name),
        Commands::Show {
            what: ShowTarget::Config,
        } => {
            show_config(&packages);
            ExitCode::SUCCESS
        }
    }
}

/// Install each selected package with its own session; a failure rolls back
/// that package's files only. Without --keep-going the first failure stops
/// the run; with it, remaining packages are attempted and a summary printed.
fn cmd_install(packages: &[Package], names: &[String], keep_going: bool) -> ExitCode {
    let selected = match select(packages, names) {
        Ok(selected) => selected,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut failures: Vec<(String, InstallError)> = Vec::new();
    for pkg in selected {
        let mut session = Session::new();
        match install::install(pkg, &mut session) {
            Ok(report) => {
                println!(
                    "installed {} file(s) for {} from {}",
                    report.placed, pkg.name, report.url
                );
                if let Some(note) = &pkg.post_install {
                    println!("\n{note}\n");
                }
            }
            Err(err) => {
                eprintln!("error: {}: {err}", pkg.name);
                let unremoved = session.rollback();
                if unremoved > 0 {
                    eprintln!("rollback: {unremoved} file(s) could not be removed");
                }
                failures.push((pkg.name.clone(), err));
                if !keep_going {
                    break;
                }
            }
        }
    }

    match failures.first() {
        None => ExitCode::SUCCESS,
        Some((_, first)) => {
            if failures.len() > 1 {
                eprintln!("\n{} package(s) failed:", failures.len());
                for (name, err) in &failures {
                    eprintln!("  {name}: {} stage failed", err.stage());
                }
            }
            ExitCode::from(first.exit_code())
        }
    }
}

fn cmd_resolve(packages: &[Package], name: &str) -> ExitCode {
    let Some(pkg) = packages.iter().find(|pkg| pkg.name == name) else {
        eprintln!("error: no configured package named {name}");
        return ExitCode::FAILURE;
    };
    match resolve::resolve(&pkg.name, &pkg.repo) {
        Ok(url) => {
            println!("{url}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Pick the packages to install, in configuration order. Every requested
/// name must exist in the configuration.
fn select<'a>(packages: &'a [Package], names: &[String]) -> Result<Vec<&'a Package>> {
    if names.is_empty() {
        return Ok(packages.iter().collect());
    }
    for name in names {
        if !packages.iter().any(|pkg| &pkg.name == name) {
            bail!("no configured package named {name}");
        }
    }
    Ok(packages
        .iter()
        .filter(|pkg| names.contains(&pkg.name))
        .collect())
}

fn show_config(packages: &[Package]) {
    for pkg in packages {
        println!("{}", pkg.name);
        println!("  repo: {}", pkg.repo);
        for rule in &pkg.rules {
            println!(
                "  rule: {} -> {} (mode {:04o})",
                rule.src,
                rule.dest_dir.display(),
                rule.mode
            );
        }
        if pkg.post_install.is_some() {
            println!("  post-install note: yes");
        }
    }
}
