use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::Command;

/// Files the showcase loads at startup, relative to the workspace root.
const REQUIRED_ASSETS: [&str; 2] = [
    "assets/textures/matcaps/8.png",
    "assets/fonts/block_regular.typeface.json",
];

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for the geometry showcase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: assets, fmt, clippy, tests
    Check,
    /// Verify the runtime asset files are present
    Assets,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build the entire workspace
    Build,
    /// Launch the desktop showcase
    Run {
        /// Print the scene as text instead of opening a window
        #[arg(long)]
        headless: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            check_assets()?;
            cargo("fmt --check", &["fmt", "--all", "--", "--check"])?;
            run_clippy()?;
            cargo("test", &["test", "--workspace"])?;
        }
        Commands::Assets => check_assets()?,
        Commands::Fmt => cargo("fmt --check", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Build => cargo("build", &["build", "--workspace"])?,
        Commands::Run { headless } => {
            let mut args = vec!["run", "-p", "showcase-desktop", "--"];
            if headless {
                args.push("--headless");
            }
            cargo("run", &args)?;
        }
    }

    Ok(())
}

fn cargo(what: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {what}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {what} failed");
    }
    Ok(())
}

fn run_clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn check_assets() -> Result<()> {
    println!("==> Checking runtime assets");
    let missing: Vec<&str> = REQUIRED_ASSETS
        .iter()
        .copied()
        .filter(|p| !Path::new(p).is_file())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing assets: {}", missing.join(", "));
    }
    Ok(())
}
