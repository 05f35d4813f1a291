use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use rebook_cli::config_loader::load_config_for_fix;
use rebook_cli::fix::run_fix;
use rebook_cli::sidebar::preview_sidebar;

#[derive(Debug, Parser)]
#[command(name = "rebook", about = "Post-process a built book in place.")]
struct Cli {
    #[arg(long = "source-dir", short = 's', global = true)]
    source_dir: Option<PathBuf>,
    #[arg(long = "book-dir", global = true, default_value = "build")]
    book_dir: PathBuf,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rewrite every page, stylesheet and the client bundle.")]
    Fix {
        #[arg(long)]
        dry_run: bool,
    },
    #[command(about = "Print the sidebar as resolved for one page.")]
    Sidebar {
        #[arg(long, value_name = "PATH")]
        page: String,
        #[arg(long, value_name = "PATH")]
        toc_script: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    match &cli.command {
        Command::Fix { dry_run } => run_fix_command(&cli, *dry_run),
        Command::Sidebar { page, toc_script } => {
            run_sidebar_command(&cli, page, toc_script.as_deref())
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run_fix_command(cli: &Cli, dry_run: bool) -> Result<()> {
    let root = root_dir(cli);
    let config = load_config_for_fix(&root, cli.config.as_deref())?;
    run_fix(&root.join(&cli.book_dir), &config, dry_run)?;
    Ok(())
}

fn run_sidebar_command(cli: &Cli, page: &str, toc_script: Option<&Path>) -> Result<()> {
    let root = root_dir(cli);
    let preview = preview_sidebar(&root.join(&cli.book_dir), page, toc_script)?;
    match &preview.active_href {
        Some(href) => eprintln!("active: {href}"),
        None => eprintln!("active: none"),
    }
    println!("{}", preview.html);
    Ok(())
}

fn root_dir(cli: &Cli) -> PathBuf {
    cli.source_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}
