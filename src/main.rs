//! univ-notice-crawler - Collects university notice boards into one CSV

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use univ_notice_crawler::commands::CrawlCommand;
use univ_notice_crawler::config::Config;
use univ_notice_crawler::notice::dedup_key;
use univ_notice_crawler::sites::Site;

#[derive(Parser)]
#[command(
    name = "univ-notice-crawler",
    version,
    about = "Collects Kangwon National University notice boards into one CSV",
    long_about = "Crawls the main portal, library, public administration, and engineering \
                  education boards, downloads notice images, and writes a deduplicated CSV."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CSV output path
    #[arg(short, long, global = true, env = "NOTICE_OUTPUT")]
    output: Option<PathBuf>,

    /// Root directory for downloaded images
    #[arg(long, global = true, env = "NOTICE_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Listing pages to visit per board
    #[arg(long, global = true, env = "NOTICE_MAX_PAGES")]
    max_pages: Option<u32>,

    /// Sites to crawl (comma-separated)
    #[arg(short, long, global = true, value_delimiter = ',')]
    sites: Option<Vec<Site>>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl all configured sites and write the CSV (default)
    #[command(alias = "c")]
    Crawl,

    /// List supported sites
    Sites,

    /// Print the duplicate-detection key for a title and date
    Key {
        /// Notice title
        title: String,

        /// Written date as shown on the site
        date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress lines are logged at INFO
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(dir) = cli.image_dir {
        config.image_dir = dir;
    }
    if cli.max_pages.is_some() {
        config.max_pages = cli.max_pages;
    }
    if let Some(sites) = cli.sites {
        config.sites = sites;
    }

    match cli.command.unwrap_or(Commands::Crawl) {
        Commands::Crawl => {
            let cmd = CrawlCommand::new(config);
            let report = cmd.execute().await?;
            println!("{}", report);
        }

        Commands::Sites => {
            println!("Supported sites:\n");
            println!("{:<12} {:<18} {:<32}", "Code", "Name", "Base URL");
            println!("{:-<12} {:-<18} {:-<32}", "", "", "");

            for site in Site::all() {
                println!("{:<12} {:<18} {:<32}", site.to_string(), site.label(), site.base_url());
            }
        }

        Commands::Key { title, date } => {
            println!("{}", dedup_key(&title, &date));
        }
    }

    Ok(())
}
