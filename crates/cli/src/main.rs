mod commands;
mod settings;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use settings::PortalArgs;
use sports_portal_generator::listing::DEFAULT_PAGE_SIZE;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sports-portal")]
#[command(version, about = "Multi-domain sports streaming landing pages", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "PORTAL_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Serve landing pages, sitemaps, robots.txt and the games API
    Serve {
        #[command(flatten)]
        portal: PortalArgs,

        /// Address to listen on
        #[arg(short, long, env = "PORTAL_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Games per listing page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Generate sitemap.xml for one domain
    Sitemap {
        /// Domain as it appears in the Host header
        domain: String,

        #[command(flatten)]
        portal: PortalArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Generate robots.txt for one domain
    Robots {
        /// Domain as it appears in the Host header
        domain: String,

        #[command(flatten)]
        portal: PortalArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check registry, site configs and games file
    Validate {
        #[command(flatten)]
        portal: PortalArgs,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Logs go to stderr so sitemap and robots output can be piped
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve {
            portal,
            bind,
            page_size,
        } => {
            let mut settings = portal.resolve()?;
            settings.page_size = page_size;
            commands::serve::run(settings, bind).await
        }
        Command::Sitemap {
            domain,
            portal,
            output,
            date,
        } => commands::sitemap::run(domain, portal.resolve()?, output, date).await,
        Command::Robots {
            domain,
            portal,
            output,
        } => commands::robots::run(domain, portal.resolve()?, output).await,
        Command::Validate { portal } => commands::validate::run(portal.resolve()?).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sports-portal", &mut io::stdout());
            Ok(())
        }
    }
}
