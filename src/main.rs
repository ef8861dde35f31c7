use clap::{Parser, Subcommand};
use marquee::artifacts;
use marquee::auth::ServiceAccountAuth;
use marquee::config::{self, API_KEY_VAR, CREDENTIAL_VAR, Config};
use marquee::generate;
use marquee::output::{self, Readiness};
use marquee::ping::{DiscoveryPing, HttpPinger, NoPing};
use marquee::queue::NotificationQueue;
use marquee::source::TmdbClient;
use marquee::submit::{self, GoogleIndexing};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Static movie and TV pages from a metadata catalog")]
#[command(long_about = "\
Static movie and TV pages from a metadata catalog

Fetches the popular movie and TV lists, writes one HTML page per title into
every configured site, and keeps each site's search index, sitemaps, and
robots.txt current. Existing pages are never rewritten.

New pages on the authority site are appended to a queue file. A separate
`submit` run sends the queued URLs to the Google Indexing API and deletes
the file. Run `generate` and `submit` on schedules that never overlap.

Site layout:

  public_html/
  ├── search_index.json       # [{id, slug, type, folder}, ...]
  ├── sitemap.xml             # index of the two folder sitemaps
  ├── movies_sitemap.xml
  ├── tvshows_sitemap.xml
  ├── robots.txt
  ├── movies/<slug>.html
  └── tvshows/<slug>.html

Environment (a .env file is read if present):
  TMDB_API_KEY           required by generate
  GOOGLE_INDEXING_JSON   service account key, required by submit

Run 'marquee gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the catalog and write new pages for every site
    Generate,
    /// Rewrite sitemaps and robots.txt without fetching
    Artifacts,
    /// Send queued URLs to the Indexing API and clear the queue
    Submit,
    /// Validate config and report what each command would need
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let load = || config::load_config(&cli.config);
    match cli.command {
        Command::Generate => run_generate(&load()?)?,
        Command::Artifacts => {
            let config = load()?;
            let today = chrono::Utc::now().date_naive();
            for site in &config.sites {
                if site.output_root.is_dir() {
                    artifacts::write_all(site, today);
                    println!("{} → {}", site.domain, site.output_root.display());
                } else {
                    warn!(domain = %site.domain, path = %site.output_root.display(), "output directory not found");
                }
            }
        }
        Command::Submit => {
            let config = load()?;
            let queue = NotificationQueue::new(&config.generate.queue_file);
            let auth = ServiceAccountAuth::new(
                std::env::var(CREDENTIAL_VAR).ok(),
                config.indexing.scope.clone(),
            )?;
            let api = GoogleIndexing::new(config.indexing.endpoint.clone())?;
            let report = submit::submit_pending(&queue, config.indexing.max_urls, &auth, &api)?;
            output::print_submit_output(&report, queue.path());
        }
        Command::Check => {
            let config = load()?;
            println!("==> Config {} is valid", cli.config.display());
            let readiness = Readiness {
                roots_present: config.sites.iter().map(|s| s.output_root.is_dir()).collect(),
                template_present: config.generate.template.is_file(),
                pending: NotificationQueue::new(&config.generate.queue_file)
                    .pending()?
                    .len(),
                api_key_set: config::require_env(API_KEY_VAR).is_ok(),
                credential_set: config::require_env(CREDENTIAL_VAR).is_ok(),
            };
            output::print_check_output(&config, &readiness);
            if readiness.can_generate() {
                println!("==> Ready to generate");
            } else {
                println!("==> Not ready to generate");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_generate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = config::require_env(API_KEY_VAR)?;
    let client = TmdbClient::new(&config.source, api_key.clone())?;
    let pinger: Box<dyn DiscoveryPing> = if config.generate.ping {
        Box::new(HttpPinger::new(config.generate.ping_url.clone())?)
    } else {
        Box::new(NoPing)
    };
    let client_api_key = config.source.client_api_key.clone().unwrap_or(api_key);

    let report = generate::generate(config, &client, pinger.as_ref(), client_api_key)?;
    info!(written = report.total_written(), "generation finished");
    output::print_generate_output(&report);
    Ok(())
}

/// Log to stderr so stdout carries only the summary.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
