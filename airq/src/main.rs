use airq::{AirQualityService, Config, HttpFetcher, Report};
use clap::Parser;
use std::path::PathBuf;
use usercount::{welcome_text, JsonUserCounter, UserCounter};

/// Prints the current air quality in Tashkent as read from IQAir.
#[derive(Parser)]
#[command(name = "airq", version)]
struct Cli {
    /// TOML config file; missing means defaults
    #[arg(long, default_value = "airq.toml")]
    config: PathBuf,

    /// Greet and record this user, then append the user count
    #[arg(long)]
    user: Option<u64>,

    /// Print counter statistics instead of a report
    #[arg(long)]
    stats: bool,
}

async fn report(config: &Config) -> Report {
    match HttpFetcher::new(config) {
        Ok(fetcher) => AirQualityService::new(fetcher).report().await,
        Err(e) => {
            log::error!("cannot set up IQAir client: {}", e);
            Report::Unavailable
        },
    }
}

/// Greeting for `user`; a counter that cannot persist only costs the greeting.
fn greet(counter: &dyn UserCounter, user: u64) -> Option<String> {
    match counter.record_seen(user) {
        Ok(visit) => Some(welcome_text(visit)),
        Err(e) => {
            log::warn!("cannot record user {}: {}", user, e);
            None
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let counter = JsonUserCounter::open(&config.stats_path);

    if cli.stats {
        println!("{}", counter.snapshot().render_summary());
        return Ok(());
    }

    if let Some(user) = cli.user {
        if let Some(greeting) = greet(&counter, user) {
            println!("{}\n", greeting);
        }
    }

    let mut text = report(&config).await.render();
    if cli.user.is_some() {
        text.push_str(&format!("\n\n👥 Пользователей бота: {}", counter.unique_count()));
    }
    println!("{}", text);
    Ok(())
}
