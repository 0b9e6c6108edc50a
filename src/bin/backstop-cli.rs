use clap::{Parser, Subcommand};
use serde_json::Value;

use backstop::backend::Filter;
use backstop::config::schema::BackstopConfig;
use backstop::{CallOverrides, Credentials, Gateway, Outcome};

#[derive(Parser)]
#[command(name = "backstop-cli")]
#[command(about = "Management CLI for the Backstop data-access layer", long_about = None)]
struct Cli {
    /// Backend base URL (overrides the config file).
    #[arg(short, long)]
    url: Option<String>,

    /// Optional config file (TOML); flags override it.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the session material
    SignIn {
        email: String,
        password: String,
    },
    /// Read rows from a resource
    Read {
        resource: String,
        /// Filter predicates as field=value pairs
        #[arg(short, long)]
        filter: Vec<String>,
        /// Skip the response cache for this call
        #[arg(long)]
        no_cache: bool,
    },
    /// Insert a JSON payload into a resource
    Create {
        resource: String,
        /// Row payload as a JSON object
        json: String,
    },
    /// Delete rows matching the filter
    Delete {
        resource: String,
        #[arg(short, long)]
        filter: Vec<String>,
    },
    /// Dump the metrics log
    Metrics,
    /// Probe backend reachability
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => backstop::config::loader::load_config(path)?,
        None => BackstopConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.backend.base_url = url.clone();
    }

    backstop::observability::logging::init_logging(&config.observability.log_level);

    let gateway = Gateway::new(config)?;

    match cli.command {
        Commands::SignIn { email, password } => {
            let outcome = gateway
                .sign_in(Credentials { email, password }, CallOverrides::default())
                .await;
            print_outcome(&outcome)?;
        }
        Commands::Read {
            resource,
            filter,
            no_cache,
        } => {
            let overrides = CallOverrides {
                cache: if no_cache { Some(false) } else { None },
                ..Default::default()
            };
            let outcome = gateway
                .read(&resource, None, parse_filter(&filter)?, overrides)
                .await;
            print_outcome(&outcome)?;
        }
        Commands::Create { resource, json } => {
            let payload: Value = serde_json::from_str(&json)?;
            let outcome = gateway
                .create(&resource, payload, CallOverrides::default())
                .await;
            print_outcome(&outcome)?;
        }
        Commands::Delete { resource, filter } => {
            let outcome = gateway
                .delete(&resource, parse_filter(&filter)?, CallOverrides::default())
                .await;
            print_outcome(&outcome)?;
        }
        Commands::Metrics => {
            println!(
                "{}",
                serde_json::to_string_pretty(&gateway.metrics_summary())?
            );
            println!("{}", serde_json::to_string_pretty(&gateway.metrics())?);
        }
        Commands::Health => {
            if gateway.is_healthy().await {
                println!("Backend reachable");
            } else {
                eprintln!("Backend unreachable");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn parse_filter(pairs: &[String]) -> Result<Filter, Box<dyn std::error::Error>> {
    let mut filter = Filter::new();
    for pair in pairs {
        let (field, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("filter '{}' is not field=value", pair))?;
        // Numbers and booleans filter as typed values, everything else as text.
        let value = serde_json::from_str(raw).unwrap_or(Value::String(raw.to_string()));
        filter = filter.eq(field, value);
    }
    Ok(filter)
}

fn print_outcome(outcome: &Outcome) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
