use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use airpath::{AirPathConfig, RoutePlanner, RoutePreferences, RouteRequest, TravelMode, web};

#[derive(Parser, Debug)]
#[command(author, version, about = "Air-quality-aware route planning")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan and rank routes between two places.
    Routes(RouteArgs),
    /// Plan routes and recommend one according to preferences.
    Compare {
        #[command(flatten)]
        route: RouteArgs,
        /// Weigh travel time.
        #[arg(long)]
        prefer_speed: bool,
        /// Weigh estimated cost.
        #[arg(long)]
        prefer_cost: bool,
        /// Do not weigh air quality.
        #[arg(long)]
        ignore_air_quality: bool,
        /// Do not weigh health impact.
        #[arg(long)]
        ignore_health: bool,
    },
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Origin as "lat,lng" or a place name.
    #[arg(long = "from")]
    from: String,
    /// Destination as "lat,lng" or a place name.
    #[arg(long = "to")]
    to: String,
    /// driving, walking, cycling, transit or mixed.
    #[arg(long, default_value = "driving")]
    mode: TravelMode,
    /// Rank the cleanest routes first.
    #[arg(long)]
    avoid_pollution: bool,
    #[arg(long, default_value_t = 60)]
    max_minutes: u32,
}

impl RouteArgs {
    fn to_request(&self) -> RouteRequest {
        let mut request = RouteRequest::new(&self.from, &self.to, self.mode);
        request.avoid_high_pollution = self.avoid_pollution;
        request.max_travel_time = self.max_minutes;
        request
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AirPathConfig::load_from_path(cli.config.clone())
        .context("failed to load configuration")?;
    init_tracing(&config, cli.verbose)?;

    let planner = RoutePlanner::from_config(&config).context("failed to set up route planner")?;

    match cli.command {
        Command::Routes(args) => {
            let routes = planner
                .calculate_routes(&args.to_request())
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", serde_json::to_string_pretty(&routes)?);
        }
        Command::Compare {
            route,
            prefer_speed,
            prefer_cost,
            ignore_air_quality,
            ignore_health,
        } => {
            let request = route.to_request();
            let routes = planner
                .calculate_routes(&request)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let preferences = RoutePreferences {
                prioritize_air_quality: !ignore_air_quality,
                prioritize_health: !ignore_health,
                prioritize_speed: prefer_speed,
                prioritize_cost: prefer_cost,
                max_travel_time: request.max_travel_time,
                ..RoutePreferences::default()
            };
            let comparison = planner.compare_routes(routes, &preferences);
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        Command::Serve { port } => web::run(Arc::new(planner), port).await?,
    }

    Ok(())
}

fn init_tracing(config: &AirPathConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let env_filter = if verbose {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = if config.logging.format == "json" {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("failed to install tracing subscriber")
}
