use crate::api::FlightsApi;
use crate::error::{ConfigSnafu, Error};
use crate::report::{ChainOptions, LookupPlan, SweepOptions};
use crate::settings::Settings;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use snafu::{Report, ResultExt};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod api;
mod correlate;
mod delay;
mod error;
mod flight;
mod http_client;
mod report;
mod settings;
mod time;

#[derive(Parser)]
#[command(version, about = "Find delayed flights and estimate knock-on delays")]
struct Args {
    /// Path to the YAML settings file
    #[arg(short, long, value_name = "FILE", default_value = "config/delaywatch.yaml")]
    config: PathBuf,

    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow the first delayed active flight onto its next leg
    Chain {
        /// Number of active flights to fetch
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, value_enum, default_value_t = PickMode::Earliest)]
        pick: PickMode,
    },
    /// Summarise delays and suggest knock-on delays for significantly delayed flights
    Sweep {
        /// Minimum departure delay in minutes
        #[arg(long)]
        min_delay: Option<i64>,
        /// Number of flights to fetch
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, value_enum, default_value_t = PickMode::Earliest)]
        pick: PickMode,
    },
}

/// How the next flight of an aircraft is chosen
#[derive(Clone, Copy, ValueEnum)]
enum PickMode {
    /// Nearest scheduled departure after the delayed flight's
    Earliest,
    /// Trust the order the API returns results in
    ApiOrder,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<(), Error> {
    let settings = Settings::new(&args.config).context(ConfigSnafu)?;
    let api = FlightsApi::new(&settings.api)?;

    match args.command {
        Command::Chain { limit, pick } => {
            let opts = ChainOptions {
                limit: limit.unwrap_or(settings.fetch.limit),
                lookup: match pick {
                    PickMode::Earliest => LookupPlan::earliest(settings.lookup.limit),
                    PickMode::ApiOrder => LookupPlan::chain_api_order(),
                },
            };
            let report = report::chain(&api, &opts).await?;
            print!("{report}");
        }
        Command::Sweep {
            min_delay,
            limit,
            pick,
        } => {
            let opts = SweepOptions {
                limit: limit.unwrap_or(settings.fetch.limit),
                min_delay: min_delay.unwrap_or(settings.sweep.min_delay),
                lookup: match pick {
                    PickMode::Earliest => LookupPlan::earliest(settings.lookup.limit),
                    PickMode::ApiOrder => LookupPlan::sweep_api_order(),
                },
            };
            let report = report::sweep(&api, &opts).await?;
            print!("{report}");
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Report<Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    Report::from(run(args).await)
}
