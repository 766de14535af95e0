/// Synthetic order stream generator
///
/// Writes a shuffled order stream as text, JSON or SQLite rows for replay
/// against a matching engine, and summarizes the engine's latency report.
///
/// Usage:
///   orderstream generate --n-orders 10000 --seed 42 --output orders.txt
///   orderstream generate --format sqlite --output orders.db --table orders
///   orderstream latency stats.json

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use order_stream::{
    GeneratorConfig, JsonSink, LatencyReport, OrderGenerator, SqliteSink, TextSink,
};

#[derive(Parser, Debug)]
#[command(name = "orderstream")]
#[command(about = "Generate synthetic order streams and summarize engine latency")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an order stream
    Generate(GenerateArgs),

    /// Summarize a matching-engine stats.json
    Latency {
        /// Path to the stats document
        path: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
    Sqlite,
}

impl Format {
    fn default_output(self) -> &'static str {
        match self {
            Format::Text => "orders.txt",
            Format::Json => "orders.json",
            Format::Sqlite => "orders.db",
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file, or "-" for stdout (text and json only).
    /// Defaults to orders.txt, orders.json or orders.db by format
    #[arg(long, short)]
    output: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Table name for the sqlite format
    #[arg(long, default_value = SqliteSink::DEFAULT_TABLE)]
    table: String,

    /// Skip the realized ratio summary
    #[arg(long)]
    quiet: bool,

    #[arg(long)]
    n_orders: Option<i64>,
    #[arg(long)]
    ratio_gtc: Option<f64>,
    #[arg(long)]
    ratio_fak: Option<f64>,
    #[arg(long)]
    ratio_fok: Option<f64>,
    #[arg(long)]
    ratio_gfd: Option<f64>,
    #[arg(long)]
    ratio_m: Option<f64>,
    #[arg(long)]
    ratio_bid: Option<f64>,
    #[arg(long)]
    ratio_ask: Option<f64>,
    #[arg(long)]
    min_bid_price: Option<f64>,
    #[arg(long)]
    max_bid_price: Option<f64>,
    #[arg(long)]
    min_ask_price: Option<f64>,
    #[arg(long)]
    max_ask_price: Option<f64>,

    /// Allow Bid and Ask price ranges to overlap; `--can-cross false` turns
    /// it off over a config file
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    can_cross: Option<bool>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl GenerateArgs {
    fn config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GeneratorConfig::default(),
        };

        let overrides = [
            (self.ratio_gtc, &mut config.ratio_gtc),
            (self.ratio_fak, &mut config.ratio_fak),
            (self.ratio_fok, &mut config.ratio_fok),
            (self.ratio_gfd, &mut config.ratio_gfd),
            (self.ratio_m, &mut config.ratio_m),
            (self.ratio_bid, &mut config.ratio_bid),
            (self.ratio_ask, &mut config.ratio_ask),
            (self.min_bid_price, &mut config.min_bid_price),
            (self.max_bid_price, &mut config.max_bid_price),
            (self.min_ask_price, &mut config.min_ask_price),
            (self.max_ask_price, &mut config.max_ask_price),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(n_orders) = self.n_orders {
            config.n_orders = n_orders;
        }
        if let Some(can_cross) = self.can_cross {
            config.can_cross = can_cross;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }

    fn output(&self) -> &str {
        self.output
            .as_deref()
            .unwrap_or_else(|| self.format.default_output())
    }
}

fn open_writer(output: &str) -> Result<Box<dyn Write>> {
    if output == "-" {
        Ok(Box::new(io::stdout().lock()))
    } else {
        let file = File::create(output).with_context(|| format!("creating {}", output))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = args.config()?;
    let output = args.output();
    let mut generator = OrderGenerator::new(config).context("invalid generator config")?;

    let generated = match args.format {
        Format::Text => {
            let mut sink = TextSink::new(open_writer(output)?);
            generator.generate_into(&mut sink)?
        }
        Format::Json => {
            let mut sink = JsonSink::new(open_writer(output)?);
            generator.generate_into(&mut sink)?
        }
        Format::Sqlite => {
            let mut sink = SqliteSink::open(output, &args.table)
                .with_context(|| format!("opening database {}", output))?;
            match generator.generate_into(&mut sink) {
                Ok(generated) => generated,
                Err(e) => {
                    // Partial inserts are not kept
                    if let Err(rollback) = sink.rollback() {
                        error!("rollback failed: {}", rollback);
                    }
                    return Err(e.into());
                }
            }
        }
    };

    info!(
        orders = generated.batch.len(),
        output = %output,
        "generation complete"
    );

    if !args.quiet {
        // Keep stdout clean when the stream itself goes there
        let summary = generated.stats().to_string();
        if output == "-" && args.format != Format::Sqlite {
            eprint!("{}", summary);
        } else {
            print!("{}", summary);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Latency { path } => {
            let report = LatencyReport::from_file(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            report.print_summary()?;
            Ok(())
        }
    }
}
