/// Order-stream generation pipeline
///
/// allocation -> price ranges -> price pools -> assembly -> shuffle.
/// The generator owns its random source; a seeded generator always produces
/// the same batch for the same configuration.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;

use crate::allocator::{allocate, Allocation};
use crate::assembler::{assemble, shuffle, AssemblyError, OrderBatch};
use crate::config::{ConfigError, GeneratorConfig};
use crate::order::Side;
use crate::pricing::{resolve_from_config, PricePool, ResolvedRanges};
use crate::sink::{OrderSink, SinkError};
use crate::stats::OrderStats;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct Generated {
    pub allocation: Allocation,
    pub ranges: ResolvedRanges,
    pub batch: OrderBatch,
}

impl Generated {
    pub fn stats(&self) -> OrderStats {
        OrderStats::from_orders(&self.batch)
    }
}

pub struct OrderGenerator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl OrderGenerator {
    /// Validate `config` and seed the random source from `config.seed`,
    /// or from OS entropy when no seed is set
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(OrderGenerator { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the pipeline once
    pub fn generate(&mut self) -> GenerateResult<Generated> {
        let allocation = allocate(&self.config)?;
        let ranges = resolve_from_config(&self.config)?;
        info!(
            bids = allocation.bid.total(),
            asks = allocation.ask.total(),
            bid_range = %format!("{}..={}", ranges.bid.min, ranges.bid.max),
            ask_range = %format!("{}..={}", ranges.ask.min, ranges.ask.max),
            can_cross = self.config.can_cross,
            "generating orders"
        );

        let mut pools = [
            PricePool::sample(Side::Bid, ranges.bid, allocation.bid.total(), &mut self.rng),
            PricePool::sample(Side::Ask, ranges.ask, allocation.ask.total(), &mut self.rng),
        ];
        let mut batch = assemble(&allocation, &mut pools, &mut self.rng)?;
        shuffle(&mut batch, &mut self.rng);

        Ok(Generated {
            allocation,
            ranges,
            batch,
        })
    }

    /// Generate a batch and hand it to `sink`
    pub fn generate_into<S: OrderSink + ?Sized>(&mut self, sink: &mut S) -> GenerateResult<Generated> {
        let generated = self.generate()?;
        sink.write(generated.batch.orders())?;
        info!(orders = generated.batch.len(), "order stream written");
        Ok(generated)
    }
}

/// Generate one batch from `config`
pub fn generate(config: GeneratorConfig) -> GenerateResult<Generated> {
    OrderGenerator::new(config)?.generate()
}
