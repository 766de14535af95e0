/// Order Stream - Synthetic Order Flow Generator
///
/// Builds randomized order streams for load-testing a matching engine and reads
/// back the latency statistics the engine reports. Features include:
/// - Ratio-consistent allocation across sides and order types
/// - Price range separation to prevent synthetic self-crossing
/// - Seeded, reproducible generation and shuffling
/// - Text, JSON and SQLite output
/// - Realized ratio diagnostics
/// - Latency statistics summaries

pub mod order;
pub mod config;
pub mod allocator;
pub mod pricing;
pub mod assembler;
pub mod sink;
pub mod stats;
pub mod generator;
pub mod latency;

pub use order::{Order, OrderType, Side, Price, ParseOrderError};
pub use config::{GeneratorConfig, ConfigError};
pub use allocator::{allocate, Allocation, SideCounts};
pub use pricing::{non_crossing_ask, resolve_ranges, PricePool, PriceRange, ResolvedRanges};
pub use assembler::{assemble, shuffle, AssemblyError, OrderBatch};
pub use sink::{OrderSink, TextSink, JsonSink, SqliteSink, SinkError, read_text, read_json};
pub use stats::OrderStats;
pub use generator::{generate, OrderGenerator, Generated, GenerateError};
pub use latency::{LatencyReport, LatencyBar, LatencyEntry, LatencyError};
