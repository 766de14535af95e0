/// Generator configuration
///
/// Every field is optional when loaded from JSON; missing keys fall back to the
/// defaults below. Keys use the camelCase names of the order-generation surface
/// (`nOrders`, `ratioGTC`, `minBidPrice`, `canCross`, ...).

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::order::{OrderType, Side};
use crate::pricing::resolve_from_config;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("order count must not be negative: {0}")]
    NegativeOrderCount(i64),

    #[error("ratio {name} must be a finite non-negative number, got {value}")]
    InvalidRatio { name: &'static str, value: f64 },

    #[error("ratioGFD must be below 1, got {0}")]
    GfdRatioTooLarge(f64),

    #[error("type ratios allocate {allocated} {side} orders but the side only has {total}")]
    OverAllocated {
        side: Side,
        allocated: usize,
        total: usize,
    },

    #[error("price {name} must be a finite non-negative number, got {value}")]
    InvalidPrice { name: &'static str, value: f64 },

    #[error("{side} price range is inverted: min {min} > max {max}")]
    InvertedRange { side: Side, min: f64, max: f64 },

    #[error("cannot read config file: {0}")]
    Io(String),

    #[error("malformed config file: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub n_orders: i64,
    #[serde(rename = "ratioGTC")]
    pub ratio_gtc: f64,
    #[serde(rename = "ratioFAK")]
    pub ratio_fak: f64,
    #[serde(rename = "ratioFOK")]
    pub ratio_fok: f64,
    #[serde(rename = "ratioGFD")]
    pub ratio_gfd: f64,
    #[serde(rename = "ratioM")]
    pub ratio_m: f64,
    pub ratio_bid: f64,
    pub ratio_ask: f64,
    pub min_bid_price: f64,
    pub max_bid_price: f64,
    pub min_ask_price: f64,
    pub max_ask_price: f64,
    pub can_cross: bool,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            n_orders: 10_000,
            ratio_gtc: 0.6,
            ratio_fak: 0.1,
            ratio_fok: 0.1,
            ratio_gfd: 0.1,
            ratio_m: 0.1,
            ratio_bid: 0.5,
            ratio_ask: 0.5,
            min_bid_price: 30.00,
            max_bid_price: 40.00,
            min_ask_price: 30.00,
            max_ask_price: 50.00,
            can_cross: false,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Default configuration with the given order count
    pub fn with_orders(n_orders: i64) -> Self {
        GeneratorConfig {
            n_orders,
            ..Self::default()
        }
    }

    /// Load a JSON config file; absent keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    pub fn type_ratio(&self, order_type: OrderType) -> f64 {
        match order_type {
            OrderType::GTC => self.ratio_gtc,
            OrderType::FAK => self.ratio_fak,
            OrderType::FOK => self.ratio_fok,
            OrderType::GFD => self.ratio_gfd,
            OrderType::M => self.ratio_m,
        }
    }

    pub fn side_ratio(&self, side: Side) -> f64 {
        match side {
            Side::Bid => self.ratio_bid,
            Side::Ask => self.ratio_ask,
        }
    }

    /// Structural checks on ratios and prices.
    ///
    /// Over-allocation is checked by the allocator, which needs the side totals.
    /// Price ranges are checked by resolving them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_orders < 0 {
            return Err(ConfigError::NegativeOrderCount(self.n_orders));
        }

        let ratios = [
            ("ratioGTC", self.ratio_gtc),
            ("ratioFAK", self.ratio_fak),
            ("ratioFOK", self.ratio_fok),
            ("ratioGFD", self.ratio_gfd),
            ("ratioM", self.ratio_m),
            ("ratioBid", self.ratio_bid),
            ("ratioAsk", self.ratio_ask),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRatio { name, value });
            }
        }
        if self.ratio_gfd >= 1.0 {
            return Err(ConfigError::GfdRatioTooLarge(self.ratio_gfd));
        }

        let prices = [
            ("minBidPrice", self.min_bid_price),
            ("maxBidPrice", self.max_bid_price),
            ("minAskPrice", self.min_ask_price),
            ("maxAskPrice", self.max_ask_price),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidPrice { name, value });
            }
        }
        // Bounds must fit in cents, as must the derived Ask range; the caller's
        // Ask bounds are discarded when crossing is prevented
        resolve_from_config(self)?;

        Ok(())
    }
}
