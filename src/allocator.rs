/// Ratio allocation
///
/// Turns a requested order count and side/type proportions into exact integer
/// counts per (side, type).
///
/// Each side total is `floor(n * ratioSide)`, computed independently, so the
/// grand total is the sum of the two side totals and only equals `n` when the
/// side ratios split it without remainder. Within a side the GFD bucket is
/// sized first; the other four types share what is left, each scaled by
/// `1 / (1 - ratioGFD)`. Truncation losses go to GTC. Type ratios are not
/// required to sum to 1: a shortfall also lands in GTC, while ratios that would
/// allocate more orders than the side holds are rejected.

use tracing::{debug, warn};

use crate::config::{ConfigError, GeneratorConfig};
use crate::order::{OrderType, Side};

/// Per-type order counts for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideCounts {
    counts: [usize; 5],
}

impl SideCounts {
    pub fn get(&self, order_type: OrderType) -> usize {
        self.counts[order_type.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Buckets in assembly order: GTC, FAK, FOK, GFD, M
    pub fn iter(&self) -> impl Iterator<Item = (OrderType, usize)> + '_ {
        OrderType::ALL.iter().map(move |&t| (t, self.get(t)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Allocation {
    pub bid: SideCounts,
    pub ask: SideCounts,
}

impl Allocation {
    pub fn side(&self, side: Side) -> &SideCounts {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    pub fn total(&self) -> usize {
        self.bid.total() + self.ask.total()
    }
}

/// Number of orders a side receives: `floor(n * ratio)`
pub fn side_total(n_orders: u64, ratio: f64) -> usize {
    (n_orders as f64 * ratio).floor() as usize
}

/// Validate the config and compute both sides' counts
pub fn allocate(config: &GeneratorConfig) -> Result<Allocation, ConfigError> {
    config.validate()?;
    let n_orders = config.n_orders as u64;

    let bid = allocate_side(Side::Bid, side_total(n_orders, config.ratio_bid), config)?;
    let ask = allocate_side(Side::Ask, side_total(n_orders, config.ratio_ask), config)?;

    Ok(Allocation { bid, ask })
}

fn allocate_side(side: Side, total: usize, config: &GeneratorConfig) -> Result<SideCounts, ConfigError> {
    let mut counts = [0usize; 5];

    let gfd = (total as f64 * config.ratio_gfd).floor() as usize;
    counts[OrderType::GFD.index()] = gfd;

    let remaining = (total - gfd) as f64;
    let scale = 1.0 - config.ratio_gfd;
    for order_type in OrderType::ALL {
        if order_type == OrderType::GFD {
            continue;
        }
        counts[order_type.index()] = (remaining * config.type_ratio(order_type) / scale).floor() as usize;
    }

    let allocated: usize = counts.iter().sum();
    if allocated > total {
        return Err(ConfigError::OverAllocated {
            side,
            allocated,
            total,
        });
    }

    let shortfall = total - allocated;
    counts[OrderType::GTC.index()] += shortfall;

    // Truncation alone loses at most one order per proportional bucket
    if shortfall > OrderType::ALL.len() - 1 {
        warn!(%side, shortfall, "type ratios sum below 1, topping up GTC");
    }

    let counts = SideCounts { counts };
    debug!(
        %side,
        total,
        gtc = counts.get(OrderType::GTC),
        fak = counts.get(OrderType::FAK),
        fok = counts.get(OrderType::FOK),
        gfd = counts.get(OrderType::GFD),
        m = counts.get(OrderType::M),
        "side allocated"
    );
    Ok(counts)
}
