/// Realized order distribution
///
/// Counts orders by exact side/type equality and reports the fractions that
/// actually ended up in a batch, for checking against the requested ratios.

use std::collections::BTreeMap;
use std::fmt;

use crate::order::{Order, OrderType, Side};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderStats {
    // [side][type]
    counts: [[usize; 5]; 2],
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Bid => 0,
        Side::Ask => 1,
    }
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

impl OrderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut stats = Self::new();
        for order in orders {
            stats.record(order);
        }
        stats
    }

    /// Record one order
    pub fn record(&mut self, order: &Order) {
        self.counts[side_index(order.side)][order.order_type.index()] += 1;
    }

    pub fn count(&self, side: Side, order_type: OrderType) -> usize {
        self.counts[side_index(side)][order_type.index()]
    }

    pub fn side_total(&self, side: Side) -> usize {
        self.counts[side_index(side)].iter().sum()
    }

    pub fn total(&self) -> usize {
        Side::ALL.iter().map(|&s| self.side_total(s)).sum()
    }

    /// Share of the whole batch on `side`; 0.0 for an empty batch
    pub fn side_fraction(&self, side: Side) -> f64 {
        fraction(self.side_total(side), self.total())
    }

    /// Share of `side`'s orders that have `order_type`; 0.0 for an empty side
    pub fn type_fraction(&self, side: Side, order_type: OrderType) -> f64 {
        fraction(self.count(side, order_type), self.side_total(side))
    }

    /// side -> type -> fraction of that side's orders
    pub fn ratios(&self) -> BTreeMap<Side, BTreeMap<OrderType, f64>> {
        Side::ALL
            .iter()
            .map(|&side| {
                let per_type = OrderType::ALL
                    .iter()
                    .map(|&t| (t, self.type_fraction(side, t)))
                    .collect();
                (side, per_type)
            })
            .collect()
    }

    /// Print statistics summary
    pub fn print_summary(&self) {
        print!("{}", self);
    }
}

impl fmt::Display for OrderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Actual Ratios ({} orders) ===", self.total())?;
        for side in Side::ALL {
            writeln!(f, "{}: {:.2}%", side, self.side_fraction(side) * 100.0)?;
            for order_type in OrderType::ALL {
                writeln!(
                    f,
                    "  {}: {:.2}%",
                    order_type,
                    self.type_fraction(side, order_type) * 100.0
                )?;
            }
        }
        Ok(())
    }
}
