/// Order assembly and shuffling
///
/// Builds orders side by side (Bid first), walking each side's type buckets in
/// GTC, FAK, FOK, GFD, M order. Every order takes one price from its side's
/// pool and a fresh share quantity.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::allocator::Allocation;
use crate::order::{Order, Side, MAX_SHARES, MIN_SHARES};
use crate::pricing::PricePool;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("{side} price pool exhausted")]
    PoolUnderflow { side: Side },

    #[error("{side} price pool has {left} unused prices")]
    PoolSurplus { side: Side, left: usize },

    #[error("no price pool supplied for {side}")]
    MissingPool { side: Side },
}

/// Ordered sequence of generated orders
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderBatch {
    orders: Vec<Order>,
}

impl OrderBatch {
    pub fn new(orders: Vec<Order>) -> Self {
        OrderBatch { orders }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    pub fn side_count(&self, side: Side) -> usize {
        self.orders.iter().filter(|o| o.side == side).count()
    }

    pub fn into_inner(self) -> Vec<Order> {
        self.orders
    }
}

impl<'a> IntoIterator for &'a OrderBatch {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

/// Assemble orders for both sides from the allocation and their price pools.
///
/// `pools` must hold one pool per side; each pool has to be exactly as large
/// as the side's allocated total.
pub fn assemble<R: Rng + ?Sized>(
    allocation: &Allocation,
    pools: &mut [PricePool],
    rng: &mut R,
) -> Result<OrderBatch, AssemblyError> {
    let mut orders = Vec::with_capacity(allocation.total());

    for side in Side::ALL {
        let pool = pools
            .iter_mut()
            .find(|p| p.side() == side)
            .ok_or(AssemblyError::MissingPool { side })?;

        for (order_type, count) in allocation.side(side).iter() {
            for _ in 0..count {
                let price = pool.pop().ok_or(AssemblyError::PoolUnderflow { side })?;
                let shares = rng.gen_range(MIN_SHARES..=MAX_SHARES);
                orders.push(Order::new(order_type, side, price, shares));
            }
        }

        if !pool.is_empty() {
            return Err(AssemblyError::PoolSurplus {
                side,
                left: pool.len(),
            });
        }
    }

    Ok(OrderBatch::new(orders))
}

/// Permute the batch in place
pub fn shuffle<R: Rng + ?Sized>(batch: &mut OrderBatch, rng: &mut R) {
    batch.orders.shuffle(rng);
}
