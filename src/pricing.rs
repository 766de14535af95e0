/// Price ranges and per-side price pools
///
/// Ranges are inclusive and held in cents. Decimal bounds are snapped inward to
/// whole cents, so 30.004..=39.996 becomes 30.01..=39.99. With crossing disabled
/// the Ask range is rebuilt from the Bid range so that the lowest possible Ask
/// sits one cent above the highest possible Bid.

use rand::Rng;

use crate::config::{ConfigError, GeneratorConfig};
use crate::order::{Price, Side, PRICE_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    pub fn new(min: Price, max: Price) -> Self {
        PriceRange { min, max }
    }

    /// Range for `side` from decimal bounds, min rounded up and max rounded down
    pub fn from_f64(side: Side, min: f64, max: f64) -> Result<Self, ConfigError> {
        let (min_name, max_name) = match side {
            Side::Bid => ("minBidPrice", "maxBidPrice"),
            Side::Ask => ("minAskPrice", "maxAskPrice"),
        };
        let lo = Price::ceil_from_f64(min).ok_or(ConfigError::InvalidPrice {
            name: min_name,
            value: min,
        })?;
        let hi = Price::floor_from_f64(max).ok_or(ConfigError::InvalidPrice {
            name: max_name,
            value: max,
        })?;
        if lo > hi {
            return Err(ConfigError::InvertedRange { side, min, max });
        }
        Ok(PriceRange { min: lo, max: hi })
    }

    pub fn contains(&self, price: Price) -> bool {
        price >= self.min && price <= self.max
    }

    /// Width in cents
    pub fn span(&self) -> u64 {
        self.max.cents().saturating_sub(self.min.cents())
    }

    /// Uniform draw over the continuous range, rounded to the nearest cent
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Price {
        if self.span() == 0 {
            return self.min;
        }
        let cents = rng.gen_range(self.min.cents() as f64..=self.max.cents() as f64);
        // Rounding can't leave the range since both bounds are whole cents
        Price::from_cents(cents.round() as u64)
    }
}

/// Ranges actually used for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRanges {
    pub bid: PriceRange,
    pub ask: PriceRange,
}

impl ResolvedRanges {
    pub fn side(&self, side: Side) -> PriceRange {
        match side {
            Side::Bid => self.bid,
            Side::Ask => self.ask,
        }
    }
}

/// Ask range placed above `bid`:
/// `askMin = bidMax + 0.01`, `askMax = askMin + 2 * (bidMax - bidMin)`.
pub fn non_crossing_ask(bid: PriceRange) -> Result<PriceRange, ConfigError> {
    let ask_min = bid.max.cents().checked_add(1);
    let ask_max = ask_min.and_then(|min| bid.span().checked_mul(2).and_then(|width| min.checked_add(width)));
    match (ask_min, ask_max) {
        (Some(min), Some(max)) => Ok(PriceRange::new(Price::from_cents(min), Price::from_cents(max))),
        _ => Err(ConfigError::InvalidPrice {
            name: "maxAskPrice",
            value: bid.max.to_f64() + 0.01 + 2.0 * (bid.span() as f64 / PRICE_SCALE as f64),
        }),
    }
}

/// Resolve the Bid/Ask ranges.
///
/// When `can_cross` is false the caller's Ask bounds are ignored and the Ask
/// range comes from [`non_crossing_ask`].
pub fn resolve_ranges(bid: PriceRange, ask: PriceRange, can_cross: bool) -> Result<ResolvedRanges, ConfigError> {
    let ask = if can_cross { ask } else { non_crossing_ask(bid)? };
    Ok(ResolvedRanges { bid, ask })
}

pub fn resolve_from_config(config: &GeneratorConfig) -> Result<ResolvedRanges, ConfigError> {
    let bid = PriceRange::from_f64(Side::Bid, config.min_bid_price, config.max_bid_price)?;
    let ask = if config.can_cross {
        PriceRange::from_f64(Side::Ask, config.min_ask_price, config.max_ask_price)?
    } else {
        non_crossing_ask(bid)?
    };
    Ok(ResolvedRanges { bid, ask })
}

/// Pre-drawn prices for one side, consumed first-available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePool {
    side: Side,
    prices: Vec<Price>,
}

impl PricePool {
    /// Draw exactly `count` prices from `range`
    pub fn sample<R: Rng + ?Sized>(side: Side, range: PriceRange, count: usize, rng: &mut R) -> Self {
        let prices = (0..count).map(|_| range.sample(rng)).collect();
        PricePool { side, prices }
    }

    pub fn from_prices(side: Side, prices: Vec<Price>) -> Self {
        PricePool { side, prices }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Take the next available price, if any
    pub fn pop(&mut self) -> Option<Price> {
        self.prices.pop()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn prices(&self) -> &[Price] {
        &self.prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bid_range() -> PriceRange {
        PriceRange::new(Price(3000), Price(4000))
    }

    #[test]
    fn test_resolve_without_crossing() {
        let ask = PriceRange::new(Price(3000), Price(5000));
        let resolved = resolve_ranges(bid_range(), ask, false).unwrap();
        assert_eq!(resolved.bid, bid_range());
        assert_eq!(resolved.ask.min, Price(4001));
        assert_eq!(resolved.ask.max, Price(6001));
    }

    #[test]
    fn test_resolve_with_crossing_passes_through() {
        let ask = PriceRange::new(Price(3000), Price(5000));
        let resolved = resolve_ranges(bid_range(), ask, true).unwrap();
        assert_eq!(resolved.bid, bid_range());
        assert_eq!(resolved.ask, ask);
    }

    #[test]
    fn test_bounds_snap_inward() {
        let range = PriceRange::from_f64(Side::Bid, 30.004, 39.996).unwrap();
        assert_eq!(range, PriceRange::new(Price(3001), Price(3999)));

        let exact = PriceRange::from_f64(Side::Bid, 35.47, 40.01).unwrap();
        assert_eq!(exact, PriceRange::new(Price(3547), Price(4001)));

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let pool = PricePool::sample(Side::Bid, range, 2_000, &mut rng);
        assert!(pool.prices().iter().all(|&p| p >= Price(3001) && p <= Price(3999)));
    }

    #[test]
    fn test_bounds_inside_one_cent_are_inverted() {
        assert!(matches!(
            PriceRange::from_f64(Side::Ask, 30.004, 30.006),
            Err(ConfigError::InvertedRange { side: Side::Ask, .. })
        ));
    }

    #[test]
    fn test_unrepresentable_bounds_rejected() {
        assert!(matches!(
            PriceRange::from_f64(Side::Bid, 0.0, 1e18),
            Err(ConfigError::InvalidPrice { name: "maxBidPrice", .. })
        ));
    }

    #[test]
    fn test_derived_ask_overflow_is_error() {
        // 1e17 fits in cents, twice the span does not
        let bid = PriceRange::from_f64(Side::Bid, 0.0, 1e17).unwrap();
        assert!(matches!(
            resolve_ranges(bid, bid, false),
            Err(ConfigError::InvalidPrice { name: "maxAskPrice", .. })
        ));

        let top = PriceRange::new(Price(u64::MAX), Price(u64::MAX));
        assert!(non_crossing_ask(top).is_err());
    }

    #[test]
    fn test_degenerate_bid_range() {
        let bid = PriceRange::new(Price(3500), Price(3500));
        let resolved = resolve_ranges(bid, bid, false).unwrap();
        assert_eq!(resolved.ask, PriceRange::new(Price(3501), Price(3501)));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(resolved.ask.sample(&mut rng), Price(3501));
    }

    #[test]
    fn test_pool_size_and_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let range = bid_range();
        let pool = PricePool::sample(Side::Bid, range, 500, &mut rng);
        assert_eq!(pool.len(), 500);
        assert!(pool.prices().iter().all(|&p| range.contains(p)));
    }

    #[test]
    fn test_pool_drains() {
        let mut pool = PricePool::from_prices(Side::Ask, vec![Price(4100), Price(4200)]);
        assert_eq!(pool.pop(), Some(Price(4200)));
        assert_eq!(pool.pop(), Some(Price(4100)));
        assert_eq!(pool.pop(), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_sampling_is_seeded() {
        let range = bid_range();
        let a = PricePool::sample(Side::Bid, range, 20, &mut ChaCha8Rng::seed_from_u64(3));
        let b = PricePool::sample(Side::Bid, range, 20, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
