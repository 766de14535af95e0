/// Order record types
///
/// Prices are fixed-point with two fractional digits: 35.47 is stored as 3547.
/// Serialized forms (text, JSON, SQL) always render the decimal value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const PRICE_SCALE: u64 = 100;
pub const MIN_SHARES: u32 = 1;
pub const MAX_SHARES: u32 = 1000;

// Absorbs binary representation error when snapping decimals to whole cents
const CENT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Bid, Side::Ask];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "Bid",
            Side::Ask => "Ask",
        }
    }
}

/// Order type tags, opaque to the generator.
///
/// Declaration order is the assembly order of the per-type buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderType {
    GTC,
    FAK,
    FOK,
    GFD,
    M,
}

impl OrderType {
    pub const ALL: [OrderType; 5] = [
        OrderType::GTC,
        OrderType::FAK,
        OrderType::FOK,
        OrderType::GFD,
        OrderType::M,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::GTC => "GTC",
            OrderType::FAK => "FAK",
            OrderType::FOK => "FOK",
            OrderType::GFD => "GFD",
            OrderType::M => "M",
        }
    }

    /// Position in [`OrderType::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(pub u64);

impl Price {
    pub fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Convert a decimal price, rounding to the nearest cent
    pub fn from_f64(value: f64) -> Self {
        Price((value * PRICE_SCALE as f64).round() as u64)
    }

    /// Like [`Price::from_f64`], but `None` when the value is negative, not
    /// finite or too large to hold in cents
    pub fn checked_from_f64(value: f64) -> Option<Self> {
        Self::from_whole_cents((value * PRICE_SCALE as f64).round())
    }

    /// Smallest whole-cent price not below `value`
    pub fn ceil_from_f64(value: f64) -> Option<Self> {
        Self::from_whole_cents((value * PRICE_SCALE as f64 - CENT_EPSILON).ceil())
    }

    /// Largest whole-cent price not above `value`
    pub fn floor_from_f64(value: f64) -> Option<Self> {
        Self::from_whole_cents((value * PRICE_SCALE as f64 + CENT_EPSILON).floor())
    }

    fn from_whole_cents(cents: f64) -> Option<Self> {
        // u64::MAX as f64 is 2^64, the first value that does not fit
        if cents.is_finite() && cents >= 0.0 && cents < u64::MAX as f64 {
            Some(Price(cents as u64))
        } else {
            None
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / PRICE_SCALE, self.0 % PRICE_SCALE)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Price::checked_from_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price: {}", value)))
    }
}

fn deserialize_shares<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let shares = u32::deserialize(deserializer)?;
    if !(MIN_SHARES..=MAX_SHARES).contains(&shares) {
        return Err(serde::de::Error::custom(format!(
            "shares must be in [{}, {}], got {}",
            MIN_SHARES, MAX_SHARES, shares
        )));
    }
    Ok(shares)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: Side,
    pub price: Price,
    #[serde(deserialize_with = "deserialize_shares")]
    pub shares: u32,
}

impl Order {
    pub fn new(order_type: OrderType, side: Side, price: Price, shares: u32) -> Self {
        Order {
            order_type,
            side,
            price,
            shares,
        }
    }
}

/// Renders the text wire line without the trailing newline
impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.order_type, self.side, self.price, self.shares)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseOrderError {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    #[error("unknown order type: {0}")]
    UnknownType(String),

    #[error("unknown side: {0}")]
    UnknownSide(String),

    #[error("price must have exactly 2 fractional digits: {0}")]
    InvalidPrice(String),

    #[error("shares must be an integer in [1, 1000]: {0}")]
    InvalidShares(String),
}

impl FromStr for Side {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bid" => Ok(Side::Bid),
            "Ask" => Ok(Side::Ask),
            other => Err(ParseOrderError::UnknownSide(other.to_string())),
        }
    }
}

impl FromStr for OrderType {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseOrderError::UnknownType(s.to_string()))
    }
}

impl FromStr for Price {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseOrderError::InvalidPrice(s.to_string());
        let (whole, frac) = s.split_once('.').ok_or_else(invalid)?;
        if whole.is_empty() || frac.len() != 2 {
            return Err(invalid());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let frac: u64 = frac.parse().map_err(|_| invalid())?;
        whole
            .checked_mul(PRICE_SCALE)
            .and_then(|w| w.checked_add(frac))
            .map(Price)
            .ok_or_else(invalid)
    }
}

/// Parses one text line: `TYPE SIDE PRICE SHARES`
impl FromStr for Order {
    type Err = ParseOrderError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(ParseOrderError::FieldCount(fields.len()));
        }

        let order_type = fields[0].parse()?;
        let side = fields[1].parse()?;
        let price = fields[2].parse()?;
        let shares = fields[3]
            .parse::<u32>()
            .ok()
            .filter(|s| (MIN_SHARES..=MAX_SHARES).contains(s))
            .ok_or_else(|| ParseOrderError::InvalidShares(fields[3].to_string()))?;

        Ok(Order::new(order_type, side, price, shares))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display() {
        assert_eq!(Price(3547).to_string(), "35.47");
        assert_eq!(Price(4001).to_string(), "40.01");
        assert_eq!(Price(3000).to_string(), "30.00");
        assert_eq!(Price(5).to_string(), "0.05");
    }

    #[test]
    fn test_price_conversions() {
        assert_eq!(Price::from_f64(35.47), Price(3547));
        assert_eq!(Price::from_f64(40.005_1), Price(4001));
        assert!((Price(3547).to_f64() - 35.47).abs() < 1e-9);
    }

    #[test]
    fn test_checked_conversions() {
        assert_eq!(Price::checked_from_f64(35.47), Some(Price(3547)));
        assert_eq!(Price::checked_from_f64(-0.5), None);
        assert_eq!(Price::checked_from_f64(f64::INFINITY), None);
        assert_eq!(Price::checked_from_f64(1e18), None);
        assert_eq!(Price::checked_from_f64(1e15), Some(Price(100_000_000_000_000_000)));
    }

    #[test]
    fn test_snapped_conversions() {
        assert_eq!(Price::ceil_from_f64(30.004), Some(Price(3001)));
        assert_eq!(Price::floor_from_f64(30.004), Some(Price(3000)));
        assert_eq!(Price::ceil_from_f64(35.47), Some(Price(3547)));
        assert_eq!(Price::floor_from_f64(35.47), Some(Price(3547)));
        assert_eq!(Price::ceil_from_f64(40.01), Some(Price(4001)));
        assert_eq!(Price::floor_from_f64(0.0), Some(Price(0)));
    }

    #[test]
    fn test_json_rejects_shares_out_of_range() {
        for shares in [0, 1001] {
            let json = format!(r#"{{"type":"GTC","side":"Bid","price":35.0,"shares":{}}}"#, shares);
            assert!(serde_json::from_str::<Order>(&json).is_err(), "shares {}", shares);
        }
        let json = r#"{"type":"GTC","side":"Bid","price":35.0,"shares":1000}"#;
        assert_eq!(serde_json::from_str::<Order>(json).unwrap().shares, 1000);
    }

    #[test]
    fn test_order_line() {
        let order = Order::new(OrderType::FOK, Side::Ask, Price(4123), 17);
        assert_eq!(order.to_string(), "FOK Ask 41.23 17");
        assert_eq!("FOK Ask 41.23 17".parse::<Order>().unwrap(), order);
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        assert_eq!(
            "GTC Bid 35.4 10".parse::<Order>(),
            Err(ParseOrderError::InvalidPrice("35.4".to_string()))
        );
        assert_eq!(
            "IOC Bid 35.40 10".parse::<Order>(),
            Err(ParseOrderError::UnknownType("IOC".to_string()))
        );
        assert_eq!(
            "GTC Buy 35.40 10".parse::<Order>(),
            Err(ParseOrderError::UnknownSide("Buy".to_string()))
        );
        assert_eq!(
            "GTC Bid 35.40 0".parse::<Order>(),
            Err(ParseOrderError::InvalidShares("0".to_string()))
        );
        assert_eq!("GTC Bid".parse::<Order>(), Err(ParseOrderError::FieldCount(2)));
    }

    #[test]
    fn test_type_order_is_assembly_order() {
        let names: Vec<&str> = OrderType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["GTC", "FAK", "FOK", "GFD", "M"]);
        assert_eq!(OrderType::GFD.index(), 3);
    }

    #[test]
    fn test_json_shape() {
        let order = Order::new(OrderType::M, Side::Bid, Price(3550), 999);
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"{"type":"M","side":"Bid","price":35.5,"shares":999}"#);
    }
}
