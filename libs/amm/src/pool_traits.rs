//! Pool trait giving every reserve holder the same price view

use crate::reserve::price;
use rust_decimal::Decimal;
use types::{AmmError, Pool, PriceHistoryPoint, Reserves};

/// Anything carrying a reserve pair that can be priced
pub trait PricedPool {
    /// Current (reserve_a, reserve_b)
    fn reserve_pair(&self) -> (Decimal, Decimal);

    /// Spot price of A in B through the canonical formula
    fn spot_price(&self) -> Result<Decimal, AmmError> {
        let (a, b) = self.reserve_pair();
        price(a, b)
    }
}

impl PricedPool for Reserves {
    fn reserve_pair(&self) -> (Decimal, Decimal) {
        (self.reserve_a, self.reserve_b)
    }
}

impl PricedPool for Pool {
    fn reserve_pair(&self) -> (Decimal, Decimal) {
        self.reserves.reserve_pair()
    }
}

impl PricedPool for PriceHistoryPoint {
    fn reserve_pair(&self) -> (Decimal, Decimal) {
        (self.reserve_a, self.reserve_b)
    }
}
