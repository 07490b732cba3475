//! The pricing engine.
//!
//! Pure computation of discounted unit prices and order totals. No I/O, no state: callers fetch
//! the catalog data and any per-user discount override, and this module turns them into a price.
//!
//! All fractional arithmetic happens in [`Decimal`] space; results are rounded half-up to the
//! cent. A discount outside [0, 100] is corrupt catalog data and is surfaced as an error rather
//! than silently clamped.
use bg_common::Money;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::db_types::DiscountBps;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("The quantity must be greater than 0. Got {0}")]
    InvalidQuantity(i64),
    #[error("Discount of {0}% is outside [0, 100]. This indicates corrupt catalog data")]
    InvalidDiscount(Decimal),
    #[error("Price computation overflowed")]
    Overflow,
    #[error("Price computation produced a negative amount")]
    NegativePrice,
}

/// The discount that applies to a (user, service option) pair: the larger of the option's global
/// discount and the user's override, if one exists.
pub fn effective_discount(
    base: DiscountBps,
    user_override: Option<DiscountBps>,
) -> Result<DiscountBps, PricingError> {
    let candidate = user_override.map_or(base, |o| base.max(o));
    if !candidate.is_valid() {
        return Err(PricingError::InvalidDiscount(candidate.as_percent()));
    }
    Ok(candidate)
}

/// The per-unit price after applying `discount`, rounded half-up to the cent.
pub fn unit_price(base_unit_price: Money, discount: DiscountBps) -> Result<Money, PricingError> {
    if !discount.is_valid() {
        return Err(PricingError::InvalidDiscount(discount.as_percent()));
    }
    let factor = Decimal::ONE - discount.as_percent() / Decimal::ONE_HUNDRED;
    let discounted = base_unit_price.to_decimal().checked_mul(factor).ok_or(PricingError::Overflow)?;
    let price = Money::try_from_decimal(discounted).map_err(|_| PricingError::Overflow)?;
    if price.value() < 0 {
        return Err(PricingError::NegativePrice);
    }
    Ok(price)
}

/// `unit_price * quantity`. The unit price is already an exact cent amount, so the total is an
/// exact integer multiple.
pub fn total_price(unit_price: Money, quantity: i64) -> Result<Money, PricingError> {
    if quantity <= 0 {
        return Err(PricingError::InvalidQuantity(quantity));
    }
    let total = unit_price.value().checked_mul(quantity).ok_or(PricingError::Overflow)?;
    if total < 0 {
        return Err(PricingError::NegativePrice);
    }
    Ok(Money::from_cents(total))
}

/// Convenience used by the order flow: effective discount, then unit price, then total.
pub fn quote(
    base_unit_price: Money,
    base_discount: DiscountBps,
    user_override: Option<DiscountBps>,
    quantity: i64,
) -> Result<(Money, Money), PricingError> {
    let discount = effective_discount(base_discount, user_override)?;
    let unit = unit_price(base_unit_price, discount)?;
    let total = total_price(unit, quantity)?;
    Ok((unit, total))
}
