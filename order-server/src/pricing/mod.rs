//! Order pricing
//!
//! Pure decimal arithmetic for order amounts. Every derived charge is rounded
//! to 2 decimal places, half away from zero, at the point it is derived, so
//! stored components always add up to the stored total.

use rust_decimal::prelude::*;
use shared::models::MenuItem;

const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to cents (half away from zero)
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Fee and tax rates applied to the subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRates {
    /// Fraction of the subtotal (0.02 = 2%)
    pub platform_fee_rate: Decimal,
    /// Fraction of the subtotal (0.05 = 5%)
    pub tax_rate: Decimal,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            platform_fee_rate: Decimal::new(2, 2),
            tax_rate: Decimal::new(5, 2),
        }
    }
}

impl PricingRates {
    /// Build from whole/decimal percentages (`2` → 2%)
    pub fn from_percent(platform_fee_percent: Decimal, tax_percent: Decimal) -> Self {
        Self {
            platform_fee_rate: platform_fee_percent / Decimal::ONE_HUNDRED,
            tax_rate: tax_percent / Decimal::ONE_HUNDRED,
        }
    }
}

/// One priced order line
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// `unit_price × quantity`, rounded to cents
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Price each `(menu item, quantity)` pair at its effective price
///
/// Returns the priced lines in input order and their subtotal.
pub fn price_items<'a, I>(lines: I) -> (Vec<PricedLine>, Decimal)
where
    I: IntoIterator<Item = (&'a MenuItem, i32)>,
{
    let mut subtotal = Decimal::ZERO;
    let priced: Vec<PricedLine> = lines
        .into_iter()
        .map(|(item, quantity)| {
            let unit_price = round_money(item.effective_price());
            let total_price = line_total(unit_price, quantity);
            subtotal += total_price;
            PricedLine {
                menu_item_id: item.id,
                menu_item_name: item.name.clone(),
                quantity,
                unit_price,
                total_price,
            }
        })
        .collect();
    (priced, subtotal)
}

/// Monetary breakdown of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAmounts {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub platform_fee: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

impl OrderAmounts {
    /// Derive fee, tax and total from the subtotal
    ///
    /// The discount is clamped into `[0, gross]` so the total never goes
    /// negative.
    pub fn compute(
        subtotal: Decimal,
        delivery_fee: Decimal,
        discount: Decimal,
        rates: &PricingRates,
    ) -> Self {
        let subtotal = round_money(subtotal);
        let delivery_fee = round_money(delivery_fee.max(Decimal::ZERO));
        let platform_fee = round_money(subtotal * rates.platform_fee_rate);
        let tax_amount = round_money(subtotal * rates.tax_rate);
        let gross = subtotal + delivery_fee + platform_fee + tax_amount;
        let discount_amount = round_money(discount).clamp(Decimal::ZERO, gross);

        Self {
            subtotal,
            delivery_fee,
            platform_fee,
            tax_amount,
            discount_amount,
            total_amount: gross - discount_amount,
        }
    }

    /// `total == subtotal + delivery + platform + tax - discount`
    pub fn is_consistent(&self) -> bool {
        self.total_amount
            == self.subtotal + self.delivery_fee + self.platform_fee + self.tax_amount
                - self.discount_amount
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// Inputs a discount policy may look at
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext<'a> {
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub subtotal: Decimal,
    pub promo_code: Option<&'a str>,
}

/// Supplies the discount for a new order
///
/// Promo evaluation lives outside the order engine; implementations plug in
/// here. The returned value is clamped by [`OrderAmounts::compute`].
pub trait DiscountPolicy: Send + Sync {
    fn discount(&self, ctx: &DiscountContext<'_>) -> Decimal;
}

/// Never discounts; promo codes are recorded only
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiscount;

impl DiscountPolicy for NoDiscount {
    fn discount(&self, _ctx: &DiscountContext<'_>) -> Decimal {
        Decimal::ZERO
    }
}
