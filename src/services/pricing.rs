//! Offer pricing
//!
//! Net amount → discount → VAT → gross amount. The discount is truncated
//! towards zero and the gross value is rounded half-up, so the last unit of
//! currency can differ from a naive floating-point calculation.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Amount cannot be negative (got {0})")]
    NegativeAmount(i64),

    #[error("Discount must be between 0 and 100 (got {0})")]
    DiscountOutOfRange(i64),

    #[error("VAT rate cannot be negative (got {0})")]
    NegativeVat(i64),

    #[error("Gross amount is too large")]
    Overflow,
}

impl PricingError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NegativeAmount(_) | Self::Overflow => "amount",
            Self::DiscountOutOfRange(_) => "discountPercent",
            Self::NegativeVat(_) => "vatRate",
        }
    }
}

/// Every intermediate value of the pricing calculation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub net_amount: i64,
    pub discount_percent: i64,
    pub discount_amount: i64,
    pub discounted_amount: i64,
    pub vat_rate: i64,
    pub vat_amount: i64,
    pub final_amount: i64,
}

fn check(amount: i64, discount_percent: i64, vat_rate: i64) -> Result<(), PricingError> {
    if amount < 0 {
        return Err(PricingError::NegativeAmount(amount));
    }
    if !(0..=100).contains(&discount_percent) {
        return Err(PricingError::DiscountOutOfRange(discount_percent));
    }
    if vat_rate < 0 {
        return Err(PricingError::NegativeVat(vat_rate));
    }
    Ok(())
}

pub fn breakdown(
    amount: i64,
    discount_percent: i64,
    vat_rate: i64,
) -> Result<PricingBreakdown, PricingError> {
    check(amount, discount_percent, vat_rate)?;

    // Widen so that amount * (100 + vat) cannot overflow.
    let net = amount as i128;
    let discount = net * discount_percent as i128 / 100;
    let discounted = net - discount;
    let gross = (discounted * (100 + vat_rate as i128) + 50) / 100;

    // discount and discounted are bounded by amount; only gross can exceed i64
    let final_amount = i64::try_from(gross).map_err(|_| PricingError::Overflow)?;
    let discounted = discounted as i64;

    Ok(PricingBreakdown {
        net_amount: amount,
        discount_percent,
        discount_amount: discount as i64,
        discounted_amount: discounted,
        vat_rate,
        vat_amount: final_amount - discounted,
        final_amount,
    })
}

/// Gross payable amount for an offer.
pub fn calculate_final_amount(
    amount: i64,
    discount_percent: i64,
    vat_rate: i64,
) -> Result<i64, PricingError> {
    breakdown(amount, discount_percent, vat_rate).map(|b| b.final_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vat_without_discount() {
        assert_eq!(calculate_final_amount(15000, 0, 23), Ok(18450));
    }

    #[test]
    fn discount_applies_before_vat() {
        let b = breakdown(10000, 10, 23).unwrap();
        assert_eq!(b.discount_amount, 1000);
        assert_eq!(b.discounted_amount, 9000);
        assert_eq!(b.vat_amount, 2070);
        assert_eq!(b.final_amount, 11070);
    }

    #[test]
    fn discount_truncates_and_gross_rounds_half_up() {
        // 999 * 15% = 149.85 -> 149 off, 850 net
        // 850 * 1.05 = 892.5 -> 893
        let b = breakdown(999, 15, 5).unwrap();
        assert_eq!(b.discounted_amount, 850);
        assert_eq!(b.final_amount, 893);

        // 101 * 1.08 = 109.08 -> 109
        assert_eq!(calculate_final_amount(101, 0, 8), Ok(109));
    }

    #[test]
    fn full_discount_and_zero_vat() {
        assert_eq!(calculate_final_amount(5000, 100, 23), Ok(0));
        assert_eq!(calculate_final_amount(5000, 0, 0), Ok(5000));
        assert_eq!(calculate_final_amount(0, 50, 23), Ok(0));
    }

    #[test]
    fn rejects_out_of_domain_inputs() {
        assert_eq!(
            calculate_final_amount(-1, 0, 23),
            Err(PricingError::NegativeAmount(-1))
        );
        assert_eq!(
            calculate_final_amount(100, 101, 23),
            Err(PricingError::DiscountOutOfRange(101))
        );
        assert_eq!(
            calculate_final_amount(100, -1, 23),
            Err(PricingError::DiscountOutOfRange(-1))
        );
        assert_eq!(
            calculate_final_amount(100, 0, -5),
            Err(PricingError::NegativeVat(-5))
        );
    }

    #[test]
    fn gross_beyond_i64_is_rejected() {
        assert_eq!(
            calculate_final_amount(i64::MAX, 0, 23),
            Err(PricingError::Overflow)
        );
        assert_eq!(calculate_final_amount(i64::MAX, 0, 0), Ok(i64::MAX));
        // a full discount keeps even the largest amount in range
        assert_eq!(calculate_final_amount(i64::MAX, 100, 23), Ok(0));
    }

    #[test]
    fn errors_name_the_request_field() {
        assert_eq!(PricingError::DiscountOutOfRange(150).field(), "discountPercent");
        assert_eq!(PricingError::NegativeVat(-1).field(), "vatRate");
        assert_eq!(PricingError::Overflow.field(), "amount");
    }

    #[test]
    fn gross_never_drops_below_discounted_net() {
        for amount in [0_i64, 1, 7, 99, 1234, 99_999, 10_000_000] {
            for discount in [0_i64, 1, 13, 50, 99, 100] {
                for vat in [0_i64, 5, 8, 23] {
                    let final_amount = calculate_final_amount(amount, discount, vat).unwrap();
                    assert!(final_amount >= 0);
                    // final * 100 >= amount * (100 - discount)
                    assert!(
                        final_amount as i128 * 100 >= amount as i128 * (100 - discount) as i128,
                        "amount={amount} discount={discount} vat={vat}"
                    );
                }
            }
        }
    }
}
