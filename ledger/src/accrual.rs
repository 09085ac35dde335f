//! Pure accrual arithmetic.
//!
//! Interest is simple (first-order) over the elapsed window:
//! `interest = floor(principal * rate * elapsed / PRECISION_FACTOR)`.
//! Truncation always rounds toward zero, so each settlement may drop strictly
//! less than one raw unit.

use rebase_types::{Amount, Rate, PRECISION_FACTOR};

/// `floor(a * b / d)` without requiring `a * b` to fit in a u128.
///
/// Splits both factors around `d` so every partial product stays in range:
/// `a = q*d + r`, `b = s*d + t` gives `a*b/d = q*s*d + q*t + r*s + r*t/d`.
/// Requires `d <= 2^64` for `r * t` to fit. Returns `None` if the result
/// itself overflows or `d == 0`.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / d);
    }
    let (q, r) = (a / d, a % d);
    let (s, t) = (b / d, b % d);
    let remainder = r.checked_mul(t)? / d;
    q.checked_mul(s)?
        .checked_mul(d)?
        .checked_add(q.checked_mul(t)?)?
        .checked_add(r.checked_mul(s)?)?
        .checked_add(remainder)
}

/// Interest accrued on `principal` at `rate` over `elapsed` seconds.
pub fn accrued_interest(principal: Amount, rate: Rate, elapsed: u64) -> Option<Amount> {
    if principal.is_zero() || rate.is_zero() || elapsed == 0 {
        return Some(Amount::ZERO);
    }
    let factor = rate.raw().checked_mul(elapsed as u128)?;
    mul_div_floor(principal.raw(), factor, PRECISION_FACTOR).map(Amount::new)
}

/// `principal * (P + rate * elapsed) / P`, i.e. principal plus accrued interest.
pub fn effective_balance(principal: Amount, rate: Rate, elapsed: u64) -> Option<Amount> {
    principal.checked_add(accrued_interest(principal, rate, elapsed)?)
}
