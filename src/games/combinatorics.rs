//! Exact integer combinatorics for the odds tables

/// `n!`, or `None` once it no longer fits in a `u128` (n > 34)
pub fn factorial(n: u32) -> Option<u128> {
    (1..=n as u128).try_fold(1u128, |acc, k| acc.checked_mul(k))
}

/// `C(n, k)` via the multiplicative formula, which stays exact because every
/// partial product `C(n, i+1)` is an integer. Returns 0 when `k > n`.
pub fn combination(n: u32, k: u32) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result = 1u128;
    for i in 0..k {
        result = result.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    Some(result)
}

/// `P(X = k)` for `X ~ Binomial(n, p)`
pub fn binomial_pmf(n: u32, k: u32, p: f64) -> f64 {
    match combination(n, k) {
        Some(0) | None => 0.0,
        Some(ways) => ways as f64 * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32),
    }
}
