use rand::Rng;
use crate::training_engine::models::GeneratorConfig;

/// Round `value` to `decimals` places after the point.
///
/// Ties go towards +∞ (−2.25 → −2.2), matching how answers are rounded in the
/// trainer. Idempotent: rounding an already-rounded value returns it unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}

/// Granularity of round numbers at digit level `range`: 10^(max(range, 2) - 1).
///
/// Single-digit "round" numbers do not exist, so level 1 behaves like level 2.
pub fn round_granularity(range: u32) -> f64 {
    10f64.powi(range.max(2) as i32 - 1)
}

/// Uniform integer with exactly `range` decimal digits (1..=9 for level 1).
pub fn number_in_range<R: Rng>(rng: &mut R, range: u32) -> f64 {
    let r = range.max(1);
    if r == 1 {
        return rng.gen_range(1..=9u64) as f64;
    }
    let min = 10u64.pow(r - 1);
    let max = 10u64.pow(r) - 1;
    rng.gen_range(min..=max) as f64
}

/// One significant digit times the level's granularity (10, 20 … 90 at level 2).
pub fn round_number<R: Rng>(rng: &mut R, range: u32) -> f64 {
    rng.gen_range(1..=9u64) as f64 * round_granularity(range)
}

/// Sample one visible operand according to the configured digit rules.
///
/// Combined levels pick a fresh level in 1..=3 per operand. Round mode wins
/// over fraction mode; otherwise fraction mode adds a non-zero fractional
/// part at the configured precision.
pub fn sample_operand<R: Rng>(rng: &mut R, config: &GeneratorConfig) -> f64 {
    let range = if config.combine_levels {
        rng.gen_range(1..=3u32)
    } else {
        config.digit_range
    };

    let whole = if config.round_numbers {
        round_number(rng, range)
    } else {
        number_in_range(rng, range)
    };

    if config.fractions && !config.round_numbers {
        let factor = 10u64.pow(config.fraction_decimals);
        let part = rng.gen_range(1..factor) as f64 / factor as f64;
        round_to(whole + part, config.fraction_decimals)
    } else {
        whole
    }
}
