/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    snowflake_id_with_rng(now_millis(), &mut rand::thread_rng())
}

/// Snowflake ID from an explicit clock reading and random source.
pub fn snowflake_id_with_rng<R: rand::Rng + ?Sized>(now: i64, rng: &mut R) -> i64 {
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rng.gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_snowflake_fits_js_safe_integer() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = snowflake_id_with_rng(1_800_000_000_000, &mut rng);
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn test_snowflake_roughly_time_ordered() {
        let mut rng = StdRng::seed_from_u64(7);
        let earlier = snowflake_id_with_rng(1_800_000_000_000, &mut rng);
        let later = snowflake_id_with_rng(1_800_000_000_001, &mut rng);
        assert!(later > earlier);
    }
}
