use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};

/// Milliseconds in one UTC day
pub const DAY_MS: i64 = 86_400_000;

/// Prefix of every order number
pub const ORDER_NUMBER_PREFIX: &str = "TT";

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
///
/// Ids are strictly increasing within the process: a candidate that does
/// not exceed the last issued id is bumped to `last + 1`.
pub fn snowflake_id() -> i64 {
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    static LAST_ID: AtomicI64 = AtomicI64::new(0);

    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    let candidate = (ts << 12) | rand_bits;

    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = candidate.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// `[start, end)` bounds of the UTC day containing `millis`
pub fn utc_day_bounds(millis: i64) -> (i64, i64) {
    let start = millis.div_euclid(DAY_MS) * DAY_MS;
    (start, start + DAY_MS)
}

/// Human-referenceable order number: `TT` + epoch millis + 3 random digits
pub fn generate_order_number(millis: i64) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{ORDER_NUMBER_PREFIX}{millis}{suffix:03}")
}

/// 4-digit, zero-padded delivery OTP
pub fn generate_otp() -> String {
    let otp: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{otp:04}")
}
