use std::f64::consts::PI;

/// Cyclical encoding of an hour-of-day value (expected domain 0–23).
///
/// `cos(π·(hour + 1) / 24)`, rounded to two decimals. Out-of-domain inputs
/// are passed through the same formula unvalidated; the raw data occasionally
/// carries them and the upstream job scores those rows anyway.
pub fn encode_hour(hour: f64) -> f64 {
    round2((PI * (hour + 1.0) / 24.0).cos())
}

/// Cyclical encoding of a month value (expected domain 1–12).
///
/// `cos(π·month / 12)`, rounded to two decimals.
pub fn encode_month(month: f64) -> f64 {
    round2((PI * month / 12.0).cos())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounded() {
        for h in 0..24 {
            let e = encode_hour(h as f64);
            assert!((-1.0..=1.0).contains(&e), "hour {h} encoded to {e}");
        }
        for m in 1..=12 {
            let e = encode_month(m as f64);
            assert!((-1.0..=1.0).contains(&e), "month {m} encoded to {e}");
        }
    }

    #[test]
    fn test_wraparound_equivalence() {
        // Hour 23 and hour (-1 mod 24) are the same point on the cycle.
        assert_relative_eq!(encode_hour(23.0), encode_hour(-1.0 + 24.0));
    }

    #[test]
    fn test_known_values() {
        // cos(π·12/24) = cos(π/2) = 0
        assert_relative_eq!(encode_hour(11.0), 0.0);
        // cos(π·12/12) = cos(π) = -1
        assert_relative_eq!(encode_month(12.0), -1.0);
        // cos(π·6/12) = 0
        assert_relative_eq!(encode_month(6.0), 0.0);
    }

    #[test]
    fn test_rounded_to_two_decimals() {
        let e = encode_hour(0.0); // cos(π/24) ≈ 0.99144
        assert_relative_eq!(e, 0.99);
        let e = encode_month(1.0); // cos(π/12) ≈ 0.96593
        assert_relative_eq!(e, 0.97);
    }

    #[test]
    fn test_out_of_domain_passes_through() {
        // No validation: the formula is simply applied.
        let e = encode_hour(48.0);
        assert!((-1.0..=1.0).contains(&e));
    }
}
