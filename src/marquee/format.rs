/// Format a position in seconds as `M:SS`.
///
/// Fractions are dropped (truncation toward zero, never rounding). Negative
/// and NaN inputs format as `0:00`.
pub fn timecode(seconds: f64) -> String {
    // `as` saturates and maps NaN to 0.
    let whole = (seconds as i64).max(0);
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Fraction of the track that has been played, always within `[0, 1]`.
///
/// An unknown (zero) length yields an infinite or NaN quotient; infinities
/// clamp to the matching bound and NaN maps to 0.
pub fn progress_ratio(elapsed: f64, length: f64) -> f64 {
    let ratio = elapsed / length;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Conky bar token for a ratio in `[0, 1]`.
pub fn progress_bar(ratio: f64) -> String {
    let percent = if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0) * 100.0
    };
    format!("${{execbar expr {percent:.2}}}")
}
