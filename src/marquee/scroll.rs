const ELLIPSIS: &str = "...";

/// Return a `width`-rune window onto `text` that advances one rune per `tick`.
///
/// Text that already fits is returned unchanged. Longer text is treated as an
/// endless ribbon of `text + separator` repetitions, and the window starts at
/// `tick mod cycle_len` where `cycle_len` is the rune length of one repetition.
/// The result therefore has exactly `width` runes and repeats every
/// `cycle_len` ticks.
pub fn scroll(text: &str, width: usize, tick: u64, separator: &str) -> String {
    if width == 0 {
        return String::new();
    }

    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }

    // text_len > width >= 1, so the cycle is never empty.
    let cycle_len = text_len + separator.chars().count();
    let step = (tick % cycle_len as u64) as usize;

    text.chars()
        .chain(separator.chars())
        .cycle()
        .skip(step)
        .take(width)
        .collect()
}

/// Cut `text` down to `width` runes, marking the cut with `...`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    if width < ELLIPSIS.len() {
        return ELLIPSIS.chars().take(width).collect();
    }

    let mut out: String = text.chars().take(width - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}
