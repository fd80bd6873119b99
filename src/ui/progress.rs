//! Text progress bar.

/// `[#####-----]  50%`. Percent is clamped to 100; `width` counts cells.
#[must_use]
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = percent.min(100);
    let filled = width * usize::from(percent) / 100;
    format!("[{}{}] {percent:>3}%", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0, 10), "[----------]   0%");
        assert_eq!(progress_bar(50, 10), "[#####-----]  50%");
        assert_eq!(progress_bar(100, 10), "[##########] 100%");
    }

    #[test]
    fn bar_rounds_down_and_clamps() {
        assert_eq!(progress_bar(19, 10), "[#---------]  19%");
        assert_eq!(progress_bar(250, 4), "[####] 100%");
        assert_eq!(progress_bar(40, 0), "[]  40%");
    }
}
