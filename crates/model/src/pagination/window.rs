/// Offsets for one chunk, grouped into fan-out windows.
///
/// Offsets run `0, page_size, 2 * page_size, ...` up to and including the
/// remote API's offset ceiling; the ceiling is the last offset the API will
/// honor before it starts reporting "not found". Each inner `Vec` is one
/// window of at most `window_len` offsets fetched concurrently.
pub fn fanout_windows(offset_ceiling: u64, page_size: u64, window_len: usize) -> Vec<Vec<u64>> {
    if page_size == 0 || window_len == 0 {
        return Vec::new();
    }

    let offsets: Vec<u64> = (0..=offset_ceiling).step_by(page_size as usize).collect();
    offsets
        .chunks(window_len)
        .map(|window| window.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_offset_up_to_the_ceiling() {
        let windows = fanout_windows(99_000, 1_000, 15);
        let offsets: Vec<u64> = windows.iter().flatten().copied().collect();

        assert_eq!(offsets.len(), 100);
        assert_eq!(offsets.first(), Some(&0));
        assert_eq!(offsets.last(), Some(&99_000));
        assert!(offsets.windows(2).all(|w| w[1] == w[0] + 1_000));
    }

    #[test]
    fn windows_are_bounded_by_window_len() {
        let windows = fanout_windows(99_000, 1_000, 15);
        assert!(windows.iter().all(|w| w.len() <= 15));
        assert_eq!(windows.len(), 7); // 100 offsets in windows of 15
    }

    #[test]
    fn single_page_dataset_gets_one_window() {
        let windows = fanout_windows(0, 1_000, 15);
        assert_eq!(windows, vec![vec![0]]);
    }

    #[test]
    fn zero_page_size_yields_nothing() {
        assert!(fanout_windows(99_000, 0, 15).is_empty());
    }
}
