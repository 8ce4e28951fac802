//! Line-clear scoring

/// Points for every cleared row, and the unit of the adjacency bonus
pub const ROW_POINTS: u32 = 50;

/// Score for clearing `rows` at once.
///
/// Each row is worth [`ROW_POINTS`]. Rows are compared in ascending order;
/// every pair of physically adjacent rows adds a combo bonus that grows by
/// [`ROW_POINTS`] per adjacent pair in the current run, and the run resets
/// whenever two consecutive rows are not adjacent.
pub fn line_clear_score(rows: &[usize]) -> u32 {
    let mut sorted = rows.to_vec();
    sorted.sort_unstable();

    let base = ROW_POINTS * sorted.len() as u32;
    let mut combo = 0;
    let mut bonus = 0;
    for pair in sorted.windows(2) {
        if pair[1] - pair[0] == 1 {
            combo += 1;
            bonus += ROW_POINTS * combo;
        } else {
            combo = 0;
        }
    }
    base + bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rows() {
        assert_eq!(line_clear_score(&[]), 0);
    }

    #[test]
    fn test_single_row() {
        assert_eq!(line_clear_score(&[7]), 50);
    }

    #[test]
    fn test_adjacent_pair() {
        assert_eq!(line_clear_score(&[5, 6]), 150);
        // Bottom-first order as produced by the grid
        assert_eq!(line_clear_score(&[6, 5]), 150);
    }

    #[test]
    fn test_scattered_pair() {
        assert_eq!(line_clear_score(&[2, 9]), 100);
    }

    #[test]
    fn test_combo_grows_over_a_run() {
        // 4 * 50 base + 50 + 100 + 150 bonus
        assert_eq!(line_clear_score(&[12, 11, 10, 9]), 500);
    }

    #[test]
    fn test_combo_resets_on_gap() {
        // base 200; (3,4) +50; gap; (6,7) +50
        assert_eq!(line_clear_score(&[7, 6, 4, 3]), 300);
    }
}
