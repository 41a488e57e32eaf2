//! Linear-time and quadratic-time routines with explicit operation counts.

use super::Counted;

/// Index of the first element equal to `key`. `count` is the number of
/// comparisons, `values.len()` on a miss.
pub fn sequential_search<T: PartialEq>(values: &[T], key: &T) -> Counted<Option<usize>> {
    let mut count = 0;
    for (i, v) in values.iter().enumerate() {
        count += 1;
        if v == key {
            return Counted::new(Some(i), count);
        }
    }
    Counted::new(None, count)
}

/// Pairwise check. Stops at the first duplicate; `count` is the number of
/// comparisons, n(n-1)/2 when every element is distinct.
pub fn all_unique<T: PartialEq>(values: &[T]) -> Counted<bool> {
    let mut count = 0;
    for (i, a) in values.iter().enumerate() {
        for b in &values[i + 1..] {
            count += 1;
            if a == b {
                return Counted::new(false, count);
            }
        }
    }
    Counted::new(true, count)
}

pub fn square_direct(n: u64) -> Counted<u128> {
    Counted::new(n as u128 * n as u128, 1)
}

/// `n` added to itself `n` times.
pub fn square_by_addition(n: u64) -> Counted<u128> {
    let mut sum: u128 = 0;
    let mut count = 0;
    for _ in 0..n {
        sum += n as u128;
        count += 1;
    }
    Counted::new(sum, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [i64; 10] = [32, 14, 5, 17, 23, 9, 11, 4, 26, 29];

    #[test]
    fn test_sequential_search_hit_and_miss() {
        assert_eq!(sequential_search(&SAMPLE, &11), Counted::new(Some(6), 7));
        assert_eq!(sequential_search(&SAMPLE, &32), Counted::new(Some(0), 1));
        assert_eq!(sequential_search(&SAMPLE, &100), Counted::new(None, 10));
        assert_eq!(sequential_search::<i64>(&[], &1), Counted::new(None, 0));
    }

    #[test]
    fn test_all_unique() {
        assert_eq!(all_unique(&SAMPLE), Counted::new(true, 45));
        assert_eq!(all_unique(&[32, 14, 5, 17, 23, 9, 11, 14, 26, 29]), Counted::new(false, 15));
        assert_eq!(all_unique(&[13, 6, 8, 7, 12, 25]), Counted::new(true, 15));
        assert_eq!(all_unique::<u8>(&[]), Counted::new(true, 0));
    }

    #[test]
    fn test_squares_agree() {
        assert_eq!(square_direct(12), Counted::new(144, 1));
        assert_eq!(square_by_addition(12), Counted::new(144, 12));
        assert_eq!(square_by_addition(0), Counted::new(0, 0));
    }
}
