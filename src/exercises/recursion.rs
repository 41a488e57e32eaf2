//! Recursive and iterative pairs: Fibonacci, factorial, Hanoi, binary digits.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::Counted;

/// Largest `n` whose Fibonacci number fits in a `u128`.
pub const FIB_MAX_N: u32 = 186;
/// Largest `n` whose factorial fits in a `u128`.
pub const FACTORIAL_MAX_N: u32 = 34;

/// Memo table for [`fibonacci_memo`], seeded with fib(1) = fib(2) = 1.
///
/// Owned by the caller; reuse it across calls to keep earlier results.
#[derive(Debug, Clone)]
pub struct FibCache(HashMap<u32, u128>);

impl Default for FibCache {
    fn default() -> Self {
        Self(HashMap::from([(1, 1), (2, 1)]))
    }
}

impl FibCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Plain double recursion. `count` is the number of calls.
///
/// `None` when the result does not fit in a `u128`. Runtime grows
/// exponentially with `n`.
pub fn fibonacci_naive(n: u32) -> Counted<Option<u128>> {
    if n > FIB_MAX_N {
        return Counted::new(None, 0);
    }
    let mut count = 0;
    let value = fib_naive(n, &mut count);
    Counted::new(Some(value), count)
}

fn fib_naive(n: u32, count: &mut u64) -> u128 {
    *count += 1;
    match n {
        0 => 0,
        1 | 2 => 1,
        _ => fib_naive(n - 1, count) + fib_naive(n - 2, count),
    }
}

/// Memoized recursion. `count` is the number of calls, cache hits included.
pub fn fibonacci_memo(n: u32, cache: &mut FibCache) -> Counted<Option<u128>> {
    if n == 0 {
        return Counted::new(Some(0), 1);
    }
    if n > FIB_MAX_N {
        return Counted::new(None, 0);
    }
    let mut count = 0;
    let value = fib_memo(n, cache, &mut count);
    Counted::new(Some(value), count)
}

fn fib_memo(n: u32, cache: &mut FibCache, count: &mut u64) -> u128 {
    *count += 1;
    if let Some(&v) = cache.0.get(&n) {
        return v;
    }
    let v = fib_memo(n - 1, cache, count) + fib_memo(n - 2, cache, count);
    cache.0.insert(n, v);
    v
}

/// `count` is the number of calls. `None` on overflow.
pub fn factorial_recursive(n: u32) -> Counted<Option<u128>> {
    if n > FACTORIAL_MAX_N {
        return Counted::new(None, 0);
    }
    let mut count = 0;
    let value = fact_rec(n, &mut count);
    Counted::new(Some(value), count)
}

fn fact_rec(n: u32, count: &mut u64) -> u128 {
    *count += 1;
    if n <= 1 {
        1
    } else {
        n as u128 * fact_rec(n - 1, count)
    }
}

/// `count` is one for the call plus one per loop iteration. `None` on overflow.
pub fn factorial_iterative(n: u32) -> Counted<Option<u128>> {
    let mut count = 1;
    let mut acc: Option<u128> = Some(1);
    for k in 1..=n as u128 {
        count += 1;
        acc = acc.and_then(|a| a.checked_mul(k));
    }
    Counted::new(acc, count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Peg {
    A,
    B,
    C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    pub disk: u32,
    pub from: Peg,
    pub to: Peg,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "disk {}: {:?} --> {:?}", self.disk, self.from, self.to)
    }
}

/// Moves `n` disks from peg A to peg C through B. `count` is the number of
/// calls, 2^n - 1 for n >= 1.
pub fn hanoi(n: u32) -> Counted<Vec<Move>> {
    let mut moves = Vec::new();
    let mut count = 0;
    if n > 0 {
        hanoi_step(n, Peg::A, Peg::B, Peg::C, &mut moves, &mut count);
    }
    Counted::new(moves, count)
}

fn hanoi_step(n: u32, from: Peg, via: Peg, to: Peg, moves: &mut Vec<Move>, count: &mut u64) {
    *count += 1;
    if n == 1 {
        moves.push(Move { disk: 1, from, to });
        return;
    }
    hanoi_step(n - 1, from, to, via, moves, count);
    moves.push(Move { disk: n, from, to });
    hanoi_step(n - 1, via, from, to, moves, count);
}

/// Number of binary digits of `n` (0 has one). `count` is loop steps.
pub fn binary_digits_iterative(mut n: u64) -> Counted<u32> {
    let mut digits = 1;
    let mut count = 0;
    while n > 1 {
        count += 1;
        digits += 1;
        n /= 2;
    }
    Counted::new(digits, count)
}

/// Same as [`binary_digits_iterative`]. `count` is the number of calls.
pub fn binary_digits_recursive(n: u64) -> Counted<u32> {
    let mut count = 0;
    let digits = bits_rec(n, &mut count);
    Counted::new(digits, count)
}

fn bits_rec(n: u64, count: &mut u64) -> u32 {
    *count += 1;
    if n <= 1 { 1 } else { 1 + bits_rec(n / 2, count) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_naive_counts_calls() {
        assert_eq!(fibonacci_naive(0), Counted::new(Some(0), 1));
        assert_eq!(fibonacci_naive(1), Counted::new(Some(1), 1));
        // calls(n) = 2 * fib(n) - 1 with fib(1) = fib(2) = 1 as base cases
        assert_eq!(fibonacci_naive(10), Counted::new(Some(55), 109));
    }

    #[test]
    fn test_fibonacci_memo_is_linear() {
        let mut cache = FibCache::new();
        let first = fibonacci_memo(10, &mut cache);
        assert_eq!(first.value, Some(55));
        assert_eq!(first.count, 17);
        assert_eq!(cache.len(), 10);

        // The caller keeps the cache, so the second call is a single hit.
        let again = fibonacci_memo(10, &mut cache);
        assert_eq!(again, Counted::new(Some(55), 1));
    }

    #[test]
    fn test_fibonacci_limits() {
        let mut cache = FibCache::new();
        assert_eq!(
            fibonacci_memo(FIB_MAX_N, &mut cache).value,
            Some(332_825_110_087_067_562_321_196_029_789_634_457_848)
        );
        assert_eq!(fibonacci_memo(FIB_MAX_N + 1, &mut cache).value, None);
        assert_eq!(fibonacci_naive(FIB_MAX_N + 1).value, None);
    }

    #[test]
    fn test_factorials_agree() {
        let rec = factorial_recursive(5);
        let iter = factorial_iterative(5);
        assert_eq!(rec, Counted::new(Some(120), 5));
        assert_eq!(iter, Counted::new(Some(120), 6));
        assert_eq!(factorial_recursive(0).value, Some(1));
        assert_eq!(factorial_iterative(0), Counted::new(Some(1), 1));
    }

    #[test]
    fn test_factorial_overflow() {
        assert!(factorial_iterative(FACTORIAL_MAX_N).value.is_some());
        assert_eq!(factorial_iterative(FACTORIAL_MAX_N + 1).value, None);
        assert_eq!(factorial_recursive(FACTORIAL_MAX_N + 1).value, None);
    }

    #[test]
    fn test_hanoi_moves_and_calls() {
        let result = hanoi(3);
        assert_eq!(result.count, 7);
        assert_eq!(result.value.len(), 7);
        assert_eq!(result.value[0], Move { disk: 1, from: Peg::A, to: Peg::C });
        assert_eq!(result.value[3], Move { disk: 3, from: Peg::A, to: Peg::C });
        assert_eq!(result.value[3].to_string(), "disk 3: A --> C");

        assert_eq!(hanoi(10).count, 1023);
        assert_eq!(hanoi(0), Counted::new(Vec::new(), 0));
    }

    #[test]
    fn test_binary_digits() {
        for (n, digits) in [(0, 1), (1, 1), (2, 2), (255, 8), (256, 9), (1000, 10)] {
            assert_eq!(binary_digits_iterative(n).value, digits, "n = {n}");
            assert_eq!(binary_digits_recursive(n).value, digits, "n = {n}");
        }
        assert_eq!(binary_digits_iterative(1000).count, 9);
        assert_eq!(binary_digits_recursive(1000).count, 10);
    }
}
