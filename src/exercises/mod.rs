//! Counted classroom algorithms.
//!
//! Every routine reports the number of basic operations it performed next to
//! its result, so two implementations of the same function can be compared
//! side by side without shared counters.

pub mod quadratic;
pub mod recursion;
pub mod search;

use serde::Serialize;

/// A result together with the operation count that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counted<T> {
    pub value: T,
    pub count: u64,
}

impl<T> Counted<T> {
    pub fn new(value: T, count: u64) -> Self {
        Self { value, count }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Counted<U> {
        Counted::new(f(self.value), self.count)
    }
}
