use serde::Serialize;
use std::fmt;

/// Real roots of `a x² + b x + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadraticRoots {
    /// `a == 0`.
    NotQuadratic,
    NoRealRoots,
    Repeated(f64),
    /// Larger root first.
    Two(f64, f64),
}

impl fmt::Display for QuadraticRoots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadraticRoots::NotQuadratic => write!(f, "not a quadratic equation"),
            QuadraticRoots::NoRealRoots => write!(f, "no real roots"),
            QuadraticRoots::Repeated(x) => write!(f, "x = {x}"),
            QuadraticRoots::Two(x1, x2) => write!(f, "x1 = {x1}, x2 = {x2}"),
        }
    }
}

pub fn solve_quadratic(a: f64, b: f64, c: f64) -> QuadraticRoots {
    if a == 0.0 {
        return QuadraticRoots::NotQuadratic;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        QuadraticRoots::NoRealRoots
    } else if discriminant == 0.0 {
        QuadraticRoots::Repeated(-b / (2.0 * a))
    } else {
        let root = discriminant.sqrt();
        let x1 = (-b + root) / (2.0 * a);
        let x2 = (-b - root) / (2.0 * a);
        QuadraticRoots::Two(x1.max(x2), x1.min(x2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_roots() {
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0), QuadraticRoots::Two(2.0, 1.0));
        assert_eq!(solve_quadratic(-1.0, 3.0, -2.0), QuadraticRoots::Two(2.0, 1.0));
    }

    #[test]
    fn test_repeated_and_none() {
        assert_eq!(solve_quadratic(1.0, -2.0, 1.0), QuadraticRoots::Repeated(1.0));
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), QuadraticRoots::NoRealRoots);
        assert_eq!(solve_quadratic(0.0, 2.0, 1.0), QuadraticRoots::NotQuadratic);
    }

    #[test]
    fn test_display() {
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0).to_string(), "x1 = 2, x2 = 1");
    }
}
