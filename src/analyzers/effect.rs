use serde::Serialize;

/// Magnitude class of a standardized mean difference (Cohen's d).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectClass {
    Small,
    Medium,
    Large,
}

/// Outcome of comparing a p-value with the significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// `p < alpha`: reject the null hypothesis of equal means.
    Significant,
    NotSignificant,
    /// The test statistic could not be computed for this scope.
    Undetermined,
}

/// Converts an effect size into a class.
///
/// | Range            | Class  |
/// |------------------|--------|
/// | > 0.8            | Large  |
/// | 0.5 ..= 0.8      | Medium |
/// | < 0.5            | Small  |
pub fn classify_effect(d: f64) -> EffectClass {
    match d {
        d if d > 0.8 => EffectClass::Large,
        d if d >= 0.5 => EffectClass::Medium,
        _ => EffectClass::Small,
    }
}

/// `|mean_a - mean_b| / sqrt((var_a + var_b) / 2)`; `None` when the pooled
/// deviation is zero or not finite.
pub fn cohens_d(mean_a: f64, var_a: f64, mean_b: f64, var_b: f64) -> Option<f64> {
    let pooled = ((var_a + var_b) / 2.0).sqrt();
    if !pooled.is_finite() || pooled == 0.0 {
        return None;
    }
    Some((mean_a - mean_b).abs() / pooled)
}

pub fn verdict(p_value: Option<f64>, alpha: f64) -> Verdict {
    match p_value {
        Some(p) if p.is_finite() && p < alpha => Verdict::Significant,
        Some(p) if p.is_finite() => Verdict::NotSignificant,
        _ => Verdict::Undetermined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_boundaries() {
        assert_eq!(classify_effect(0.0), EffectClass::Small);
        assert_eq!(classify_effect(0.49), EffectClass::Small);
        assert_eq!(classify_effect(0.5), EffectClass::Medium);
        assert_eq!(classify_effect(0.8), EffectClass::Medium);
        assert_eq!(classify_effect(0.81), EffectClass::Large);
    }

    #[test]
    fn test_cohens_d_ignores_sign() {
        let up = cohens_d(10.0, 4.0, 8.0, 4.0).unwrap();
        let down = cohens_d(8.0, 4.0, 10.0, 4.0).unwrap();
        assert_eq!(up, 1.0);
        assert_eq!(up, down);
    }

    #[test]
    fn test_cohens_d_zero_spread_is_undefined() {
        assert_eq!(cohens_d(5.0, 0.0, 3.0, 0.0), None);
    }

    #[test]
    fn test_verdict() {
        assert_eq!(verdict(Some(0.01), 0.05), Verdict::Significant);
        assert_eq!(verdict(Some(0.05), 0.05), Verdict::NotSignificant);
        assert_eq!(verdict(Some(f64::NAN), 0.05), Verdict::Undetermined);
        assert_eq!(verdict(None, 0.05), Verdict::Undetermined);
    }
}
