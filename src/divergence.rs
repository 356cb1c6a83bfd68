/*!
# Divergence
Information-theoretic distances between two flattened probability distributions.
Inputs are renormalized to sum to 1 before any relative entropy is computed, so only the shape of a distribution matters.

## Example usage
```rust
use smile::divergence::jensen_shannon_divergence;

let p = [0.5, 0.5, 0.5, 0.5];
let q = [1.0, 0.0, 0.0, 1.0];
let jsd = jensen_shannon_divergence(&p, &q).unwrap();
assert!((jsd - 0.75 * (4.0_f64 / 3.0).ln()).abs() < 1e-12);

// proportional inputs describe the same distribution
assert_eq!(jensen_shannon_divergence(&p, &[2.0, 2.0, 2.0, 2.0]).unwrap(), 0.0);
```
*/

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DivergenceError {
    #[error("distributions have different lengths: {p_len} != {q_len}")]
    LengthMismatch { p_len: usize, q_len: usize },
    #[error("distributions are empty")]
    Empty,
    #[error("invalid probability {value} at index {index}")]
    InvalidProbability { index: usize, value: f64 },
    #[error("distribution has zero total mass")]
    ZeroMass,
}

/// Checks shared preconditions for a pair of distributions
fn check_pair(p: &[f64], q: &[f64]) -> Result<(), DivergenceError> {
    if p.len() != q.len() {
        return Err(DivergenceError::LengthMismatch { p_len: p.len(), q_len: q.len() });
    }
    if p.is_empty() {
        return Err(DivergenceError::Empty);
    }
    Ok(())
}

/// Scales a distribution so it sums to 1.
/// # Errors
/// * if any value is negative or not finite
/// * if the values sum to 0
fn normalize(values: &[f64]) -> Result<Vec<f64>, DivergenceError> {
    if let Some((index, &value)) = values.iter().enumerate().find(|(_i, v)| !v.is_finite() || **v < 0.0) {
        return Err(DivergenceError::InvalidProbability { index, value });
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(DivergenceError::ZeroMass);
    }
    Ok(values.iter().map(|v| v / total).collect())
}

/// Kullback-Leibler divergence KL(p || q) in nats, after renormalizing both inputs.
/// Terms with p_i = 0 contribute nothing; p_i > 0 with q_i = 0 makes the result infinite.
/// # Errors
/// * if the inputs differ in length, are empty, or are not valid (unnormalized) distributions
pub fn kl_divergence(p: &[f64], q: &[f64]) -> Result<f64, DivergenceError> {
    check_pair(p, q)?;
    let p = normalize(p)?;
    let q = normalize(q)?;
    Ok(relative_entropy(&p, &q))
}

/// Sum of p_i * ln(p_i / q_i) over already normalized inputs
fn relative_entropy(p: &[f64], q: &[f64]) -> f64 {
    p.iter().zip(q.iter())
        .filter(|(pi, _qi)| **pi > 0.0)
        .map(|(&pi, &qi)| {
            if qi > 0.0 {
                pi * (pi / qi).ln()
            } else {
                f64::INFINITY
            }
        })
        .sum()
}

/// Jensen-Shannon divergence in nats: 0.5 * (KL(p || m) + KL(q || m)) with m = (p + q) / 2.
/// The mixture is built from the raw inputs, and each relative entropy renormalizes its own arguments.
/// The result is symmetric, non-negative, and 0 exactly when `p` and `q` are proportional.
/// # Arguments
/// * `p` - first flattened distribution
/// * `q` - second flattened distribution, same length as `p`
/// # Errors
/// * if the inputs differ in length, are empty, contain negative or non-finite values, or sum to 0
pub fn jensen_shannon_divergence(p: &[f64], q: &[f64]) -> Result<f64, DivergenceError> {
    check_pair(p, q)?;
    let p_norm = normalize(p)?;
    let q_norm = normalize(q)?;
    let mixture: Vec<f64> = p.iter().zip(q.iter())
        .map(|(pi, qi)| (pi + qi) / 2.0)
        .collect();
    let m_norm = normalize(&mixture)?;

    let jsd = 0.5 * (relative_entropy(&p_norm, &m_norm) + relative_entropy(&q_norm, &m_norm));
    // rounding can leave a tiny negative value for proportional inputs
    Ok(jsd.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_identical() {
        let p = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(jensen_shannon_divergence(&p, &p).unwrap(), 0.0);
        assert_eq!(kl_divergence(&p, &p).unwrap(), 0.0);
    }

    #[test]
    fn test_known_value() {
        let p = [0.5, 0.5, 0.5, 0.5];
        let q = [1.0, 0.0, 0.0, 1.0];
        let expected = 0.75 * (4.0_f64 / 3.0).ln();
        assert_approx_eq!(jensen_shannon_divergence(&p, &q).unwrap(), expected);
    }

    #[test]
    fn test_symmetry() {
        let p = [0.1, 0.6, 0.3];
        let q = [0.5, 0.25, 0.25];
        let pq = jensen_shannon_divergence(&p, &q).unwrap();
        let qp = jensen_shannon_divergence(&q, &p).unwrap();
        assert_approx_eq!(pq, qp);
        assert!(pq > 0.0);
    }

    #[test]
    fn test_proportional() {
        let p = [1.0, 2.0, 3.0];
        let q = [2.0, 4.0, 6.0];
        assert!(jensen_shannon_divergence(&p, &q).unwrap().abs() < 1e-12);
        assert!(kl_divergence(&p, &q).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_bounded() {
        // disjoint supports hit the upper bound of ln(2)
        let p = [1.0, 0.0];
        let q = [0.0, 1.0];
        assert_approx_eq!(jensen_shannon_divergence(&p, &q).unwrap(), 2.0_f64.ln());
        assert_eq!(kl_divergence(&p, &q).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            jensen_shannon_divergence(&[0.5, 0.5], &[1.0]),
            Err(DivergenceError::LengthMismatch { p_len: 2, q_len: 1 })
        );
        assert_eq!(jensen_shannon_divergence(&[], &[]), Err(DivergenceError::Empty));
        assert_eq!(jensen_shannon_divergence(&[0.0, 0.0], &[0.5, 0.5]), Err(DivergenceError::ZeroMass));
        assert_eq!(
            jensen_shannon_divergence(&[0.5, -0.5], &[0.5, 0.5]),
            Err(DivergenceError::InvalidProbability { index: 1, value: -0.5 })
        );
        assert!(matches!(
            jensen_shannon_divergence(&[0.5, f64::NAN], &[0.5, 0.5]),
            Err(DivergenceError::InvalidProbability { index: 1, .. })
        ));
    }
}
