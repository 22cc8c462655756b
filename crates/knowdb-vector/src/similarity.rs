use knowdb_core::SimilarityMetric;

// Sums run in f64: squares of finite f32 components can neither overflow nor
// underflow there, which keeps cosine scale-invariant across the f32 range.

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    dot_f64(a, b) as f32
}

fn dot_f64(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    norm_f64(v) as f32
}

fn norm_f64(v: &[f32]) -> f64 {
    dot_f64(v, v).sqrt()
}

/// Scale to unit length. The zero vector stays zero.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = norm_f64(v);
    if norm > 0.0 {
        v.iter().map(|x| (f64::from(*x) / norm) as f32).collect()
    } else {
        v.to_vec()
    }
}

pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let denom = norm_f64(a) * norm_f64(b);
    if denom > 0.0 { (dot_f64(a, b) / denom) as f32 } else { 0.0 }
}

pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt() as f32
}

/// Vector as stored for `metric`: unit length for cosine, raw for euclidean.
pub(crate) fn prepare(metric: SimilarityMetric, v: &[f32]) -> Vec<f32> {
    match metric {
        SimilarityMetric::Cosine => normalize(v),
        SimilarityMetric::Euclidean => v.to_vec(),
    }
}

/// Score two vectors already passed through [`prepare`]. Higher is better.
pub(crate) fn score(metric: SimilarityMetric, query: &[f32], stored: &[f32]) -> f32 {
    match metric {
        SimilarityMetric::Cosine => dot(query, stored),
        SimilarityMetric::Euclidean => 1.0 / (1.0 + euclidean_distance(query, stored)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_is_scale_invariant() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert!((cosine(&a, &b) - 1.0).abs() < 1e-6);
        let na = prepare(SimilarityMetric::Cosine, &a);
        let nb = prepare(SimilarityMetric::Cosine, &b);
        assert!((score(SimilarityMetric::Cosine, &na, &nb) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn extreme_magnitudes_still_normalize() {
        for scale in [1e20f32, 1e-25, f32::MAX / 2.0] {
            let v = [scale, 0.0, scale];
            let n = normalize(&v);
            assert!((l2_norm(&n) - 1.0).abs() < 1e-6, "scale {scale}: {n:?}");
            assert!((cosine(&v, &[0.0, 0.0, scale]) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn euclidean_score_decreases_with_distance() {
        let q = [0.0, 0.0];
        let near = score(SimilarityMetric::Euclidean, &q, &[1.0, 0.0]);
        let far = score(SimilarityMetric::Euclidean, &q, &[3.0, 4.0]);
        assert!((near - 0.5).abs() < 1e-6);
        assert!((far - 1.0 / 6.0).abs() < 1e-6);
        assert!(near > far);
    }
}
