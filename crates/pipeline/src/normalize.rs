//! Min-max normalization and blending of score vectors.

/// Scale `values` into [0, 1] with min -> 0 and max -> 1.
///
/// A constant vector (max and min equal within `1e-8 + 1e-5 * |min|`)
/// becomes all zeros rather than dividing by ~0. Empty stays empty.
pub fn min_max_normalize(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }

    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if is_close(max, min) {
        return vec![0.0; values.len()];
    }

    let range = max - min;
    values.iter().map(|&v| (v - min) / range).collect()
}

fn is_close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// `alpha * content + (1 - alpha) * latent`, element-wise.
///
/// Both inputs are expected to be normalized and of equal length.
pub fn blend(content: &[f32], latent: &[f32], alpha: f32) -> Vec<f32> {
    let alpha = alpha.clamp(0.0, 1.0);
    content
        .iter()
        .zip(latent)
        .map(|(&c, &l)| alpha * c + (1.0 - alpha) * l)
        .collect()
}
