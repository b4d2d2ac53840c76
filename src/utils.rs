/// Calculate the minimum distance between two points on a circular modulo space.
pub fn mod_dist(x: f64, y: f64, modulo: f64) -> f64 {
    let diff1 = (x - y).rem_euclid(modulo);
    let diff2 = (y - x).rem_euclid(modulo);
    diff1.min(diff2)
}

/// The logistic sigmoid.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// The inverse of the logistic sigmoid, defined on (0, 1).
pub fn logit(p: f32) -> f32 {
    (p / (1.0 - p)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mod_dist() {
        assert_eq!(mod_dist(1.0, 19.0, 20.0), 2.0);
        assert_eq!(mod_dist(19.0, 1.0, 20.0), 2.0);
        assert_eq!(mod_dist(3.0, 8.0, 20.0), 5.0);
        assert_eq!(mod_dist(4.0, 4.0, 20.0), 0.0);
    }

    #[test]
    fn test_sigmoid_logit() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert_relative_eq!(sigmoid(logit(0.1)), 0.1, epsilon = 1e-6);
        assert!(sigmoid(-100.0) >= 0.0);
        assert!(sigmoid(100.0) <= 1.0);
    }
}
