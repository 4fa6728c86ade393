use serde::Serialize;

/// Ordinary least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through `points`. `None` with fewer than two points or when
/// every x is the same.
pub fn ols(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Pearson correlation over pairwise-complete observations: a pair is used
/// only when both values are present. `None` with fewer than two pairs or a
/// constant side.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Square matrix of pairwise [`pearson`] coefficients between `columns`.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ols_recovers_exact_line() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 3.0 * i as f64 - 2.0)).collect();
        let fit = ols(&points).unwrap();
        assert!(close(fit.slope, 3.0));
        assert!(close(fit.intercept, -2.0));
        assert!(close(fit.predict(100.0), 298.0));
    }

    #[test]
    fn ols_needs_spread_in_x() {
        assert_eq!(ols(&[(1.0, 2.0)]), None);
        assert_eq!(ols(&[(1.0, 2.0), (1.0, 5.0)]), None);
    }

    #[test]
    fn pearson_on_perfect_relationships() {
        let x = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let up = vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let down = vec![Some(8.0), Some(6.0), Some(4.0), Some(2.0)];
        assert!(close(pearson(&x, &up).unwrap(), 1.0));
        assert!(close(pearson(&x, &down).unwrap(), -1.0));
    }

    #[test]
    fn pearson_skips_incomplete_pairs() {
        let x = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let y = vec![Some(1.0), Some(100.0), Some(3.0), None];
        // Only (1,1) and (3,3) survive.
        assert!(close(pearson(&x, &y).unwrap(), 1.0));
    }

    #[test]
    fn pearson_undefined_for_constant_or_sparse() {
        let constant = vec![Some(5.0); 4];
        let x = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        assert_eq!(pearson(&x, &constant), None);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let cols = vec![
            vec![Some(1.0), Some(2.0), Some(3.0)],
            vec![Some(1.0), Some(4.0), Some(2.0)],
        ];
        let m = correlation_matrix(&cols);
        assert!(close(m[0][0].unwrap(), 1.0));
        assert_eq!(m[0][1], m[1][0]);
    }
}
