use ndarray::{Array1, Array2, Axis};

const MAX_ITERATIONS: usize = 300;
const TOLERANCE: f64 = 1e-10;

/// Project rows of `matrix` onto its first `k` principal components.
///
/// Components are found one at a time by power iteration on the centered
/// data, each orthogonalized against the ones before it. The start vector is
/// fixed and each component's sign is chosen so its largest-magnitude entry
/// is positive, so the result is deterministic. Returns an `n x k` matrix
/// (`k` capped at the column count); columns past the data's rank are zero.
pub fn pca(matrix: &Array2<f64>, k: usize) -> Array2<f64> {
    let (n, d) = matrix.dim();
    let k = k.min(d);
    if n == 0 || k == 0 {
        return Array2::zeros((n, k));
    }

    let mean = matrix.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));
    let centered = matrix - &mean;

    let mut components: Vec<Array1<f64>> = Vec::with_capacity(k);
    for index in 0..k {
        let component = leading_component(&centered, &components, index);
        components.push(component);
    }

    let mut projected = Array2::zeros((n, k));
    for (col, component) in components.iter().enumerate() {
        projected.column_mut(col).assign(&centered.dot(component));
    }
    projected
}

fn leading_component(centered: &Array2<f64>, previous: &[Array1<f64>], seed: usize) -> Array1<f64> {
    let d = centered.ncols();
    let mut v = start_vector(d, seed);
    orthogonalize(&mut v, previous);
    if !normalize(&mut v) {
        return Array1::zeros(d);
    }

    for _ in 0..MAX_ITERATIONS {
        // (X^T X) v without forming the covariance matrix.
        let mut next = centered.t().dot(&centered.dot(&v));
        orthogonalize(&mut next, previous);
        if !normalize(&mut next) {
            return Array1::zeros(d);
        }
        let delta = (&next - &v).mapv(f64::abs).sum().min((&next + &v).mapv(f64::abs).sum());
        v = next;
        if delta < TOLERANCE {
            break;
        }
    }

    fix_sign(&mut v);
    v
}

fn start_vector(d: usize, seed: usize) -> Array1<f64> {
    // Fixed, non-degenerate pattern; varies by component index.
    Array1::from_iter((0..d).map(|i| {
        let x = ((i + 1) * 2_654_435_761 + seed * 40_503) % 1_000_003;
        0.5 + x as f64 / 1_000_003.0
    }))
}

fn orthogonalize(v: &mut Array1<f64>, basis: &[Array1<f64>]) {
    for b in basis {
        let proj = v.dot(b);
        v.scaled_add(-proj, b);
    }
}

fn normalize(v: &mut Array1<f64>) -> bool {
    let norm = v.dot(v).sqrt();
    if norm < 1e-12 {
        return false;
    }
    v.mapv_inplace(|x| x / norm);
    true
}

fn fix_sign(v: &mut Array1<f64>) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}
