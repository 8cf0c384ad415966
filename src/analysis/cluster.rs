use ndarray::{Array2, ArrayView1, Axis};

/// Result of [`kmeans`].
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    /// Cluster label per input row, in `0..k`.
    pub labels: Vec<usize>,
    pub centroids: Array2<f64>,
    pub iterations: usize,
}

/// Lloyd's k-means with deterministic farthest-point seeding.
///
/// The first centroid is row 0; each next one is the row farthest from all
/// centroids chosen so far (lowest index on ties). `k` is capped at the row
/// count. A cluster that loses all its members keeps its previous centroid.
pub fn kmeans(points: &Array2<f64>, k: usize, max_iter: usize) -> KMeans {
    let (n, d) = points.dim();
    let k = k.min(n);
    if k == 0 {
        return KMeans {
            labels: vec![0; n],
            centroids: Array2::zeros((0, d)),
            iterations: 0,
        };
    }

    let mut centroids = Array2::zeros((k, d));
    let mut nearest = vec![f64::INFINITY; n];
    let mut chosen = 0usize;
    for c in 0..k {
        centroids.row_mut(c).assign(&points.row(chosen));
        for (i, best) in nearest.iter_mut().enumerate() {
            *best = best.min(sq_dist(points.row(i), centroids.row(c)));
        }
        chosen = farthest(&nearest);
    }

    let mut labels = vec![usize::MAX; n];
    let mut iterations = 0;
    while iterations < max_iter.max(1) {
        iterations += 1;

        let mut changed = false;
        for (i, label) in labels.iter_mut().enumerate() {
            let assigned = closest(points.row(i), &centroids);
            if *label != assigned {
                *label = assigned;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = Array2::<f64>::zeros((k, d));
        let mut counts = vec![0usize; k];
        for (i, &label) in labels.iter().enumerate() {
            let mut row = sums.row_mut(label);
            row += &points.row(i);
            counts[label] += 1;
        }
        for (c, count) in counts.into_iter().enumerate() {
            if count > 0 {
                let mean = sums.row(c).mapv(|x| x / count as f64);
                centroids.row_mut(c).assign(&mean);
            }
        }
    }

    KMeans {
        labels,
        centroids,
        iterations,
    }
}

/// Mean squared distance from each row to its centroid.
pub fn inertia(points: &Array2<f64>, result: &KMeans) -> f64 {
    if points.nrows() == 0 || result.centroids.nrows() == 0 {
        return 0.0;
    }
    points
        .axis_iter(Axis(0))
        .zip(&result.labels)
        .map(|(row, &label)| sq_dist(row, result.centroids.row(label)))
        .sum::<f64>()
        / points.nrows() as f64
}

fn sq_dist(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn closest(point: ArrayView1<f64>, centroids: &Array2<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.axis_iter(Axis(0)).enumerate() {
        let dist = sq_dist(point, centroid);
        if dist < best_dist {
            best = c;
            best_dist = dist;
        }
    }
    best
}

fn farthest(distances: &[f64]) -> usize {
    let mut best = 0;
    for (i, &d) in distances.iter().enumerate() {
        if d > distances[best] {
            best = i;
        }
    }
    best
}
