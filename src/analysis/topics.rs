use ndarray::Array2;
use serde::Serialize;

const ITERATIONS: usize = 200;
const EPSILON: f64 = 1e-10;

/// One extracted topic: its highest-weighted terms, strongest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub index: usize,
    pub words: Vec<String>,
    pub weights: Vec<f64>,
}

/// Factorization `V ≈ W H` with non-negative factors.
#[derive(Debug, Clone)]
pub struct Nmf {
    /// Document-topic weights, `n x r`.
    pub w: Array2<f64>,
    /// Topic-term weights, `r x d`.
    pub h: Array2<f64>,
}

impl Nmf {
    /// Index of the heaviest topic for each document (`None` for all-zero rows).
    pub fn dominant_topics(&self) -> Vec<Option<usize>> {
        self.w
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &v)| v > 0.0)
                    .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
                        Some((_, bv)) if bv >= v => best,
                        _ => Some((i, v)),
                    })
                    .map(|(i, _)| i)
            })
            .collect()
    }
}

/// Factorize a non-negative matrix with Lee–Seung multiplicative updates
/// (Frobenius loss). Initialization is a fixed pattern scaled to the data,
/// so results are reproducible. `rank` is capped at `min(n, d)`.
pub fn nmf(matrix: &Array2<f64>, rank: usize) -> Nmf {
    let (n, d) = matrix.dim();
    let r = rank.min(n).min(d);
    if r == 0 {
        return Nmf {
            w: Array2::zeros((n, r)),
            h: Array2::zeros((r, d)),
        };
    }

    let scale = (matrix.mean().unwrap_or(0.0).max(0.0) / r as f64).sqrt().max(EPSILON);
    let mut w = Array2::from_shape_fn((n, r), |(i, j)| scale * pattern(i, j, 1));
    let mut h = Array2::from_shape_fn((r, d), |(i, j)| scale * pattern(i, j, 2));

    for _ in 0..ITERATIONS {
        let numer_h = w.t().dot(matrix);
        let denom_h = w.t().dot(&w).dot(&h);
        h.zip_mut_with(&numer_h, |x, &num| *x *= num);
        h.zip_mut_with(&denom_h, |x, &den| *x /= den + EPSILON);

        let numer_w = matrix.dot(&h.t());
        let denom_w = w.dot(&h.dot(&h.t()));
        w.zip_mut_with(&numer_w, |x, &num| *x *= num);
        w.zip_mut_with(&denom_w, |x, &den| *x /= den + EPSILON);
    }

    Nmf { w, h }
}

fn pattern(i: usize, j: usize, salt: usize) -> f64 {
    let x = (i * 7919 + j * 104_729 + salt * 1_299_709) % 997;
    0.1 + x as f64 / 997.0
}

/// Top `top_words` terms of each of `topics` NMF topics over a
/// document-term matrix whose columns are named by `features`.
pub fn nmf_topics(
    matrix: &Array2<f64>,
    features: &[String],
    topics: usize,
    top_words: usize,
) -> (Vec<Topic>, Nmf) {
    let model = nmf(matrix, topics);
    let topics = model
        .h
        .rows()
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let mut ranked: Vec<(usize, f64)> = row
                .iter()
                .copied()
                .enumerate()
                .filter(|&(_, weight)| weight > EPSILON)
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            ranked.truncate(top_words);
            Topic {
                index,
                words: ranked
                    .iter()
                    .filter_map(|&(col, _)| features.get(col).cloned())
                    .collect(),
                weights: ranked.iter().map(|&(_, w)| w).collect(),
            }
        })
        .collect();
    (topics, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn features(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn factors_are_non_negative_and_reconstruct() {
        let v = array![
            [1.0, 1.0, 0.0, 0.0],
            [2.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 1.0],
            [0.0, 0.0, 3.0, 3.0],
        ];
        let model = nmf(&v, 2);
        assert!(model.w.iter().all(|&x| x >= 0.0));
        assert!(model.h.iter().all(|&x| x >= 0.0));
        let err: f64 = (&v - &model.w.dot(&model.h)).mapv(|x| x * x).sum();
        assert!(err < 0.1, "reconstruction error {err}");
    }

    #[test]
    fn topics_separate_disjoint_vocabularies() {
        let v = array![
            [1.0, 0.9, 0.0, 0.0],
            [0.8, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.7],
            [0.0, 0.0, 0.9, 1.0],
        ];
        let names = features(&["nursing", "health", "engineering", "stem"]);
        let (topics, model) = nmf_topics(&v, &names, 2, 2);
        assert_eq!(topics.len(), 2);

        let mut groups: Vec<Vec<String>> = topics
            .iter()
            .map(|t| {
                let mut w = t.words.clone();
                w.sort();
                w
            })
            .collect();
        groups.sort();
        assert_eq!(
            groups,
            vec![
                features(&["engineering", "stem"]),
                features(&["health", "nursing"]),
            ]
        );

        let dominant = model.dominant_topics();
        assert_eq!(dominant[0], dominant[1]);
        assert_eq!(dominant[2], dominant[3]);
        assert_ne!(dominant[0], dominant[2]);
    }

    #[test]
    fn rank_is_capped() {
        let v = array![[1.0, 0.0, 2.0]];
        let (topics, _) = nmf_topics(&v, &features(&["a", "b", "c"]), 10, 5);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].words[0], "c");
    }

    #[test]
    fn empty_matrix_has_no_topics() {
        let v = Array2::<f64>::zeros((0, 0));
        let (topics, _) = nmf_topics(&v, &[], 5, 5);
        assert!(topics.is_empty());
    }
}
