//! Gradient-boosted decision trees for binary classification
//!
//! Logistic loss, Newton-step leaf values and best-first (leaf-wise) tree
//! growth bounded by a leaf budget. There is no row or feature subsampling,
//! so a fit is a pure function of its inputs and config.

use thiserror::Error;

/// Default number of boosting rounds
pub const DEFAULT_N_TREES: usize = 100;

/// Default leaf budget per tree
pub const DEFAULT_MAX_LEAVES: usize = 20;

/// Default minimum number of training rows per leaf
pub const DEFAULT_MIN_SAMPLES_LEAF: usize = 10;

/// Default shrinkage applied to every leaf value
pub const DEFAULT_LEARNING_RATE: f64 = 0.2;

/// Floor for the hessian sum in leaf values
const MIN_HESSIAN: f64 = 1e-6;

/// Splits gaining less than this are ignored
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Reasons a classifier cannot be fit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("training set is empty")]
    EmptyInput,

    #[error("{rows} feature rows but {labels} labels")]
    DimensionMismatch { rows: usize, labels: usize },

    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("training labels contain a single class")]
    SingleClass,

    #[error("non-finite value in row {row}, feature {feature}")]
    NonFiniteFeature { row: usize, feature: usize },
}

/// Boosting hyperparameters; fixed constants, never tuned at runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientBoostingConfig {
    pub n_trees: usize,
    pub max_leaves: usize,
    pub min_samples_leaf: usize,
    pub learning_rate: f64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_leaves: DEFAULT_MAX_LEAVES,
            min_samples_leaf: DEFAULT_MIN_SAMPLES_LEAF,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Regression tree fit to logistic-loss gradients
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

#[derive(Debug)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

#[derive(Debug)]
struct OpenLeaf {
    node: usize,
    split: Option<SplitCandidate>,
}

/// Per-fit view over rows, gradients and hessians
struct TreeBuilder<'a, R> {
    rows: &'a [R],
    gradients: &'a [f64],
    hessians: &'a [f64],
    n_features: usize,
    config: &'a GradientBoostingConfig,
}

impl<'a, R: AsRef<[f64]>> TreeBuilder<'a, R> {
    fn value(&self, row: usize, feature: usize) -> f64 {
        self.rows[row].as_ref()[feature]
    }

    fn leaf_value(&self, indices: &[usize]) -> f64 {
        let g: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        let h: f64 = indices.iter().map(|&i| self.hessians[i]).sum();
        self.config.learning_rate * g / h.max(MIN_HESSIAN)
    }

    /// Best variance-reduction split of `indices` honoring the leaf minimum
    fn best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let min_leaf = self.config.min_samples_leaf.max(1);
        let n = indices.len();
        if n < 2 * min_leaf {
            return None;
        }

        let total: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        let parent_score = total * total / n as f64;

        // (feature, threshold, gain, rows on the left)
        let mut best: Option<(usize, f64, f64, usize)> = None;
        let mut sorted = indices.to_vec();
        for feature in 0..self.n_features {
            self.sort_by_feature(&mut sorted, indices, feature);

            let mut left_sum = 0.0;
            for k in 1..n {
                left_sum += self.gradients[sorted[k - 1]];
                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let lo = self.value(sorted[k - 1], feature);
                let hi = self.value(sorted[k], feature);
                if lo >= hi {
                    continue;
                }
                let right_sum = total - left_sum;
                let gain = left_sum * left_sum / k as f64
                    + right_sum * right_sum / (n - k) as f64
                    - parent_score;
                if gain > MIN_SPLIT_GAIN && best.map_or(true, |b| gain > b.2) {
                    best = Some((feature, (lo + hi) / 2.0, gain, k));
                }
            }
        }

        let (feature, threshold, gain, k) = best?;
        self.sort_by_feature(&mut sorted, indices, feature);
        let right = sorted.split_off(k);
        Some(SplitCandidate {
            feature,
            threshold,
            gain,
            left: sorted,
            right,
        })
    }

    /// Reset `sorted` to `indices` and stable-sort it by one feature
    fn sort_by_feature(&self, sorted: &mut [usize], indices: &[usize], feature: usize) {
        sorted.copy_from_slice(indices);
        sorted.sort_by(|&a, &b| self.value(a, feature).total_cmp(&self.value(b, feature)));
    }

    /// Grow one tree leaf-wise, always splitting the leaf with the largest gain
    fn grow(&self, n_rows: usize) -> RegressionTree {
        let all: Vec<usize> = (0..n_rows).collect();
        let mut nodes = vec![Node::Leaf {
            value: self.leaf_value(&all),
        }];
        let mut open = vec![OpenLeaf {
            node: 0,
            split: self.best_split(&all),
        }];
        let mut leaves = 1;

        while leaves < self.config.max_leaves {
            let best = open
                .iter()
                .enumerate()
                .filter_map(|(pos, leaf)| leaf.split.as_ref().map(|s| (pos, s.gain)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(pos, _)| pos);
            let Some(pos) = best else { break };

            let leaf = open.swap_remove(pos);
            let Some(split) = leaf.split else { continue };

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf {
                value: self.leaf_value(&split.left),
            });
            nodes.push(Node::Leaf {
                value: self.leaf_value(&split.right),
            });
            nodes[leaf.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            open.push(OpenLeaf {
                node: left,
                split: self.best_split(&split.left),
            });
            open.push(OpenLeaf {
                node: right,
                split: self.best_split(&split.right),
            });
            leaves += 1;
        }

        RegressionTree { nodes }
    }
}

/// Boosted ensemble producing log-odds scores
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostingClassifier {
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoostingClassifier {
    pub fn fit<R: AsRef<[f64]>>(
        rows: &[R],
        labels: &[bool],
        config: &GradientBoostingConfig,
    ) -> Result<Self, FitError> {
        if rows.is_empty() {
            return Err(FitError::EmptyInput);
        }
        if rows.len() != labels.len() {
            return Err(FitError::DimensionMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }

        let n_features = rows[0].as_ref().len();
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != n_features {
                return Err(FitError::RaggedRow {
                    row,
                    found: values.len(),
                    expected: n_features,
                });
            }
            if let Some(feature) = values.iter().position(|v| !v.is_finite()) {
                return Err(FitError::NonFiniteFeature { row, feature });
            }
        }

        let positives = labels.iter().filter(|&&l| l).count();
        if positives == 0 || positives == labels.len() {
            return Err(FitError::SingleClass);
        }

        let prior = positives as f64 / labels.len() as f64;
        let base_score = (prior / (1.0 - prior)).ln();

        let targets: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let mut raw = vec![base_score; rows.len()];
        let mut gradients = vec![0.0; rows.len()];
        let mut hessians = vec![0.0; rows.len()];
        let mut trees = Vec::with_capacity(config.n_trees);

        for _ in 0..config.n_trees {
            for i in 0..rows.len() {
                let p = sigmoid(raw[i]);
                gradients[i] = targets[i] - p;
                hessians[i] = p * (1.0 - p);
            }

            let tree = TreeBuilder {
                rows,
                gradients: &gradients,
                hessians: &hessians,
                n_features,
                config,
            }
            .grow(rows.len());

            for (score, row) in raw.iter_mut().zip(rows) {
                *score += tree.predict(row.as_ref());
            }
            trees.push(tree);
        }

        Ok(Self {
            base_score,
            trees,
            n_features,
        })
    }

    /// Raw log-odds score for one feature row
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.n_features);
        self.base_score + self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision_function(x))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
