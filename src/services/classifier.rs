use thiserror::Error;

/// Errors raised while loading or invoking a classifier
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported booster type: {0}")]
    UnsupportedBooster(String),

    #[error("unsupported objective: {0}")]
    UnsupportedObjective(String),

    #[error("unsupported number of classes: {0}")]
    UnsupportedClasses(i64),

    #[error("tree {0} has no nodes")]
    EmptyTree(usize),

    #[error("invalid node index in tree {tree}: node {node} references child {child} but tree has {num_nodes} nodes")]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },

    #[error("malformed tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },

    #[error("shape mismatch: model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced a non-finite margin")]
    NonFiniteOutput,
}

/// A binary classifier over dense numeric rows
///
/// Implementations hold no mutable state; one instance is shared by every
/// request for the lifetime of the process.
pub trait Classifier: Send + Sync {
    /// Number of columns every row must have
    fn num_features(&self) -> usize;

    /// Probability of the positive class
    fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError>;

    /// Probability above which the positive label is predicted
    fn threshold(&self) -> f64 {
        0.5
    }

    /// Predicted label, 0 or 1
    fn predict(&self, row: &[f64]) -> Result<u8, ModelError> {
        let probability = self.predict_proba(row)?;
        Ok(u8::from(probability > self.threshold()))
    }
}

#[inline]
pub fn sigmoid(margin: f64) -> f64 {
    if margin >= 0.0 {
        1.0 / (1.0 + (-margin).exp())
    } else {
        let e = margin.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Split {
        feature: u32,
        threshold: f32,
        default_left: bool,
        left: u32,
        right: u32,
    },
    Leaf(f32),
}

/// A single regression tree, nodes stored in breadth-first order
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Build a tree, checking that every child index points forward
    ///
    /// Forward-only children guarantee traversal terminates.
    pub fn new(tree_idx: usize, nodes: Vec<Node>) -> Result<Self, ModelError> {
        if nodes.is_empty() {
            return Err(ModelError::EmptyTree(tree_idx));
        }

        let num_nodes = nodes.len();
        for (node_idx, node) in nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                for child in [left, right] {
                    if child as usize >= num_nodes {
                        return Err(ModelError::InvalidNodeIndex {
                            tree: tree_idx,
                            node: node_idx,
                            child: child as i32,
                            num_nodes,
                        });
                    }
                    if child as usize <= node_idx {
                        return Err(ModelError::MalformedTree {
                            tree: tree_idx,
                            reason: format!("node {} points back to node {}", node_idx, child),
                        });
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Largest feature index used by any split, if the tree splits at all
    pub fn max_feature(&self) -> Option<u32> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf(_) => None,
            })
            .max()
    }

    /// Leaf value reached by `row`
    ///
    /// Goes left when `value < threshold`; NaN follows the default direction.
    /// The row must be at least `max_feature() + 1` long.
    #[inline]
    pub fn leaf_value(&self, row: &[f64]) -> f32 {
        let mut idx = 0usize;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                } => {
                    let value = row[feature as usize];
                    let go_left = if value.is_nan() {
                        default_left
                    } else {
                        (value as f32) < threshold
                    };
                    idx = (if go_left { left } else { right }) as usize;
                }
            }
        }
    }
}

/// Additive ensemble of regression trees with a logistic link
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
    base_margin: f64,
    num_features: usize,
    feature_names: Option<Vec<String>>,
}

impl TreeEnsemble {
    pub fn new(
        trees: Vec<RegressionTree>,
        base_margin: f64,
        num_features: usize,
    ) -> Result<Self, ModelError> {
        let used = trees
            .iter()
            .filter_map(RegressionTree::max_feature)
            .max()
            .map(|f| f as usize + 1)
            .unwrap_or(0);

        if used > num_features {
            return Err(ModelError::MalformedTree {
                tree: 0,
                reason: format!(
                    "splits use feature index {} but model declares {} features",
                    used - 1,
                    num_features
                ),
            });
        }

        Ok(Self {
            trees,
            base_margin,
            num_features,
            feature_names: None,
        })
    }

    pub fn with_feature_names(mut self, names: Option<Vec<String>>) -> Self {
        self.feature_names = names;
        self
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    /// Raw additive score before the sigmoid
    pub fn margin(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.num_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.num_features,
                actual: row.len(),
            });
        }

        let margin = self
            .trees
            .iter()
            .fold(self.base_margin, |acc, tree| acc + tree.leaf_value(row) as f64);

        if !margin.is_finite() {
            return Err(ModelError::NonFiniteOutput);
        }
        Ok(margin)
    }
}

impl Classifier for TreeEnsemble {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError> {
        let margin = self.margin(row)?;
        Ok(sigmoid(margin).clamp(0.0, 1.0))
    }
}
