//! XGBoost JSON model loader.
//!
//! Parses the subset of the XGBoost JSON format needed to score binary
//! gradient-boosted tree models. Fields the scorer does not use are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};

use crate::services::classifier::{ModelError, Node, RegressionTree, TreeEnsemble};

fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    // Seen in the wild: 0.5, "5E-1", "[5E-1]", [0.5]
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| SerdeError::custom("invalid number")),
        Value::String(s) => {
            let t = s.trim();
            let inner = t
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(t);
            inner
                .trim()
                .parse::<f32>()
                .map_err(|_| SerdeError::custom(format!("cannot parse base_score from string: {}", s)))
        }
        Value::Array(arr) => match arr.first() {
            Some(Value::Number(n)) => n
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| SerdeError::custom("invalid number")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f32>()
                .map_err(|_| SerdeError::custom(format!("cannot parse base_score from string: {}", s))),
            _ => Err(SerdeError::custom("base_score array must hold one number")),
        },
        _ => Err(SerdeError::custom("base_score must be number, string, or array")),
    }
}

fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|value| match value {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
            other => Err(SerdeError::custom(format!("invalid flag value: {}", other))),
        })
        .collect()
}

fn default_num_class() -> i64 {
    0
}

fn default_num_feature() -> i64 {
    0
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    pub split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    /// 0 = numerical, 1 = categorical
    #[serde(default)]
    pub split_type: Vec<i32>,
    #[serde(default)]
    pub categories_nodes: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub tree_info: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree { model: ModelTrees },
    Gblinear {},
    Dart {},
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f32,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_num_class")]
    pub num_class: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_num_feature")]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub gradient_booster: GradientBooster,
    pub learner_model_param: LearnerModelParam,
    pub objective: Objective,
}

/// Top-level XGBoost JSON document
#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    pub learner: Learner,
}

/// Convert base_score into margin space for the given objective.
///
/// Logistic objectives store base_score as a probability.
fn base_margin(base_score: f32, objective: &str) -> Result<f64, ModelError> {
    match objective {
        "binary:logistic" | "reg:logistic" => {
            let p = (base_score as f64).clamp(1e-7, 1.0 - 1e-7);
            Ok((p / (1.0 - p)).ln())
        }
        "binary:logitraw" => Ok(base_score as f64),
        other => Err(ModelError::UnsupportedObjective(other.to_string())),
    }
}

impl XgbModel {
    /// Parse an XGBoost JSON document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Convert to a native tree ensemble.
    ///
    /// Only single-output gbtree models are supported.
    pub fn into_ensemble(self) -> Result<TreeEnsemble, ModelError> {
        let learner = self.learner;

        let model_trees = match learner.gradient_booster {
            GradientBooster::Gbtree { model } => model,
            GradientBooster::Gblinear {} => {
                return Err(ModelError::UnsupportedBooster("gblinear".to_string()))
            }
            GradientBooster::Dart {} => return Err(ModelError::UnsupportedBooster("dart".to_string())),
        };

        let num_class = learner.learner_model_param.num_class;
        if num_class > 1 {
            return Err(ModelError::UnsupportedClasses(num_class));
        }

        let margin = base_margin(
            learner.learner_model_param.base_score,
            &learner.objective.name,
        )?;

        let trees = model_trees
            .trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| convert_tree(tree, idx))
            .collect::<Result<Vec<_>, _>>()?;

        let declared = learner.learner_model_param.num_feature.max(0) as usize;
        let num_features = match &learner.feature_names {
            Some(names) if declared == 0 => names.len(),
            _ => declared,
        };

        Ok(TreeEnsemble::new(trees, margin, num_features)?.with_feature_names(learner.feature_names))
    }
}

/// Convert a single XGBoost tree.
fn convert_tree(xgb_tree: &Tree, tree_idx: usize) -> Result<RegressionTree, ModelError> {
    let num_nodes = xgb_tree.tree_param.num_nodes.max(0) as usize;
    if num_nodes == 0 {
        return Err(ModelError::EmptyTree(tree_idx));
    }

    let lengths = [
        xgb_tree.left_children.len(),
        xgb_tree.right_children.len(),
        xgb_tree.split_indices.len(),
        xgb_tree.split_conditions.len(),
        xgb_tree.default_left.len(),
    ];
    if lengths.iter().any(|&len| len != num_nodes) {
        return Err(ModelError::MalformedTree {
            tree: tree_idx,
            reason: format!("node arrays {:?} do not match num_nodes {}", lengths, num_nodes),
        });
    }

    // Categorical splits test set membership, not `<`
    if let Some(node_idx) = xgb_tree.split_type.iter().position(|&t| t != 0) {
        return Err(ModelError::MalformedTree {
            tree: tree_idx,
            reason: format!("node {} uses a categorical split, which is not supported", node_idx),
        });
    }
    if !xgb_tree.categories_nodes.is_empty() {
        return Err(ModelError::MalformedTree {
            tree: tree_idx,
            reason: "categorical splits are not supported".to_string(),
        });
    }

    let mut nodes = Vec::with_capacity(num_nodes);
    for node_idx in 0..num_nodes {
        let left_child = xgb_tree.left_children[node_idx];
        let right_child = xgb_tree.right_children[node_idx];

        // A leaf stores its value in split_conditions
        if left_child == -1 {
            nodes.push(Node::Leaf(xgb_tree.split_conditions[node_idx]));
            continue;
        }

        for child in [left_child, right_child] {
            if child < 0 || child as usize >= num_nodes {
                return Err(ModelError::InvalidNodeIndex {
                    tree: tree_idx,
                    node: node_idx,
                    child,
                    num_nodes,
                });
            }
        }

        let feature = xgb_tree.split_indices[node_idx];
        if feature < 0 {
            return Err(ModelError::MalformedTree {
                tree: tree_idx,
                reason: format!("node {} splits on negative feature {}", node_idx, feature),
            });
        }

        nodes.push(Node::Split {
            feature: feature as u32,
            threshold: xgb_tree.split_conditions[node_idx],
            default_left: xgb_tree.default_left[node_idx],
            left: left_child as u32,
            right: right_child as u32,
        });
    }

    RegressionTree::new(tree_idx, nodes)
}
