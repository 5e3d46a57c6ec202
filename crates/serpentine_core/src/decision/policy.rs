//! Pluggable decision policies.

use super::features::{FeatureVector, FEATURE_LEN};
use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use serpentine_data::Action;
use std::fmt;
use std::sync::Arc;

/// Frozen, stateless mapping from features to an action.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, features: &FeatureVector) -> Result<Action, PolicyError>;
}

/// Which decision procedure a session runs.
#[derive(Clone, Default)]
pub enum Policy {
    Learned(Arc<dyn Classifier>),
    /// No classifier loaded; the rule ladder decides every move.
    #[default]
    RuleBased,
}

impl Policy {
    #[must_use]
    pub fn learned<C: Classifier + 'static>(classifier: C) -> Self {
        Self::Learned(Arc::new(classifier))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Policy::Learned(c) => c.name(),
            Policy::RuleBased => "rules",
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Learned(c) => f.debug_tuple("Learned").field(&c.name()).finish(),
            Policy::RuleBased => f.write_str("RuleBased"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// `features[feature] <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf { action: Action },
}

/// Binary decision tree stored as a flat node array rooted at index 0.
///
/// ```json
/// { "nodes": [
///     { "type": "split", "feature": 2, "threshold": 0.0, "left": 1, "right": 2 },
///     { "type": "leaf", "action": "LEFT" },
///     { "type": "leaf", "action": "RIGHT" } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    #[serde(default = "default_tree_name")]
    pub name: String,
    pub nodes: Vec<TreeNode>,
}

fn default_tree_name() -> String {
    "decision-tree".to_string()
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self, PolicyError> {
        let tree = Self {
            name: default_tree_name(),
            nodes,
        };
        tree.validate()?;
        Ok(tree)
    }

    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let tree: Self =
            serde_json::from_str(json).map_err(|e| PolicyError::Decode(e.to_string()))?;
        tree.validate()?;
        Ok(tree)
    }

    /// Structural checks; cycles are caught at prediction time.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.nodes.is_empty() {
            return Err(PolicyError::Malformed("tree has no nodes".into()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = *node
            {
                if feature >= FEATURE_LEN {
                    return Err(PolicyError::Malformed(format!(
                        "node {i} splits on feature {feature}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(PolicyError::Malformed(format!(
                        "node {i} has a non-finite threshold"
                    )));
                }
                if left >= self.nodes.len() || right >= self.nodes.len() {
                    return Err(PolicyError::Malformed(format!(
                        "node {i} points outside the tree"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<Action, PolicyError> {
        let mut at = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(at) {
                Some(TreeNode::Leaf { action }) => return Ok(*action),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features
                        .get(*feature)
                        .ok_or_else(|| PolicyError::Malformed(format!("feature {feature}")))?;
                    if !value.is_finite() {
                        return Err(PolicyError::NonFiniteFeature { index: *feature });
                    }
                    at = if value <= *threshold { *left } else { *right };
                }
                None => return Err(PolicyError::Malformed(format!("missing node {at}"))),
            }
        }
        Err(PolicyError::Malformed("cycle in tree".into()))
    }
}
