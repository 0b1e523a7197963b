//! Regression tree ensembles
//!
//! Trees are stored as flat node arrays rooted at index 0. A split sends a
//! row left when `row[feature] <= threshold`. Children always sit at higher
//! indices than their parent, which guarantees every walk terminates.

use serde::Deserialize;

use super::{check_width, Regressor};
use crate::error::ModelError;

/// A single tree node
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, index: usize, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidArtifact(format!("tree {} is empty", index)));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= n_features {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree {} node {} splits on feature {} of {}",
                        index, i, feature, n_features
                    )));
                }
                for child in [left, right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "tree {} node {} has invalid child {}",
                            index, i, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    // Only called on validated trees
    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// How per-tree outputs combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Averaged, as in a random forest
    #[default]
    Mean,
    /// Summed, as in gradient boosting
    Sum,
}

/// An ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTreeEnsemble")]
pub struct TreeEnsemble {
    n_features: usize,
    aggregation: Aggregation,
    base_score: f64,
    trees: Vec<Tree>,
}

#[derive(Deserialize)]
struct RawTreeEnsemble {
    n_features: usize,
    #[serde(default)]
    aggregation: Aggregation,
    #[serde(default)]
    base_score: f64,
    trees: Vec<Tree>,
}

impl TryFrom<RawTreeEnsemble> for TreeEnsemble {
    type Error = ModelError;

    fn try_from(raw: RawTreeEnsemble) -> Result<Self, Self::Error> {
        Self::new(raw.n_features, raw.aggregation, raw.base_score, raw.trees)
    }
}

impl TreeEnsemble {
    pub fn new(
        n_features: usize,
        aggregation: Aggregation,
        base_score: f64,
        trees: Vec<Tree>,
    ) -> Result<Self, ModelError> {
        if trees.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "tree ensemble has no trees".to_string(),
            ));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(i, n_features)?;
        }
        Ok(Self {
            n_features,
            aggregation,
            base_score,
            trees,
        })
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.evaluate(row)).sum();
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        self.base_score + combined
    }
}

impl Regressor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        rows.iter()
            .map(|row| {
                check_width(self.n_features, row)?;
                Ok(self.evaluate(row))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: low },
                Node::Leaf { value: high },
            ],
        }
    }

    #[test]
    fn test_mean_aggregation() {
        let model = TreeEnsemble::new(
            2,
            Aggregation::Mean,
            0.0,
            vec![stump(0, 0.5, 0.0, 1.0), stump(1, 0.5, 0.2, 0.4)],
        )
        .unwrap();

        let out = model.predict(&[vec![0.9, 0.1], vec![0.5, 0.6]]).unwrap();
        assert!((out[0] - 0.6).abs() < 1e-12);
        // Threshold is inclusive on the left branch
        assert!((out[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_sum_aggregation_with_base_score() {
        let model = TreeEnsemble::new(
            1,
            Aggregation::Sum,
            0.5,
            vec![stump(0, 0.0, -0.1, 0.1), stump(0, 1.0, 0.2, 0.3)],
        )
        .unwrap();
        assert!((model.predict(&[vec![0.5]]).unwrap()[0] - 0.8).abs() < 1e-12);
        assert_eq!(model.trees.len(), 2);
    }

    #[test]
    fn test_deeper_tree() {
        let tree = Tree {
            nodes: vec![
                Node::Split { feature: 0, threshold: 0.5, left: 1, right: 4 },
                Node::Split { feature: 1, threshold: 0.5, left: 2, right: 3 },
                Node::Leaf { value: 1.0 },
                Node::Leaf { value: 2.0 },
                Node::Leaf { value: 3.0 },
            ],
        };
        let model = TreeEnsemble::new(2, Aggregation::Mean, 0.0, vec![tree]).unwrap();
        let out = model
            .predict(&[vec![0.1, 0.1], vec![0.1, 0.9], vec![0.9, 0.0]])
            .unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rejects_backward_child() {
        let tree = Tree {
            nodes: vec![
                Node::Split { feature: 0, threshold: 0.5, left: 1, right: 0 },
                Node::Leaf { value: 1.0 },
            ],
        };
        let err = TreeEnsemble::new(1, Aggregation::Mean, 0.0, vec![tree]).unwrap_err();
        assert!(err.to_string().contains("invalid child 0"));
    }

    #[test]
    fn test_rejects_out_of_range_feature() {
        let err = TreeEnsemble::new(1, Aggregation::Mean, 0.0, vec![stump(3, 0.5, 0.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));
    }

    #[test]
    fn test_rejects_empty_ensemble() {
        assert!(TreeEnsemble::new(1, Aggregation::Mean, 0.0, Vec::new()).is_err());
        assert!(TreeEnsemble::new(1, Aggregation::Mean, 0.0, vec![Tree { nodes: Vec::new() }]).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let model = TreeEnsemble::new(2, Aggregation::Mean, 0.0, vec![stump(0, 0.5, 0.0, 1.0)]).unwrap();
        assert!(matches!(
            model.predict(&[vec![0.1, 0.2, 0.3]]),
            Err(ModelError::ShapeMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_node_json_forms() {
        let split: Node =
            serde_json::from_str(r#"{"feature": 1, "threshold": 2.5, "left": 1, "right": 2}"#).unwrap();
        assert!(matches!(split, Node::Split { feature: 1, .. }));

        let leaf: Node = serde_json::from_str(r#"{"value": 4.0}"#).unwrap();
        assert_eq!(leaf, Node::Leaf { value: 4.0 });
    }
}
