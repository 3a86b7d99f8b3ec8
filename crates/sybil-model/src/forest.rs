//! Random-forest inference over the canonical feature vector. The artifact
//! is a JSON export of the trained forest: flat node arrays per tree, class
//! counts at the leaves. Loaded once per process, read-only afterwards.

use serde::Deserialize;
use std::path::Path;
use sybil_core::{
    AccountProfile, DetectionResult, DuplicationReport, FeatureVector, ScoringStrategy,
    SybilError, SybilResult, FEATURE_COUNT,
};
use tracing::info;

/// Marks a leaf in [`TreeNode::feature`].
const LEAF: i32 = -1;

#[derive(Debug, Deserialize)]
pub struct Forest {
    n_features: usize,
    trees: Vec<Tree>,
}

#[derive(Debug, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct TreeNode {
    /// Feature index to split on, or -1 for a leaf.
    feature: i32,
    #[serde(default)]
    threshold: f64,
    #[serde(default)]
    left: usize,
    #[serde(default)]
    right: usize,
    /// Training-sample class counts at this node: [benign, suspicious].
    value: [f64; 2],
}

impl Forest {
    pub fn load(path: &Path) -> SybilResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let forest: Forest = serde_json::from_str(&raw)?;
        forest.validate()?;
        info!(
            trees = forest.trees.len(),
            path = %path.display(),
            "classifier artifact loaded"
        );
        Ok(forest)
    }

    pub fn from_json(raw: &str) -> SybilResult<Self> {
        let forest: Forest = serde_json::from_str(raw)?;
        forest.validate()?;
        Ok(forest)
    }

    fn validate(&self) -> SybilResult<()> {
        if self.n_features != FEATURE_COUNT {
            return Err(SybilError::Model(format!(
                "artifact expects {} features, this build produces {}",
                self.n_features, FEATURE_COUNT
            )));
        }
        if self.trees.is_empty() {
            return Err(SybilError::Model("artifact contains no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(SybilError::Model(format!("tree {i} is empty")));
            }
            for node in &tree.nodes {
                if node.feature != LEAF {
                    let feature_ok = (node.feature as usize) < FEATURE_COUNT;
                    let children_ok =
                        node.left < tree.nodes.len() && node.right < tree.nodes.len();
                    if !feature_ok || !children_ok {
                        return Err(SybilError::Model(format!(
                            "tree {i} has an out-of-range split node"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// `[P(benign), P(suspicious)]`: each tree votes with its leaf's class
    /// distribution and the forest averages the votes.
    pub fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        let x = features.as_slice();
        let mut acc = [0.0; 2];
        for tree in &self.trees {
            let leaf = tree.descend(x);
            let total = leaf.value[0] + leaf.value[1];
            if total > 0.0 {
                acc[0] += leaf.value[0] / total;
                acc[1] += leaf.value[1] / total;
            }
        }
        let n = self.trees.len() as f64;
        [acc[0] / n, acc[1] / n]
    }
}

impl Tree {
    fn descend(&self, x: &[f64]) -> &TreeNode {
        let mut node = &self.nodes[0];
        while node.feature != LEAF {
            let next = if x[node.feature as usize] <= node.threshold {
                node.left
            } else {
                node.right
            };
            node = &self.nodes[next];
        }
        node
    }
}

/// The trained strategy: feeds the canonical vector through the forest and
/// reports the suspicion probability as its confidence.
pub struct ClassifierScorer {
    forest: Forest,
}

impl ClassifierScorer {
    pub fn load(path: &Path) -> SybilResult<Self> {
        Ok(Self {
            forest: Forest::load(path)?,
        })
    }

    pub fn new(forest: Forest) -> Self {
        Self { forest }
    }
}

impl ScoringStrategy for ClassifierScorer {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn evaluate(
        &self,
        _profile: &AccountProfile,
        features: &FeatureVector,
        _dupes: &DuplicationReport,
    ) -> Vec<DetectionResult> {
        let proba = self.forest.predict_proba(features);
        let confidence = proba[1].clamp(0.0, 1.0);
        vec![DetectionResult {
            rule_name: "Trained Classifier".to_string(),
            is_suspicious: confidence > 0.5,
            confidence_score: confidence,
            details: vec![format!(
                "Model probability of automation: {:.0}%.",
                confidence * 100.0
            )],
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use sybil_core::UNKNOWN_TIMESTAMP;

    /// Two stumps splitting on karma_ratio (slot 0): one decisive, one 50/50.
    const FOREST_JSON: &str = r#"{
        "n_features": 14,
        "trees": [
            {
                "nodes": [
                    {"feature": 0, "threshold": 0.5, "left": 1, "right": 2, "value": [10, 10]},
                    {"feature": -1, "value": [9, 1]},
                    {"feature": -1, "value": [1, 9]}
                ]
            },
            {
                "nodes": [
                    {"feature": 0, "threshold": 0.5, "left": 1, "right": 2, "value": [10, 10]},
                    {"feature": -1, "value": [5, 5]},
                    {"feature": -1, "value": [0, 10]}
                ]
            }
        ]
    }"#;

    fn vector_with_ratio(ratio: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = ratio;
        FeatureVector::new(values)
    }

    #[test]
    fn predict_proba_averages_tree_votes() {
        let forest = Forest::from_json(FOREST_JSON).unwrap();

        // Low ratio: tree 1 says 0.1, tree 2 says 0.5 -> mean 0.3.
        let proba = forest.predict_proba(&vector_with_ratio(0.2));
        assert!((proba[1] - 0.3).abs() < 1e-9);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-9);

        // High ratio: tree 1 says 0.9, tree 2 says 1.0 -> mean 0.95.
        let proba = forest.predict_proba(&vector_with_ratio(0.9));
        assert!((proba[1] - 0.95).abs() < 1e-9);
    }

    #[test]
    fn scorer_thresholds_at_half() {
        let forest = Forest::from_json(FOREST_JSON).unwrap();
        let scorer = ClassifierScorer::new(forest);
        let profile = AccountProfile {
            name: "tester".to_string(),
            created_at: 0.0,
            comment_karma: 0,
            link_karma: 0,
            verified_email: false,
            trophy_count: 0,
            profile_picture_url: String::new(),
            events: Vec::new(),
            oldest_activity_timestamp: UNKNOWN_TIMESTAMP,
            comments: Vec::new(),
            subreddits: HashSet::new(),
        };
        let dupes = DuplicationReport::default();

        let results = scorer.evaluate(&profile, &vector_with_ratio(0.9), &dupes);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_suspicious);

        let results = scorer.evaluate(&profile, &vector_with_ratio(0.2), &dupes);
        assert!(!results[0].is_suspicious);
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let raw = r#"{"n_features": 3, "trees": [{"nodes": [{"feature": -1, "value": [1, 1]}]}]}"#;
        assert!(matches!(Forest::from_json(raw), Err(SybilError::Model(_))));
    }

    #[test]
    fn rejects_out_of_range_children() {
        let raw = r#"{
            "n_features": 14,
            "trees": [{"nodes": [
                {"feature": 0, "threshold": 0.5, "left": 1, "right": 9, "value": [1, 1]},
                {"feature": -1, "value": [1, 0]}
            ]}]
        }"#;
        assert!(matches!(Forest::from_json(raw), Err(SybilError::Model(_))));
    }

    #[test]
    fn rejects_empty_forest() {
        let raw = r#"{"n_features": 14, "trees": []}"#;
        assert!(matches!(Forest::from_json(raw), Err(SybilError::Model(_))));
    }
}
