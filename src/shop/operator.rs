//! Operators and their time accounting

use crate::types::{Minutes, OperatorId};
use serde::{Deserialize, Serialize};

/// Static description of an operator as provided by configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Operator identifier
    pub id: OperatorId,
    /// Learning coefficient LC, in (0, 1]
    #[serde(alias = "lc")]
    pub learning_coefficient: f64,
    /// Forgetting coefficient FC, in [0, ∞)
    #[serde(alias = "fc")]
    pub forgetting_coefficient: f64,
    /// Baseline performance P0, in (0, 1.15]
    #[serde(alias = "p0")]
    pub initial_performance: f64,
    /// Capabilities the operator is qualified for
    #[serde(default)]
    pub skills: Vec<String>,
}

impl OperatorSpec {
    /// Create an operator with no skills
    pub fn new(
        id: impl Into<OperatorId>,
        learning_coefficient: f64,
        forgetting_coefficient: f64,
        initial_performance: f64,
    ) -> Self {
        Self {
            id: id.into(),
            learning_coefficient,
            forgetting_coefficient,
            initial_performance,
            skills: Vec::new(),
        }
    }

    /// Add qualified capabilities
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills.extend(skills.into_iter().map(Into::into));
        self
    }
}

/// Operator state tracked during a run
#[derive(Debug, Clone, Serialize)]
pub struct Operator {
    /// Configured parameters
    pub spec: OperatorSpec,
    /// Cumulative idle time
    pub idle_minutes: Minutes,
    /// Cumulative work time
    pub work_minutes: Minutes,
    /// When the operator last became free, `None` while working
    pub idle_since: Option<Minutes>,
}

impl Operator {
    /// Wrap a spec; the operator is free from minute zero
    pub fn new(spec: OperatorSpec) -> Self {
        Self { spec, idle_minutes: 0.0, work_minutes: 0.0, idle_since: Some(0.0) }
    }

    /// Operator identifier
    pub fn id(&self) -> &OperatorId {
        &self.spec.id
    }

    /// Whether the operator holds the given capability
    pub fn has_skill(&self, capability: &str) -> bool {
        self.spec.skills.iter().any(|skill| skill == capability)
    }

    /// Close the current idle period at `at`
    pub fn begin_work(&mut self, at: Minutes) {
        if let Some(since) = self.idle_since.take() {
            self.idle_minutes += (at - since).max(0.0);
        }
    }

    /// Credit `worked` minutes and open a new idle period at `at`
    pub fn end_work(&mut self, at: Minutes, worked: Minutes) {
        self.work_minutes += worked.max(0.0);
        self.idle_since = Some(at);
    }

    /// Idle time including the open idle period up to `now`
    pub fn idle_minutes_at(&self, now: Minutes) -> Minutes {
        self.idle_minutes + self.idle_since.map_or(0.0, |since| (now - since).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_time_accounting() {
        let mut operator = Operator::new(OperatorSpec::new("OP1", 0.8, 0.1, 0.6));

        operator.begin_work(15.0);
        assert_eq!(operator.idle_minutes, 15.0);
        assert!(operator.idle_since.is_none());

        operator.end_work(75.0, 60.0);
        assert_eq!(operator.work_minutes, 60.0);
        assert_eq!(operator.idle_since, Some(75.0));
        assert_eq!(operator.idle_minutes_at(100.0), 40.0);
    }

    #[test]
    fn test_operator_skills() {
        let spec = OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["cut", "weld"]);
        let operator = Operator::new(spec);

        assert!(operator.has_skill("cut"));
        assert!(!operator.has_skill("paint"));
    }

    #[test]
    fn test_operator_spec_aliases() {
        let json = r#"{"id": "OP7", "lc": 0.9, "fc": 0.05, "p0": 0.7, "skills": ["T1"]}"#;
        let spec: OperatorSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.id.as_str(), "OP7");
        assert_eq!(spec.learning_coefficient, 0.9);
        assert_eq!(spec.skills, vec!["T1".to_string()]);
    }
}
