//! Task definitions and the evidence submitted against them

use serde::{Deserialize, Serialize};

/// How a task decides it has been satisfied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckPolicy {
    /// Learner clicked an object in the scene carrying this tag
    #[serde(rename_all = "camelCase")]
    Interaction { target_tag: String },
    /// Learner ran `command`, optionally with these arguments
    #[serde(rename_all = "camelCase")]
    Command {
        command: String,
        #[serde(default)]
        expected_args: Vec<String>,
    },
    /// Learner typed a literal answer
    #[serde(rename_all = "camelCase")]
    Flag { expected_value: String },
}

impl CheckPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            CheckPolicy::Interaction { .. } => "interaction",
            CheckPolicy::Command { .. } => "command",
            CheckPolicy::Flag { .. } => "flag",
        }
    }
}

/// An immutable objective inside a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub points: i64,
    pub check_policy: CheckPolicy,
    #[serde(default)]
    pub hint_cost: i64,
    #[serde(default)]
    pub hint: String,
}

/// What the learner submits to prove a task is done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TaskEvidence {
    RawCommand(String),
    InteractionTag(String),
    FlagString(String),
}

impl TaskEvidence {
    pub fn label(&self) -> &'static str {
        match self {
            TaskEvidence::RawCommand(_) => "command",
            TaskEvidence::InteractionTag(_) => "interaction",
            TaskEvidence::FlagString(_) => "flag",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_policy_kind() {
        let json = r#"[
            {"id":"t1","title":"Find the laptop","points":10,
             "checkPolicy":{"kind":"interaction","targetTag":"laptop"}},
            {"id":"t2","title":"Enter the evidence folder","points":20,"hintCost":5,"hint":"cd",
             "checkPolicy":{"kind":"command","command":"cd","expectedArgs":["/home/user/evidence"]}},
            {"id":"t3","title":"Submit the flag","points":30,
             "checkPolicy":{"kind":"flag","expectedValue":"FLAG{usb}"}}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        assert_eq!(tasks[0].check_policy, CheckPolicy::Interaction { target_tag: "laptop".into() });
        assert_eq!(tasks[1].hint_cost, 5);
        assert_eq!(
            tasks[1].check_policy,
            CheckPolicy::Command {
                command: "cd".into(),
                expected_args: vec!["/home/user/evidence".into()],
            }
        );
        assert_eq!(tasks[2].check_policy.label(), "flag");
        assert_eq!(tasks[2].hint_cost, 0);
    }
}
