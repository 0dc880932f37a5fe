//! Form Validator
//!
//! Checks a draft before submission and produces the trimmed `GoalGroup`.
//! Scan order is fixed and the first violation wins: group name, start date,
//! then each goal's name followed by its weeks in order.

use thiserror::Error;

use super::editor::GoalEditor;
use super::model::{Goal, GoalGroup, parse_start_date};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a name for the goal group")]
    MissingGroupName,

    #[error("Please select a start date")]
    MissingStartDate,

    #[error("Start date \"{0}\" is not a valid YYYY-MM-DD date")]
    InvalidStartDate(String),

    /// `goal` is 1-based
    #[error("Please enter a name for goal {goal}")]
    MissingGoalName { goal: usize },

    /// `week` is 1-based
    #[error("Please fill in week {week} of goal \"{goal_name}\"")]
    MissingTask { goal_name: String, week: usize },
}

/// Validate the draft; on success return the trimmed goal group.
pub fn validate(editor: &GoalEditor) -> Result<GoalGroup, ValidationError> {
    let name = editor.group_name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingGroupName);
    }

    let start_text = editor.start_date.trim();
    if start_text.is_empty() {
        return Err(ValidationError::MissingStartDate);
    }
    let start_date = parse_start_date(start_text)
        .ok_or_else(|| ValidationError::InvalidStartDate(start_text.to_string()))?;

    let mut goals = Vec::with_capacity(editor.goal_count());
    for (index, draft) in editor.goals().iter().enumerate() {
        let goal_name = draft.name.trim();
        if goal_name.is_empty() {
            return Err(ValidationError::MissingGoalName { goal: index + 1 });
        }

        if let Some(week) = draft.tasks.iter().position(|t| t.trim().is_empty()) {
            return Err(ValidationError::MissingTask {
                goal_name: goal_name.to_string(),
                week: week + 1,
            });
        }

        goals.push(Goal {
            name: goal_name.to_string(),
            tasks: std::array::from_fn(|i| draft.tasks[i].trim().to_string()),
        });
    }

    Ok(GoalGroup {
        name: name.to_string(),
        start_date,
        goals,
    })
}
