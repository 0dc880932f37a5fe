//! Goal Group Editor
//!
//! Owned draft state for the authoring screen. The form never touches the
//! goal list directly: it dispatches `EditorEvent`s keyed by `GoalId`, and the
//! returned `EditorOutcome` tells the renderer whether the card list changed
//! shape or only a field value moved.

use chrono::NaiveDate;

use super::model::{GoalId, WEEKS, next_monday};

/// A goal as it exists while being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    pub id: GoalId,
    pub name: String,
    pub tasks: [String; WEEKS],
}

impl GoalDraft {
    pub fn empty() -> Self {
        Self {
            id: GoalId::new(),
            name: String::new(),
            tasks: std::array::from_fn(|_| String::new()),
        }
    }
}

/// Edits the form can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    SetGroupName(String),
    SetStartDate(String),
    AddGoal,
    RemoveGoal(GoalId),
    SetGoalName(GoalId, String),
    /// Week index is zero-based
    SetTask(GoalId, usize, String),
}

/// What the renderer has to do after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Goal cards were added or removed
    Rerender,
    /// A single field changed in place
    FieldSynced,
    /// The edit was not applicable
    Ignored,
}

/// In-memory goal group draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalEditor {
    pub group_name: String,
    /// Raw `YYYY-MM-DD` text, validated only on submit
    pub start_date: String,
    goals: Vec<GoalDraft>,
}

impl GoalEditor {
    /// Fresh draft: one empty goal, start date on the next Monday after `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            group_name: String::new(),
            start_date: next_monday(today).format("%Y-%m-%d").to_string(),
            goals: vec![GoalDraft::empty()],
        }
    }

    /// Build a draft from already-collected parts. An empty goal list gets one
    /// empty goal so the draft invariant holds.
    pub fn from_parts(group_name: String, start_date: String, mut goals: Vec<GoalDraft>) -> Self {
        if goals.is_empty() {
            goals.push(GoalDraft::empty());
        }
        Self {
            group_name,
            start_date,
            goals,
        }
    }

    pub fn goals(&self) -> &[GoalDraft] {
        &self.goals
    }

    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    /// Position of a goal; its display number is this plus one.
    pub fn position(&self, id: GoalId) -> Option<usize> {
        self.goals.iter().position(|g| g.id == id)
    }

    pub fn goal(&self, id: GoalId) -> Option<&GoalDraft> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn can_remove(&self) -> bool {
        self.goals.len() > 1
    }

    /// Append a goal with empty task slots and return its id.
    pub fn add_goal(&mut self) -> GoalId {
        let goal = GoalDraft::empty();
        let id = goal.id;
        self.goals.push(goal);
        tracing::debug!("Added goal #{}", self.goals.len());
        id
    }

    /// Remove a goal. Returns false when it is the last one or unknown.
    pub fn remove_goal(&mut self, id: GoalId) -> bool {
        if !self.can_remove() {
            return false;
        }
        match self.position(id) {
            Some(index) => {
                self.goals.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, event: EditorEvent) -> EditorOutcome {
        match event {
            EditorEvent::SetGroupName(text) => {
                self.group_name = text;
                EditorOutcome::FieldSynced
            }
            EditorEvent::SetStartDate(text) => {
                self.start_date = text;
                EditorOutcome::FieldSynced
            }
            EditorEvent::AddGoal => {
                self.add_goal();
                EditorOutcome::Rerender
            }
            EditorEvent::RemoveGoal(id) => {
                if self.remove_goal(id) {
                    EditorOutcome::Rerender
                } else {
                    EditorOutcome::Ignored
                }
            }
            EditorEvent::SetGoalName(id, text) => match self.goal_mut(id) {
                Some(goal) => {
                    goal.name = text;
                    EditorOutcome::FieldSynced
                }
                None => EditorOutcome::Ignored,
            },
            EditorEvent::SetTask(id, week, text) => match self.goal_mut(id) {
                Some(goal) if week < WEEKS => {
                    goal.tasks[week] = text;
                    EditorOutcome::FieldSynced
                }
                _ => EditorOutcome::Ignored,
            },
        }
    }

    fn goal_mut(&mut self, id: GoalId) -> Option<&mut GoalDraft> {
        self.goals.iter_mut().find(|g| g.id == id)
    }
}
