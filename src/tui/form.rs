//! Create-screen form: field order, focus, and text edits.
//!
//! Every keystroke becomes an `EditorEvent` on the draft.

use crate::goals::{EditorEvent, EditorOutcome, GoalEditor, GoalId, WEEKS};

/// One editable field of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    GroupName,
    StartDate,
    GoalName(GoalId),
    /// Zero-based week
    Task(GoalId, usize),
}

impl FieldId {
    pub fn goal(&self) -> Option<GoalId> {
        match self {
            Self::GoalName(id) | Self::Task(id, _) => Some(*id),
            _ => None,
        }
    }
}

/// Fields in tab order
pub fn fields(editor: &GoalEditor) -> Vec<FieldId> {
    let mut out = Vec::with_capacity(2 + editor.goal_count() * (WEEKS + 1));
    out.push(FieldId::GroupName);
    out.push(FieldId::StartDate);
    for goal in editor.goals() {
        out.push(FieldId::GoalName(goal.id));
        out.extend((0..WEEKS).map(|week| FieldId::Task(goal.id, week)));
    }
    out
}

/// Current text of a field; empty if it no longer exists.
pub fn field_text(editor: &GoalEditor, field: FieldId) -> &str {
    match field {
        FieldId::GroupName => &editor.group_name,
        FieldId::StartDate => &editor.start_date,
        FieldId::GoalName(id) => editor.goal(id).map_or("", |g| g.name.as_str()),
        FieldId::Task(id, week) => editor
            .goal(id)
            .and_then(|g| g.tasks.get(week))
            .map_or("", String::as_str),
    }
}

fn set_event(field: FieldId, text: String) -> EditorEvent {
    match field {
        FieldId::GroupName => EditorEvent::SetGroupName(text),
        FieldId::StartDate => EditorEvent::SetStartDate(text),
        FieldId::GoalName(id) => EditorEvent::SetGoalName(id, text),
        FieldId::Task(id, week) => EditorEvent::SetTask(id, week, text),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    focus: FieldId,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self {
            focus: FieldId::GroupName,
        }
    }

    pub fn focus(&self) -> FieldId {
        self.focus
    }

    pub fn focus_on(&mut self, field: FieldId) {
        self.focus = field;
    }

    /// Goal owning the focused field, if any
    pub fn focused_goal(&self) -> Option<GoalId> {
        self.focus.goal()
    }

    fn index(&self, fields: &[FieldId]) -> usize {
        fields.iter().position(|f| *f == self.focus).unwrap_or(0)
    }

    /// Move to the next field, wrapping around.
    pub fn next(&mut self, editor: &GoalEditor) {
        let fields = fields(editor);
        let i = self.index(&fields);
        self.focus = fields[(i + 1) % fields.len()];
    }

    /// Move to the previous field, wrapping around.
    pub fn prev(&mut self, editor: &GoalEditor) {
        let fields = fields(editor);
        let i = self.index(&fields);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
    }

    /// Re-point focus after the goal list changed shape. A removed goal's
    /// fields hand focus to the goal now at its position.
    pub fn sync(&mut self, editor: &GoalEditor, removed_at: Option<usize>) {
        let Some(id) = self.focus.goal() else {
            return;
        };
        if editor.goal(id).is_some() {
            return;
        }
        let goals = editor.goals();
        let at = removed_at.unwrap_or(0).min(goals.len().saturating_sub(1));
        self.focus = goals
            .get(at)
            .map_or(FieldId::GroupName, |g| FieldId::GoalName(g.id));
    }

    /// Append text to the focused field.
    pub fn insert_str(&self, editor: &mut GoalEditor, text: &str) -> EditorOutcome {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        if clean.is_empty() {
            return EditorOutcome::Ignored;
        }
        let mut value = field_text(editor, self.focus).to_string();
        value.push_str(&clean);
        editor.apply(set_event(self.focus, value))
    }

    pub fn insert_char(&self, editor: &mut GoalEditor, c: char) -> EditorOutcome {
        let mut buf = [0u8; 4];
        self.insert_str(editor, c.encode_utf8(&mut buf))
    }

    /// Delete the last character of the focused field.
    pub fn backspace(&self, editor: &mut GoalEditor) -> EditorOutcome {
        let mut value = field_text(editor, self.focus).to_string();
        if value.pop().is_none() {
            return EditorOutcome::Ignored;
        }
        editor.apply(set_event(self.focus, value))
    }
}
