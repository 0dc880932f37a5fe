//! TOML draft files for `weekgoals submit --file`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::editor::{GoalDraft, GoalEditor};
use super::model::WEEKS;

#[derive(Debug, Error)]
pub enum DraftFileError {
    #[error("failed to read draft file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse draft file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("goal \"{goal}\" has {count} tasks; at most {} are allowed", WEEKS)]
    TooManyTasks { goal: String, count: usize },
}

#[derive(Debug, Deserialize)]
struct DraftFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    goals: Vec<DraftFileGoal>,
}

#[derive(Debug, Deserialize)]
struct DraftFileGoal {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tasks: Vec<String>,
}

/// Parse draft TOML into an editor. Missing task slots stay empty so the
/// validator reports them like any other blank field.
pub fn parse_draft(contents: &str) -> Result<GoalEditor, DraftFileError> {
    let file: DraftFile = toml::from_str(contents)?;

    let mut goals = Vec::with_capacity(file.goals.len());
    for goal in file.goals {
        if goal.tasks.len() > WEEKS {
            return Err(DraftFileError::TooManyTasks {
                goal: goal.name,
                count: goal.tasks.len(),
            });
        }
        let mut draft = GoalDraft::empty();
        draft.name = goal.name;
        for (slot, task) in draft.tasks.iter_mut().zip(goal.tasks) {
            *slot = task;
        }
        goals.push(draft);
    }

    Ok(GoalEditor::from_parts(file.name, file.start_date, goals))
}

pub fn load_draft(path: &Path) -> Result<GoalEditor, DraftFileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DraftFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_draft(&contents)
}
