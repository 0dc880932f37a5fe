//! Goal groups: the draft editor, its validator, and the submission payload.

pub mod draft_file;
pub mod editor;
pub mod model;
pub mod validate;

pub use draft_file::{DraftFileError, load_draft, parse_draft};
pub use editor::{EditorEvent, EditorOutcome, GoalDraft, GoalEditor};
pub use model::{CreateGoalsRequest, Goal, GoalGroup, GoalId, WEEKS};
pub use validate::{ValidationError, validate};
