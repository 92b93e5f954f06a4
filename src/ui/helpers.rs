use std::error::Error;

use ratatui::layout::Rect;

use crate::error::TaskFailure;

/// Rows taken by the "new word" dialog: input, spacer, hint, plus borders.
const DIALOG_HEIGHT: u16 = 5;
/// The dialog never gets narrower than this unless the terminal is.
const DIALOG_MIN_WIDTH: u16 = 30;

/// Place the "new word" dialog in the middle of `area`: 60% wide, exactly
/// tall enough for its three lines, clipped to small terminals.
pub(crate) fn word_dialog_area(area: Rect) -> Rect {
    let width = (area.width * 3 / 5).max(DIALOG_MIN_WIDTH).min(area.width);
    let height = DIALOG_HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Footer text for a background failure, naming the job and its root cause.
pub(crate) fn failure_status(failure: &TaskFailure) -> String {
    match failure {
        TaskFailure::Failed { task, error } => {
            let mut root: &dyn Error = error;
            while let Some(source) = root.source() {
                root = source;
            }
            format!("Could not {task}: {root}")
        }
        TaskFailure::Panicked { task, message } => {
            format!("Could not {task}: worker panicked ({message})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn failure_status_names_the_job_and_root_cause() {
        let failure = TaskFailure::Failed {
            task: "insert word",
            error: StoreError::InvalidRow {
                reason: "word must not be empty".to_string(),
            },
        };
        assert_eq!(
            failure_status(&failure),
            "Could not insert word: invalid word: word must not be empty"
        );
    }

    #[test]
    fn panics_are_reported_with_their_message() {
        let failure = TaskFailure::Panicked {
            task: "insert word",
            message: "boom".to_string(),
        };
        assert_eq!(
            failure_status(&failure),
            "Could not insert word: worker panicked (boom)"
        );
    }

    #[test]
    fn dialog_is_centered_and_fits_its_lines() {
        let dialog = word_dialog_area(Rect::new(0, 0, 100, 40));
        assert_eq!(dialog, Rect::new(20, 17, 60, DIALOG_HEIGHT));
    }

    #[test]
    fn dialog_is_clipped_to_tiny_terminals() {
        let area = Rect::new(2, 1, 20, 3);
        let dialog = word_dialog_area(area);
        assert_eq!(dialog, Rect::new(2, 1, 20, 3));
    }
}
