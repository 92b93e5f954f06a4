use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Field label shown in front of the input; also used to place the cursor.
pub(crate) const WORD_FIELD: &str = "Word";

/// State of the "new word" dialog.
#[derive(Default, Clone)]
pub(crate) struct WordForm {
    pub(crate) text: String,
}

impl WordForm {
    /// Append a character, ignoring control characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            false
        } else {
            self.text.push(ch);
            true
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.text.pop();
    }

    /// The text to save, or `None` when nothing was typed. The text is
    /// otherwise passed through verbatim.
    pub(crate) fn submission(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    /// Render the single input line for the form widget.
    pub(crate) fn build_line(&self) -> Line<'static> {
        let (display, style) = if self.text.is_empty() {
            ("<required>".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (self.text.clone(), Style::default().fg(Color::Yellow))
        };

        Line::from(vec![
            Span::raw(format!("{WORD_FIELD}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_has_no_submission() {
        let mut form = WordForm::default();
        assert_eq!(form.submission(), None);

        form.push_char('x');
        form.backspace();
        assert_eq!(form.submission(), None);
    }

    #[test]
    fn control_characters_are_ignored() {
        let mut form = WordForm::default();
        assert!(form.push_char('a'));
        assert!(!form.push_char('\n'));
        assert_eq!(form.submission(), Some("a"));
        assert_eq!(form.value_len(), 1);
    }
}
