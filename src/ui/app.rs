use std::mem;

use anyhow::Result;
use crossbeam_channel::Receiver;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::error::TaskFailure;
use crate::live::Subscription;
use crate::models::Word;
use crate::repository::WordRepository;

use super::forms::{WordForm, WORD_FIELD};
use super::helpers::{failure_status, word_dialog_area};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

enum Mode {
    Normal,
    AddingWord(WordForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Word list screen. The list itself is never edited locally: it is replaced
/// wholesale by whatever snapshot the subscription delivers last.
pub struct App {
    repository: WordRepository,
    feed: Subscription,
    failures: Receiver<TaskFailure>,
    words: Vec<Word>,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(repository: WordRepository) -> Self {
        let feed = repository.subscribe_all_words();
        let failures = repository.errors();
        Self {
            repository,
            feed,
            failures,
            words: Vec::new(),
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Pull the newest snapshot and any background failures. Called once per
    /// frame by the terminal loop.
    pub fn sync(&mut self) {
        if let Some(words) = self.feed.try_latest() {
            self.replace_words(words);
        }
        while let Ok(failure) = self.failures.try_recv() {
            self.set_status(failure_status(&failure), StatusKind::Error);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingWord(form) => self.handle_add_word(code, form),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.words.len().saturating_sub(1),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Mode::AddingWord(WordForm::default());
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_word(&mut self, code: KeyCode, mut form: WordForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            KeyCode::Enter => {
                self.save_word(&form);
                return Mode::Normal;
            }
            _ => {}
        }
        Mode::AddingWord(form)
    }

    /// Queue the insert and return straight away; the list updates once the
    /// write lands and the subscription delivers the new snapshot.
    fn save_word(&mut self, form: &WordForm) {
        let Some(text) = form.submission() else {
            self.set_status("Word cannot be empty - not saved.", StatusKind::Error);
            return;
        };

        match self.repository.insert(text) {
            Ok(()) => self.set_status(format!("Saving \"{text}\"..."), StatusKind::Info),
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    fn replace_words(&mut self, words: Vec<Word>) {
        self.words = words;
        if self.selected >= self.words.len() {
            self.selected = self.words.len().saturating_sub(1);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.words.is_empty() {
            return;
        }
        let last = self.words.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_word_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::AddingWord(form) = &self.mode {
            self.draw_word_form(frame, area, form);
        }
    }

    fn draw_word_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Words").borders(Borders::ALL);

        if self.words.is_empty() {
            let message = Paragraph::new("No words yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .words
            .iter()
            .map(|word| ListItem::new(Line::from(word.as_str().to_string())))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = match self.mode {
            Mode::Normal => "+ add word | Up/Down move | q quit",
            Mode::AddingWord(_) => "Enter save | Esc cancel",
        };
        let instructions = Line::from(Span::styled(
            instructions,
            Style::default().fg(Color::Gray),
        ));

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_word_form(&self, frame: &mut Frame, area: Rect, form: &WordForm) {
        let popup_area = word_dialog_area(area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("New Word").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save | Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = format!("{WORD_FIELD}: ").len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
