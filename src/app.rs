use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::controller::{Outcome, RequestController};
use crate::error::SubmitError;
use crate::pipeline::{Pipeline, Variant};
use crate::service::DiagnosisClient;
use crate::wikipedia::WikipediaClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Analyze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input with a character-indexed cursor
#[derive(Debug, Default, Clone)]
pub struct InputLine {
    pub text: String,
    pub cursor: usize,
}

impl InputLine {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Scroll position of one result pane. `follow` pins it to the bottom.
#[derive(Debug, Clone, Copy)]
pub struct ScrollState {
    pub offset: u16,
    pub follow: bool,
    pub viewport: u16,
    pub content: u16,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
            viewport: 0,
            content: 0,
        }
    }
}

impl ScrollState {
    pub fn max_offset(&self) -> u16 {
        self.content.saturating_sub(self.viewport)
    }

    /// Record the latest layout and clamp the offset to it
    pub fn update(&mut self, viewport: u16, content: u16) {
        self.viewport = viewport;
        self.content = content;
        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn down(&mut self, lines: u16) {
        self.offset = (self.offset.saturating_add(lines)).min(self.max_offset());
        self.follow = self.offset >= self.max_offset();
    }

    pub fn up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
        self.follow = self.offset >= self.max_offset();
    }

    pub fn half_page(&self) -> u16 {
        (self.viewport / 2).max(1)
    }

    pub fn to_top(&mut self) {
        self.offset = 0;
        self.follow = self.max_offset() == 0;
    }

    pub fn to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.follow = true;
    }
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    pub chat_input: InputLine,
    pub analyze_input: InputLine,

    pub chat: RequestController,
    pub analyze: RequestController,
    pub chat_task: Option<JoinHandle<Outcome>>,
    pub analyze_task: Option<JoinHandle<Outcome>>,

    pub chat_scroll: ScrollState,
    pub analyze_scroll: ScrollState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub service_url: String,
}

impl App {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let service = Arc::new(DiagnosisClient::new(&config.service_url));
        let images = Arc::new(WikipediaClient::new(&config.image_api_url, config.thumbnail_size)?);
        let pipeline = Pipeline::new(service, images);
        Ok(Self::with_pipeline(pipeline, &config.service_url))
    }

    pub fn with_pipeline(pipeline: Pipeline, service_url: &str) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Editing,

            chat_input: InputLine::default(),
            analyze_input: InputLine::default(),

            chat: RequestController::new(pipeline.clone(), Variant::Chat),
            analyze: RequestController::new(pipeline, Variant::SingleShot),
            chat_task: None,
            analyze_task: None,

            chat_scroll: ScrollState::default(),
            analyze_scroll: ScrollState::default(),

            animation_frame: 0,

            service_url: service_url.to_string(),
        }
    }

    pub fn controller(&self) -> &RequestController {
        match self.screen {
            Screen::Chat => &self.chat,
            Screen::Analyze => &self.analyze,
        }
    }

    pub fn input(&self) -> &InputLine {
        match self.screen {
            Screen::Chat => &self.chat_input,
            Screen::Analyze => &self.analyze_input,
        }
    }

    pub fn input_mut(&mut self) -> &mut InputLine {
        match self.screen {
            Screen::Chat => &mut self.chat_input,
            Screen::Analyze => &mut self.analyze_input,
        }
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollState {
        match self.screen {
            Screen::Chat => &mut self.chat_scroll,
            Screen::Analyze => &mut self.analyze_scroll,
        }
    }

    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Chat => Screen::Analyze,
            Screen::Analyze => Screen::Chat,
        };
    }

    /// Submit the current screen's input. Ignored while a request is in flight.
    pub fn submit_input(&mut self) {
        match self.screen {
            Screen::Chat => {
                if self.chat_task.is_some() {
                    return;
                }
                let raw = self.chat_input.text.clone();
                if let Some(handle) = self.chat.spawn(&raw) {
                    self.chat_task = Some(handle);
                    self.chat_input.clear();
                    self.chat_scroll.follow = true;
                }
            }
            Screen::Analyze => {
                if self.analyze_task.is_some() {
                    return;
                }
                let raw = self.analyze_input.text.clone();
                if let Some(handle) = self.analyze.spawn(&raw) {
                    self.analyze_task = Some(handle);
                    self.analyze_scroll.to_top();
                }
            }
        }
    }

    /// Merge any finished background requests into their controllers
    pub async fn poll_tasks(&mut self) {
        if let Some(outcome) = take_finished(&mut self.chat_task).await {
            self.chat.finish(outcome);
            self.chat_scroll.follow = true;
        }
        if let Some(outcome) = take_finished(&mut self.analyze_task).await {
            self.analyze.finish(outcome);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.chat.is_loading() || self.analyze.is_loading()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

async fn take_finished(slot: &mut Option<JoinHandle<Outcome>>) -> Option<Outcome> {
    if !slot.as_ref().is_some_and(|h| h.is_finished()) {
        return None;
    }
    let handle = slot.take()?;
    Some(match handle.await {
        Ok(outcome) => outcome,
        Err(e) => Err(SubmitError::Task(e.to_string())),
    })
}
