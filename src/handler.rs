use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Tick => {
            app.poll_tasks().await;
            app.tick_animation();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.toggle_screen();
            return;
        }
        KeyCode::PageDown => {
            let scroll = app.scroll_mut();
            scroll.down(scroll.half_page());
            return;
        }
        KeyCode::PageUp => {
            let scroll = app.scroll_mut();
            scroll.up(scroll.half_page());
            return;
        }
        _ => {}
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('j') | KeyCode::Down => app.scroll_mut().down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_mut().up(1),
        KeyCode::Char('g') => app.scroll_mut().to_top(),
        KeyCode::Char('G') => app.scroll_mut().to_bottom(),

        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let scroll = app.scroll_mut();
            scroll.down(scroll.half_page());
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let scroll = app.scroll_mut();
            scroll.up(scroll.half_page());
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            // Submit is disabled while this screen's request is loading
            if !app.controller().is_loading() {
                app.submit_input();
            }
        }
        KeyCode::Backspace => app.input_mut().backspace(),
        KeyCode::Delete => app.input_mut().delete(),
        KeyCode::Left => app.input_mut().left(),
        KeyCode::Right => app.input_mut().right(),
        KeyCode::Home => app.input_mut().home(),
        KeyCode::End => app.input_mut().end(),
        KeyCode::Up => app.scroll_mut().up(1),
        KeyCode::Down => app.scroll_mut().down(1),
        KeyCode::Char(c) => app.input_mut().insert(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_mut().down(3),
        MouseEventKind::ScrollUp => app.scroll_mut().up(3),
        _ => {}
    }
}
