use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use devflow_core::Task;
use crate::app::{App, FocusPane, InputMode, Screen, cursor_line_col};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_request().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('r') if app.screen == Screen::Workspace => {
                app.submit();
                return;
            }
            _ => {}
        }
    }

    match app.screen {
        Screen::Landing => handle_landing(app, key),
        Screen::Workspace => match app.input_mode {
            InputMode::Normal => handle_workspace_normal(app, key),
            InputMode::Editing => handle_editing(app, key),
        },
    }
}

fn handle_landing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') => app.launch(),
        _ => {}
    }
}

fn handle_workspace_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.screen = Screen::Landing,

        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),

        KeyCode::Char('r') => app.submit(),
        KeyCode::Char('x') => app.dismiss_banner(),

        // Direct task selection
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            if let Some(task) = Task::all().get(idx) {
                app.select_task(*task);
            }
        }

        _ => match app.focus {
            FocusPane::Tasks => match key.code {
                KeyCode::Char('j') | KeyCode::Down => app.task_nav_down(),
                KeyCode::Char('k') | KeyCode::Up => app.task_nav_up(),
                KeyCode::Enter | KeyCode::Char('l') => {
                    app.focus = FocusPane::Code;
                    app.input_mode = InputMode::Editing;
                }
                _ => {}
            },
            FocusPane::Code | FocusPane::Error => match key.code {
                KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
                KeyCode::Char('a') => {
                    move_to_end(app);
                    app.input_mode = InputMode::Editing;
                }
                _ => {}
            },
            FocusPane::Output => match key.code {
                KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
                KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
                KeyCode::Char('d') | KeyCode::PageDown => app.scroll_half_page_down(),
                KeyCode::Char('u') | KeyCode::PageUp => app.scroll_half_page_up(),
                KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
                KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
                _ => {}
            },
        },
    }
}

fn handle_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Tab => {
            app.focus_next();
            return;
        }
        KeyCode::BackTab => {
            app.focus_prev();
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Code => edit_code(app, key),
        FocusPane::Error => edit_error(app, key),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn edit_code(app: &mut App, key: KeyEvent) {
    let mut cursor = app.code_cursor;
    let text = app.orchestrator.code_mut();

    match key.code {
        KeyCode::Enter => insert_char(text, &mut cursor, '\n'),
        KeyCode::Char(c) => insert_char(text, &mut cursor, c),
        KeyCode::Backspace => delete_before(text, &mut cursor),
        KeyCode::Delete => delete_at(text, cursor),
        KeyCode::Left => cursor = cursor.saturating_sub(1),
        KeyCode::Right => cursor = (cursor + 1).min(text.chars().count()),
        KeyCode::Up => cursor = vertical_move(text, cursor, -1),
        KeyCode::Down => cursor = vertical_move(text, cursor, 1),
        KeyCode::Home => cursor = line_start(text, cursor),
        KeyCode::End => cursor = line_end(text, cursor),
        _ => {}
    }

    app.code_cursor = cursor;
    app.follow_code_cursor();
}

fn edit_error(app: &mut App, key: KeyEvent) {
    let mut cursor = app.error_cursor;
    let text = app.orchestrator.error_text_mut();

    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Char(c) => insert_char(text, &mut cursor, c),
        KeyCode::Backspace => delete_before(text, &mut cursor),
        KeyCode::Delete => delete_at(text, cursor),
        KeyCode::Left => cursor = cursor.saturating_sub(1),
        KeyCode::Right => cursor = (cursor + 1).min(text.chars().count()),
        KeyCode::Home => cursor = 0,
        KeyCode::End => cursor = text.chars().count(),
        _ => {}
    }

    app.error_cursor = cursor;
}

fn handle_paste(app: &mut App, pasted: &str) {
    if app.screen != Screen::Workspace || !app.is_text_focus() {
        return;
    }
    app.input_mode = InputMode::Editing;

    // Terminals deliver pasted newlines as \r
    let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");

    match app.focus {
        FocusPane::Code => {
            let mut cursor = app.code_cursor;
            insert_str(app.orchestrator.code_mut(), &mut cursor, &normalized);
            app.code_cursor = cursor;
            app.follow_code_cursor();
        }
        FocusPane::Error => {
            let single_line = normalized.replace('\n', " ");
            let mut cursor = app.error_cursor;
            insert_str(app.orchestrator.error_text_mut(), &mut cursor, &single_line);
            app.error_cursor = cursor;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Workspace {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(),
        MouseEventKind::ScrollUp => app.scroll_up(),
        _ => {}
    }
}

fn move_to_end(app: &mut App) {
    match app.focus {
        FocusPane::Code => {
            app.code_cursor = app.state().code.chars().count();
            app.follow_code_cursor();
        }
        FocusPane::Error => app.error_cursor = app.state().error_text.chars().count(),
        _ => {}
    }
}

fn insert_char(text: &mut String, cursor: &mut usize, c: char) {
    let byte_pos = char_to_byte_index(text, *cursor);
    text.insert(byte_pos, c);
    *cursor += 1;
}

fn insert_str(text: &mut String, cursor: &mut usize, s: &str) {
    let byte_pos = char_to_byte_index(text, *cursor);
    text.insert_str(byte_pos, s);
    *cursor += s.chars().count();
}

fn delete_before(text: &mut String, cursor: &mut usize) {
    if *cursor > 0 {
        *cursor -= 1;
        let byte_pos = char_to_byte_index(text, *cursor);
        text.remove(byte_pos);
    }
}

fn delete_at(text: &mut String, cursor: usize) {
    if cursor < text.chars().count() {
        let byte_pos = char_to_byte_index(text, cursor);
        text.remove(byte_pos);
    }
}

fn line_start(text: &str, cursor: usize) -> usize {
    let (_, col) = cursor_line_col(text, cursor);
    cursor - col
}

fn line_end(text: &str, cursor: usize) -> usize {
    let rest = text.chars().skip(cursor).take_while(|c| *c != '\n').count();
    cursor + rest
}

/// Move the cursor one line up or down, keeping the column where possible.
fn vertical_move(text: &str, cursor: usize, delta: i32) -> usize {
    let (line, col) = cursor_line_col(text, cursor);
    let target = line as i64 + delta as i64;
    let lines: Vec<usize> = text.split('\n').map(|l| l.chars().count()).collect();
    if target < 0 || target as usize >= lines.len() {
        return cursor;
    }
    let target = target as usize;
    let start: usize = lines[..target].iter().map(|len| len + 1).sum();
    start + col.min(lines[target])
}
