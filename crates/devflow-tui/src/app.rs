use ratatui::widgets::ListState;
use devflow_core::{
    AgentClient, InteractionState, Orchestrator, Outcome, SubmitRejected, Task, Toast,
};

/// How many ticks a toast stays on screen.
pub const TOAST_TICKS: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Tasks,
    Code,
    Error, // Error message input (debug task only)
    Output,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Request lifecycle and the form it reads from
    pub orchestrator: Orchestrator,
    pub task_state: ListState,

    // Cursor positions are char indices
    pub code_cursor: usize,
    pub error_cursor: usize,
    pub code_scroll: u16,
    pub code_height: u16,

    // Output panel
    pub output_scroll: u16,
    pub output_height: u16,
    pub total_output_lines: u16,

    // Transient notification
    pub toast: Option<Toast>,
    pub toast_ticks: u8,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(client: AgentClient, task: Task) -> Self {
        let mut task_state = ListState::default();
        task_state.select(Task::all().iter().position(|t| *t == task));

        Self {
            should_quit: false,
            screen: Screen::Landing,
            input_mode: InputMode::Normal,
            focus: FocusPane::Code,

            orchestrator: Orchestrator::new(client, task),
            task_state,

            code_cursor: 0,
            error_cursor: 0,
            code_scroll: 0,
            code_height: 0,

            output_scroll: 0,
            output_height: 0,
            total_output_lines: 0,

            toast: None,
            toast_ticks: 0,

            animation_frame: 0,
        }
    }

    pub fn state(&self) -> &InteractionState {
        self.orchestrator.state()
    }

    pub fn task(&self) -> Task {
        self.state().task
    }

    pub fn launch(&mut self) {
        self.screen = Screen::Workspace;
        self.focus = FocusPane::Code;
        self.input_mode = InputMode::Editing;
    }

    // Task picker

    pub fn select_task(&mut self, task: Task) {
        self.orchestrator.set_task(task);
        self.task_state.select(Task::all().iter().position(|t| *t == task));
        if self.focus == FocusPane::Error && !task.accepts_error_text() {
            self.focus = FocusPane::Code;
        }
    }

    pub fn task_nav_down(&mut self) {
        self.select_task(self.task().next());
    }

    pub fn task_nav_up(&mut self) {
        self.select_task(self.task().prev());
    }

    // Focus

    fn focus_order(&self) -> Vec<FocusPane> {
        let mut order = vec![FocusPane::Tasks, FocusPane::Code];
        if self.task().accepts_error_text() {
            order.push(FocusPane::Error);
        }
        order.push(FocusPane::Output);
        order
    }

    pub fn focus_next(&mut self) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(idx + 1) % order.len()];
        self.input_mode = InputMode::Normal;
    }

    pub fn focus_prev(&mut self) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(idx + order.len() - 1) % order.len()];
        self.input_mode = InputMode::Normal;
    }

    pub fn is_text_focus(&self) -> bool {
        matches!(self.focus, FocusPane::Code | FocusPane::Error)
    }

    // Submission

    pub fn submit(&mut self) {
        match self.orchestrator.submit() {
            Ok(()) => {
                self.output_scroll = 0;
                self.input_mode = InputMode::Normal;
            }
            Err(SubmitRejected::Busy) => {}
            Err(SubmitRejected::BlankCode) => {
                self.focus = FocusPane::Code;
            }
        }
        self.pull_toast();
    }

    /// Apply a finished request, if any.
    pub async fn poll_request(&mut self) -> Option<Outcome> {
        let outcome = self.orchestrator.poll().await;
        if outcome.is_some() {
            self.output_scroll = 0;
            self.pull_toast();
        }
        outcome
    }

    fn pull_toast(&mut self) {
        if let Some(toast) = self.orchestrator.take_toast() {
            self.toast = Some(toast);
            self.toast_ticks = TOAST_TICKS;
        }
    }

    pub fn dismiss_banner(&mut self) {
        self.orchestrator.dismiss_degraded_notice();
    }

    pub fn tick_animation(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;

        if self.toast.is_some() {
            self.toast_ticks = self.toast_ticks.saturating_sub(1);
            if self.toast_ticks == 0 {
                self.toast = None;
            }
        }
    }

    // Output scrolling

    fn max_output_scroll(&self) -> u16 {
        self.total_output_lines.saturating_sub(self.output_height)
    }

    pub fn scroll_down(&mut self) {
        self.output_scroll = (self.output_scroll + 1).min(self.max_output_scroll());
    }

    pub fn scroll_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.output_height / 2).max(1);
        self.output_scroll = (self.output_scroll + half).min(self.max_output_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.output_height / 2).max(1);
        self.output_scroll = self.output_scroll.saturating_sub(half);
    }

    pub fn scroll_to_top(&mut self) {
        self.output_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.output_scroll = self.max_output_scroll();
    }

    /// Keep the code cursor line inside the visible editor area.
    pub fn follow_code_cursor(&mut self) {
        let (line, _) = cursor_line_col(&self.state().code, self.code_cursor);
        let line = line as u16;
        let height = self.code_height.max(1);
        if line < self.code_scroll {
            self.code_scroll = line;
        } else if line >= self.code_scroll + height {
            self.code_scroll = line + 1 - height;
        }
    }
}

/// Line and column (both in chars) of a char-index cursor.
pub fn cursor_line_col(text: &str, cursor: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for c in text.chars().take(cursor) {
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(AgentClient::new("http://127.0.0.1:9"), Task::Explain)
    }

    #[test]
    fn test_error_focus_only_for_debug() {
        let mut app = app();
        app.launch();
        app.focus_next();
        assert_eq!(app.focus, FocusPane::Output);

        app.select_task(Task::Debug);
        app.focus = FocusPane::Code;
        app.focus_next();
        assert_eq!(app.focus, FocusPane::Error);

        app.select_task(Task::Review);
        assert_eq!(app.focus, FocusPane::Code);
    }

    #[test]
    fn test_focus_prev_wraps() {
        let mut app = app();
        app.focus = FocusPane::Tasks;
        app.focus_prev();
        assert_eq!(app.focus, FocusPane::Output);
    }

    #[test]
    fn test_task_picker_tracks_selection() {
        let mut app = app();
        app.task_nav_down();
        assert_eq!(app.task(), Task::Debug);
        assert_eq!(app.task_state.selected(), Some(1));

        app.task_nav_up();
        app.task_nav_up();
        assert_eq!(app.task(), Task::Summarize);
        assert_eq!(app.task_state.selected(), Some(3));
    }

    #[tokio::test]
    async fn test_blank_submit_shows_toast() {
        let mut app = app();
        app.launch();
        app.focus = FocusPane::Output;
        app.submit();

        assert_eq!(app.focus, FocusPane::Code);
        assert_eq!(app.toast.as_ref().map(|t| t.title.as_str()), Some("Code Required"));
        assert!(!app.state().is_loading);
    }

    #[test]
    fn test_toast_expires_after_ticks() {
        let mut app = app();
        app.toast = Some(Toast::error("Analysis Failed", "boom"));
        app.toast_ticks = 2;

        app.tick_animation();
        assert!(app.toast.is_some());
        app.tick_animation();
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_cursor_line_col() {
        assert_eq!(cursor_line_col("ab\ncd", 0), (0, 0));
        assert_eq!(cursor_line_col("ab\ncd", 2), (0, 2));
        assert_eq!(cursor_line_col("ab\ncd", 3), (1, 0));
        assert_eq!(cursor_line_col("ab\ncd", 5), (1, 2));
    }

    #[test]
    fn test_follow_code_cursor_scrolls() {
        let mut app = app();
        app.orchestrator.set_code("1\n2\n3\n4\n5\n6");
        app.code_height = 2;
        app.code_cursor = 10; // line 5

        app.follow_code_cursor();
        assert_eq!(app.code_scroll, 4);

        app.code_cursor = 0;
        app.follow_code_cursor();
        assert_eq!(app.code_scroll, 0);
    }
}
