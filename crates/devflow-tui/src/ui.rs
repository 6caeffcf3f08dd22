use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};
use devflow_core::{FailureView, OutputView, ResponseSection, SectionKind, Task};
use crate::app::{App, FocusPane, InputMode, Screen, cursor_line_col};

const PRODUCT_NAME: &str = "DevFlow AI";

const HOW_IT_WORKS: [&str; 3] = [
    "Select the task type you want to perform",
    "Paste your code (and error if debugging)",
    "Press r to run the agent and get AI insights",
];

const FEATURES: [(&str, &str); 3] = [
    (
        "Explain Code",
        "Get clear, detailed explanations of complex code snippets. Understand what each part does and why.",
    ),
    (
        "Debug Errors",
        "Paste your error messages and code to get intelligent debugging suggestions and fixes.",
    ),
    (
        "Review Code",
        "Receive professional code review feedback covering best practices, security, and performance.",
    ),
];

/// Parse a line of text and convert **bold** and `code` markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();

                let mut bold_text = String::new();
                let mut found_close = false;
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        found_close = true;
                        break;
                    }
                    bold_text.push(c);
                }

                if found_close && !bold_text.is_empty() {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(std::mem::take(&mut current_text)));
                    }
                    let bold = Style::default().add_modifier(Modifier::BOLD);
                    spans.push(Span::styled(bold_text, bold));
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            }
            '`' => {
                let mut code_text = String::new();
                let mut found_close = false;
                for c in chars.by_ref() {
                    if c == '`' {
                        found_close = true;
                        break;
                    }
                    code_text.push(c);
                }

                if found_close && !code_text.is_empty() {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(std::mem::take(&mut current_text)));
                    }
                    spans.push(Span::styled(code_text, Style::default().fg(Color::Green)));
                } else {
                    current_text.push('`');
                    current_text.push_str(&code_text);
                    if found_close {
                        current_text.push('`');
                    }
                }
            }
            _ => current_text.push(c),
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    match app.screen {
        Screen::Landing => render_landing(frame, area),
        Screen::Workspace => render_workspace(app, frame, area),
    }

    if app.toast.is_some() {
        render_toast(app, frame, area);
    }
}

fn render_landing(frame: &mut Frame, area: Rect) {
    let [hero_area, features_area, cta_area, footer_area] = Layout::vertical([
        Constraint::Length(9),
        Constraint::Min(6),
        Constraint::Length(4),
        Constraint::Length(1),
    ])
    .areas(area);

    let hero = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            format!("⚡ {} ", PRODUCT_NAME),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::default(),
        Line::from(Span::styled(
            "✦ Powered by Advanced AI Agents",
            Style::default().fg(Color::Cyan),
        )),
        Line::default(),
        Line::from(vec![
            Span::raw("Understand, Debug, and "),
            Span::styled("Improve Code", Style::default().fg(Color::Cyan).bold()),
            Span::raw(" Faster with AI"),
        ])
        .bold(),
        Line::default(),
        Line::from(Span::styled(
            "Explain complex code, debug errors, review quality, and summarize logic with intelligent AI agents.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(
        Paragraph::new(hero).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        hero_area,
    );

    let cards_area = features_area.inner(Margin { vertical: 0, horizontal: 2 });
    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(cards_area);
    for ((title, description), card_area) in FEATURES.iter().zip(columns.iter()) {
        let card = Paragraph::new(*description)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(Span::styled(
                        format!(" {} ", title),
                        Style::default().fg(Color::Cyan).bold(),
                    )),
            );
        frame.render_widget(card, *card_area);
    }

    let cta = Text::from(vec![
        Line::from("Ready to accelerate your development?").bold(),
        Line::default(),
        Line::from(vec![
            Span::styled(" Enter ", Style::default().bg(Color::Cyan).fg(Color::Black).bold()),
            Span::raw(" get started   "),
            Span::styled(" q ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" quit"),
        ]),
    ]);
    frame.render_widget(Paragraph::new(cta).alignment(Alignment::Center), cta_area);

    frame.render_widget(
        Paragraph::new(format!("v{}", env!("CARGO_PKG_VERSION")))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        footer_area,
    );
}

fn render_workspace(app: &mut App, frame: &mut Frame, area: Rect) {
    let banner_height = if app.state().show_degraded_notice { 1 } else { 0 };

    let [header_area, banner_area, body_area, context_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    if banner_height > 0 {
        render_banner(frame, banner_area);
    }

    let [side_area, main_area] = Layout::horizontal([
        Constraint::Length(34),
        Constraint::Min(0),
    ])
    .areas(body_area);

    let [tasks_area, steps_area] = Layout::vertical([
        Constraint::Length(Task::all().len() as u16 * 2 + 2),
        Constraint::Min(0),
    ])
    .areas(side_area);

    render_task_picker(app, frame, tasks_area);
    render_how_it_works(frame, steps_area);

    let error_height = if app.task().accepts_error_text() { 3 } else { 0 };
    let [code_area, error_area, run_area, output_area] = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(error_height),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(main_area);

    render_code_input(app, frame, code_area);
    if error_height > 0 {
        render_error_input(app, frame, error_area);
    }
    render_run_control(app, frame, run_area);
    render_output(app, frame, output_area);

    render_product_context(frame, context_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" ⚡ DevFlow ", Style::default().fg(Color::White).bold()),
        Span::styled("AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
    frame.render_widget(
        Paragraph::new(Span::styled("Esc back ", Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Right),
        area,
    );
}

fn render_banner(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" ◌ ", Style::default().fg(Color::Cyan)),
        Span::styled("Backend service is starting up", Style::default().fg(Color::White).bold()),
        Span::styled(" (cold start)", Style::default().fg(Color::Gray)),
        Span::styled(". Please wait 10–15 seconds and retry.", Style::default().fg(Color::Gray)),
        Span::styled("  x dismiss", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Rgb(14, 40, 56))),
        area,
    );
}

fn border_color(app: &App, pane: FocusPane) -> Color {
    if app.focus != pane {
        Color::DarkGray
    } else if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::Cyan
    }
}

fn render_task_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let current = app.task();
    let items: Vec<ListItem> = Task::all()
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let name_style = if *task == current {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled(task.display_name(), name_style),
                ]),
                Line::from(Span::styled(
                    format!("  {}", task.description()),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Tasks)))
        .title(" Select Task ");

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.task_state);
}

fn render_how_it_works(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = HOW_IT_WORKS
        .iter()
        .enumerate()
        .map(|(i, step)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(Color::Cyan).bold()),
                Span::styled(*step, Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let steps = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" How it works "),
        );
    frame.render_widget(steps, area);
}

fn render_code_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Code)))
        .title(" Code Input ");

    let inner = block.inner(area);
    app.code_height = inner.height;
    app.follow_code_cursor();

    let code = &app.state().code;
    let (cursor_line, cursor_col) = cursor_line_col(code, app.code_cursor);
    let line_count = code.split('\n').count();
    let gutter = line_count.to_string().len().max(2);
    let text_width = (inner.width as usize).saturating_sub(gutter + 1);

    // Horizontal offset keeps the cursor column visible
    let h_offset = if text_width > 0 && cursor_col >= text_width {
        cursor_col + 1 - text_width
    } else {
        0
    };

    let paragraph = if code.is_empty() {
        Paragraph::new(Span::styled(
            "// Paste your code here...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let lines: Vec<Line> = code
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                let visible: String = line.chars().skip(h_offset).collect();
                Line::from(vec![
                    Span::styled(
                        format!("{:>width$} ", i + 1, width = gutter),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(visible),
                ])
            })
            .collect();
        Paragraph::new(lines).scroll((app.code_scroll, 0))
    };

    frame.render_widget(paragraph.block(block), area);

    if app.input_mode == InputMode::Editing && app.focus == FocusPane::Code {
        let x = if code.is_empty() { 0 } else { gutter + 1 + cursor_col - h_offset };
        let y = (cursor_line as u16).saturating_sub(app.code_scroll);
        frame.set_cursor_position((inner.x + x as u16, inner.y + y));
    }
}

fn render_error_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Error)))
        .title(" Error Message (optional) ");

    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.error_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let error_text = &app.state().error_text;
    let input = if error_text.is_empty() {
        Paragraph::new(Span::styled(
            "Paste error message or stack trace...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible: String = error_text.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible).style(Style::default().fg(Color::Red))
    };

    frame.render_widget(input.block(block), area);

    if app.input_mode == InputMode::Editing && app.focus == FocusPane::Error {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_run_control(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.state();
    let button = if state.is_loading {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Span::styled(
            format!(" ◐ Analyzing{:<3} ", dots),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        )
    } else if state.submit_enabled() {
        Span::styled(
            " ▶ Run Agent (r) ",
            Style::default().bg(Color::Cyan).fg(Color::Black).bold(),
        )
    } else {
        Span::styled(" ▶ Run Agent ", Style::default().bg(Color::DarkGray).fg(Color::Gray))
    };

    frame.render_widget(Paragraph::new(Line::from(button)).alignment(Alignment::Right), area);
}

fn section_marker(kind: SectionKind) -> (&'static str, Color) {
    match kind {
        SectionKind::Explanation => ("</>", Color::Cyan),
        SectionKind::Issues => ("!", Color::Yellow),
        SectionKind::Fix => ("✓", Color::Green),
        SectionKind::Summary => ("✦", Color::Magenta),
    }
}

fn section_lines(sections: &[ResponseSection], task: Task) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for section in sections {
        let (marker, color) = section_marker(section.kind);
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", marker), Style::default().fg(color).bold()),
            Span::styled(
                section.heading(task).to_string(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]));
        for line in section.content.lines() {
            let mut parsed = parse_markdown_line(line);
            parsed.spans.insert(0, Span::raw("  "));
            lines.push(parsed);
        }
        lines.push(Line::default());
    }
    lines
}

fn failure_lines(view: &FailureView) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            format!("☁ {}", view.headline),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(view.message, Style::default().fg(Color::Gray))),
        Line::default(),
        Line::from(Span::styled(
            format!("Error: {}", view.diagnostic),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ]
}

fn loading_lines(frame_idx: u8) -> Vec<Line<'static>> {
    let dots = ".".repeat((frame_idx as usize) + 1);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("AI is analyzing your code{}", dots),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            ),
        ]),
        Line::default(),
    ];
    for _ in 0..3 {
        let skeleton = Style::default().fg(Color::DarkGray);
        lines.push(Line::from(Span::styled("▆▆ ▆▆▆▆▆▆▆▆▆▆", skeleton)));
        lines.push(Line::from(Span::styled("▆".repeat(40), skeleton)));
        lines.push(Line::default());
    }
    lines
}

fn empty_lines() -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::from(Span::styled(">_", Style::default().fg(Color::Cyan).bold())).centered(),
        Line::default(),
        Line::from("Ready to Analyze").bold().centered(),
        Line::from(Span::styled(
            "Paste your code, select a task, and run the AI agent to begin.",
            Style::default().fg(Color::Gray),
        ))
        .centered(),
        Line::default(),
        Line::from(Span::styled(
            "⚡ Powered by multi-agent AI reasoning",
            Style::default().fg(Color::DarkGray),
        ))
        .centered(),
    ]
}

/// Word-wrap styled lines to `width` columns.
///
/// The output panel renders the result without `Wrap`, so the returned length
/// is exactly the number of rows drawn and the scroll range can reach the end.
fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines.into_iter().flat_map(|line| wrap_line(line, width)).collect()
}

fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let alignment = line.alignment;
    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut row_len = 0;

    for span in line.spans {
        let style = span.style;
        for token in split_runs(&span.content) {
            let token_len = token.chars().count();
            let is_space = token.starts_with(' ');

            if row_len + token_len <= width {
                row.push(Span::styled(token.to_string(), style));
                row_len += token_len;
            } else if is_space {
                // Spaces at a break are dropped
                if row_len > 0 {
                    rows.push(std::mem::take(&mut row));
                    row_len = 0;
                }
            } else if token_len <= width {
                rows.push(std::mem::take(&mut row));
                row.push(Span::styled(token.to_string(), style));
                row_len = token_len;
            } else {
                // Longer than a full row: hard-break by chars
                if row_len > 0 {
                    rows.push(std::mem::take(&mut row));
                    row_len = 0;
                }
                let mut rest: Vec<char> = token.chars().collect();
                while !rest.is_empty() {
                    if row_len == width {
                        rows.push(std::mem::take(&mut row));
                        row_len = 0;
                    }
                    let take = (width - row_len).min(rest.len());
                    let piece: String = rest.drain(..take).collect();
                    row.push(Span::styled(piece, style));
                    row_len += take;
                }
            }
        }
    }
    rows.push(row);

    rows.into_iter()
        .map(|spans| {
            let mut wrapped = Line::from(spans);
            wrapped.alignment = alignment;
            wrapped
        })
        .collect()
}

/// Split text into alternating runs of spaces and non-spaces.
fn split_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev_space = None;
    for (i, c) in text.char_indices() {
        let space = c == ' ';
        if prev_space.is_some_and(|p| p != space) {
            runs.push(&text[start..i]);
            start = i;
        }
        prev_space = Some(space);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}

fn render_output(app: &mut App, frame: &mut Frame, area: Rect) {
    let state = app.state();
    let title = state.panel_title();
    let lines = match state.output_view() {
        OutputView::Loading => loading_lines(app.animation_frame),
        OutputView::Failure(view) => failure_lines(&view),
        OutputView::Sections(sections) => section_lines(sections, state.task),
        OutputView::Empty => empty_lines(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Output)))
        .title(format!(" {} ", title));

    let inner = block.inner(area);
    let lines = wrap_lines(lines, inner.width as usize);
    app.output_height = inner.height;
    app.total_output_lines = lines.len().min(u16::MAX as usize) as u16;
    let max_scroll = app.total_output_lines.saturating_sub(app.output_height);
    app.output_scroll = app.output_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines).block(block).scroll((app.output_scroll, 0));

    frame.render_widget(paragraph, area);

    if app.total_output_lines > app.output_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(app.total_output_lines as usize)
            .position(app.output_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_product_context(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("✦ Multi-Agent AI", Style::default().fg(Color::DarkGray)),
        Span::styled(" • ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            "Structured reasoning for reliable analysis",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let pairs: Vec<(&str, &str)> = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => vec![("Esc", "done"), ("Tab", "next"), ("^R", "run")],
        (InputMode::Normal, FocusPane::Tasks) => {
            vec![("j/k", "task"), ("1-4", "pick"), ("Tab", "focus"), ("r", "run"), ("q", "quit")]
        }
        (InputMode::Normal, FocusPane::Code | FocusPane::Error) => {
            vec![("i", "edit"), ("Tab", "focus"), ("r", "run"), ("x", "dismiss"), ("q", "quit")]
        }
        (InputMode::Normal, FocusPane::Output) => {
            vec![
                ("j/k", "scroll"),
                ("g/G", "top/end"),
                ("Tab", "focus"),
                ("r", "run"),
                ("q", "quit"),
            ]
        }
    };
    for (key, label) in pairs {
        hints.push(Span::styled(format!(" {} ", key), key_style));
        hints.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_toast(app: &App, frame: &mut Frame, area: Rect) {
    let Some(toast) = &app.toast else {
        return;
    };

    let popup_width = 46.min(area.width.saturating_sub(2));
    let popup_height = 4;
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(popup_width + 1),
        area.y + 1,
        popup_width,
        popup_height.min(area.height),
    );

    frame.render_widget(Clear, popup_area);

    let color = Color::Red;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(format!(" {} ", toast.title), Style::default().fg(color).bold()));

    let body = Paragraph::new(toast.description.as_str())
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(body, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow_core::{AgentClient, extract_sections};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn buffer_text(app: &mut App) -> String {
        let backend = TestBackend::new(110, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn workspace_app(task: Task) -> App {
        let mut app = App::new(AgentClient::new("http://127.0.0.1:9"), task);
        app.launch();
        app
    }

    #[test]
    fn test_markdown_bold_and_code() {
        let line = parse_markdown_line("use **Option** via `x.get()` here");
        let texts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["use ", "Option", " via ", "x.get()", " here"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_unclosed_markers_are_literal() {
        let line = parse_markdown_line("a ** b ` c");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a ** b ` c");
    }

    #[test]
    fn test_landing_screen() {
        let mut app = App::new(AgentClient::new("http://127.0.0.1:9"), Task::Explain);
        let text = buffer_text(&mut app);
        assert!(text.contains("DevFlow AI"));
        assert!(text.contains("Debug Errors"));
    }

    #[test]
    fn test_empty_state_and_no_error_field() {
        let mut app = workspace_app(Task::Explain);
        let text = buffer_text(&mut app);
        assert!(text.contains("Ready to Analyze"));
        assert!(text.contains("AI Analysis"));
        assert!(!text.contains("Error Message"));
    }

    fn plain(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_debug_shows_error_field_and_task_headings() {
        let mut app = workspace_app(Task::Debug);
        app.orchestrator.set_code("def f(): return x/0");

        let screen = buffer_text(&mut app);
        assert!(screen.contains("Error Message (optional)"));
        assert!(screen.contains("Run Agent (r)"));

        let sections = extract_sections(&json!({ "issues": "x undefined", "fix": "define x" }));
        let text = plain(&section_lines(&sections, Task::Debug));
        assert!(text.contains("Issues Found"));
        assert!(text.contains("Suggested Fix"));
        assert!(text.find("Issues Found") < text.find("Suggested Fix"));
    }

    #[test]
    fn test_review_headings_override_titles() {
        let sections = extract_sections(&json!({ "explanation": "ok", "fix": "rename" }));
        let text = plain(&section_lines(&sections, Task::Review));
        assert!(text.contains("Code Review Summary"));
        assert!(text.contains("Recommendations"));
    }

    #[test]
    fn test_failure_view_lines() {
        let view = FailureView::from_error(&devflow_core::AgentError::Timeout);
        let text = plain(&failure_lines(&view));
        assert!(text.contains("Agent Unavailable"));
        assert!(text.contains("Unable to reach the AI service"));
        assert!(text.contains("Error: Request timed out. The backend may be starting up."));
    }

    #[test]
    fn test_wrap_lines_breaks_at_words() {
        let lines = vec![
            Line::from(vec![Span::raw("  "), Span::styled("alpha beta", Style::default().bold())]),
            Line::default(),
            Line::from("abcdefghij"),
        ];
        let wrapped = wrap_lines(lines, 8);

        let rows: Vec<String> = wrapped
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(rows, vec!["  alpha ", "beta", "", "abcdefgh", "ij"]);
        assert!(wrapped[1].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(wrapped.iter().all(|l| l.width() <= 8));
    }

    #[test]
    fn test_wrap_lines_keeps_alignment() {
        let wrapped = wrap_lines(vec![Line::from("Ready to Analyze").centered()], 8);
        assert_eq!(wrapped.len(), 2);
        assert!(wrapped.iter().all(|l| l.alignment == Some(Alignment::Center)));
    }

    #[tokio::test]
    async fn test_scroll_to_bottom_reaches_last_word() {
        let server = MockServer::start().await;
        let words: Vec<String> = (0..600)
            .map(|i| if i % 7 == 0 { format!("considerably{}", i) } else { format!("w{}", i) })
            .collect();
        let explanation = format!("{} closingword", words.join(" "));
        Mock::given(method("POST"))
            .and(path("/api/agent/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "explanation": explanation,
            })))
            .mount(&server)
            .await;

        let mut app = App::new(AgentClient::new(&server.uri()), Task::Explain);
        app.launch();
        app.orchestrator.set_code("print(1)");
        app.submit();
        app.orchestrator.wait().await;

        let before = buffer_text(&mut app);
        assert!(app.total_output_lines > app.output_height);
        assert!(!before.contains("closingword"));

        app.scroll_to_bottom();
        let after = buffer_text(&mut app);
        assert!(after.contains("closingword"));
    }
}
