use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use md_outline_engine::{HostError, MessageLevel, Notifier, Presenter, ResultView};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::io::{Stdout, stdout};

/// Shows results in a full-screen terminal popup until the user closes it.
#[derive(Debug, Default)]
pub struct TuiPresenter;

impl Presenter for TuiPresenter {
    fn show(&mut self, view: &ResultView<'_>) -> Result<(), HostError> {
        run_viewer(view).map_err(|e| HostError(e.to_string()))
    }

    // The popup is modal and already gone once `show` returns
    fn dismiss(&mut self, _key: &str) {}
}

/// Prints results to stdout.
#[derive(Debug, Default)]
pub struct PlainPresenter;

impl Presenter for PlainPresenter {
    fn show(&mut self, view: &ResultView<'_>) -> Result<(), HostError> {
        println!("{}", view.body);
        Ok(())
    }

    fn dismiss(&mut self, _key: &str) {}
}

/// Writes notifications to stderr.
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str, level: MessageLevel) {
        eprintln!("[{level}] {message}");
    }
}

struct ViewerState<'a> {
    view: &'a ResultView<'a>,
    lines: Vec<String>,
    scroll: u16,
}

impl ViewerState<'_> {
    fn max_scroll(&self) -> u16 {
        u16::try_from(self.lines.len().saturating_sub(1)).unwrap_or(u16::MAX)
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = u16::try_from(next).unwrap_or(0);
    }
}

fn run_viewer(view: &ResultView<'_>) -> Result<()> {
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(enter_screen, || {
        let _ = execute!(stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })?;

    // Tabs carry the outline's structure but most terminals render them poorly
    let mut state = ViewerState {
        view,
        lines: view.body.lines().map(|l| l.replace('\t', "    ")).collect(),
        scroll: 0,
    };
    let res = event_loop(&mut terminal, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn enter_screen() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Runs `setup`, calling `restore` before handing back any error.
fn setup_or_restore<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce()) -> Result<T> {
    setup().inspect_err(|_| restore())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut ViewerState<'_>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, state))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => state.scroll_by(1),
                KeyCode::Up | KeyCode::Char('k') => state.scroll_by(-1),
                KeyCode::PageDown | KeyCode::Char(' ') => state.scroll_by(20),
                KeyCode::PageUp => state.scroll_by(-20),
                KeyCode::Home => state.scroll = 0,
                KeyCode::End => state.scroll = state.max_scroll(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, state: &ViewerState<'_>) {
    let area = centered_rect(90, 90, f.area());
    f.render_widget(Clear, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(state.view.title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(inner);

    let hint = Paragraph::new(Line::from(Span::styled(
        state.view.hint,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(hint, chunks[0]);

    let body: Vec<Line> = state
        .lines
        .iter()
        .map(|line| Line::from(Span::raw(line.as_str())))
        .collect();
    let content = Paragraph::new(body)
        .block(Block::default().borders(Borders::TOP))
        .scroll((state.scroll, 0));
    f.render_widget(content, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q/Esc: Close | "),
        Span::raw("↑/k ↓/j: Scroll | "),
        Span::raw("PgUp/PgDn: Page"),
    ]));
    f.render_widget(help, chunks[2]);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state<'a>(view: &'a ResultView<'a>) -> ViewerState<'a> {
        ViewerState {
            view,
            lines: view.body.lines().map(str::to_string).collect(),
            scroll: 0,
        }
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let view = ResultView {
            key: "k",
            title: "t",
            hint: "h",
            body: "a\nb\nc",
        };
        let mut s = state(&view);

        s.scroll_by(-5);
        assert_eq!(s.scroll, 0);
        s.scroll_by(10);
        assert_eq!(s.scroll, 2);
    }

    #[test]
    fn failed_setup_restores_terminal() {
        let mut restored = false;

        let res: Result<()> =
            setup_or_restore(|| Err(anyhow::anyhow!("no tty")), || restored = true);

        assert_eq!(res.unwrap_err().to_string(), "no tty");
        assert!(restored);
    }

    #[test]
    fn successful_setup_leaves_terminal_alone() {
        let mut restored = false;

        let res = setup_or_restore(|| Ok(7), || restored = true);

        assert_eq!(res.unwrap(), 7);
        assert!(!restored);
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(90, 90, area);
        assert!(popup.width <= 100 && popup.height <= 50);
        assert!(popup.x > 0 && popup.y > 0);
    }
}
