/// Interface throughput screen

use anyhow::Result;
use chrono::{DateTime, Local};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::time::Duration;

use crate::core::sampler::InterfaceMetrics;
use crate::utils::{
    format_clock, format_count, format_rate, short_if_name, truncate, DESCRIPTION_WIDTH,
    ERROR_WIDTH, NAME_WIDTH, RATE_WIDTH, SPEED_WIDTH, STATE_WIDTH,
};

const COLUMN_SPACING: u16 = 3;

/// Styles used by the screen, chosen once at startup
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub down_row: Style,
    pub busy: Style,
    pub notice: Style,
}

impl Theme {
    /// Colored theme unless NO_COLOR is set
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            Self::plain()
        } else {
            Self::colored()
        }
    }

    pub fn colored() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        Self {
            header: bold,
            down_row: bold.fg(Color::Red),
            busy: bold.fg(Color::White).bg(Color::Red),
            notice: bold.fg(Color::White).bg(Color::Red),
        }
    }

    pub fn plain() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        Self {
            header: bold,
            down_row: bold,
            busy: bold,
            notice: bold,
        }
    }
}

/// Everything one refresh cycle puts on screen
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Interfaces in group order, then interface order
    pub rows: Vec<InterfaceMetrics>,
    pub unit_label: String,
    pub include_errors: bool,
    pub interval: Duration,
    pub last_update: DateTime<Local>,
    pub exec_time: Duration,
}

impl DashboardView {
    fn column_widths(&self) -> Vec<u16> {
        let mut widths = vec![
            NAME_WIDTH as u16,
            (SPEED_WIDTH + 1 + STATE_WIDTH) as u16,
            DESCRIPTION_WIDTH as u16,
            RATE_WIDTH as u16,
            RATE_WIDTH as u16,
        ];
        if self.include_errors {
            widths.push(ERROR_WIDTH as u16);
            widths.push(ERROR_WIDTH as u16);
        }
        widths
    }

    /// Smallest area that shows every row without clipping
    pub fn required_size(&self) -> (u16, u16) {
        let widths = self.column_widths();
        let width = widths.iter().sum::<u16>() + COLUMN_SPACING * (widths.len() as u16 - 1);
        // header + rows + footer
        let height = self.rows.len() as u16 + 2;
        (width, height)
    }

    pub fn header_cells(&self) -> Vec<String> {
        let mut cells = vec![
            "    Int".to_string(),
            "Speed and State".to_string(),
            "Description".to_string(),
            format!("{:>width$}", format!("{} in", self.unit_label), width = RATE_WIDTH),
            format!("{:>width$}", format!("{} out", self.unit_label), width = RATE_WIDTH),
        ];
        if self.include_errors {
            cells.push(format!("{:>width$}", "Err in", width = ERROR_WIDTH));
            cells.push(format!("{:>width$}", "Err out", width = ERROR_WIDTH));
        }
        cells
    }

    pub fn row_cells(&self, metrics: &InterfaceMetrics) -> Vec<String> {
        let mut cells = vec![
            truncate(&short_if_name(&metrics.interface), NAME_WIDTH),
            format!(
                "{:<speed$} {:<state$}",
                truncate(&metrics.speed_label, SPEED_WIDTH),
                truncate(&metrics.state.to_string(), STATE_WIDTH),
                speed = SPEED_WIDTH,
                state = STATE_WIDTH
            ),
            truncate(&metrics.description, DESCRIPTION_WIDTH),
            format!("{:>width$}", format_rate(metrics.in_tput), width = RATE_WIDTH),
            format!("{:>width$}", format_rate(metrics.out_tput), width = RATE_WIDTH),
        ];
        if self.include_errors {
            cells.push(format!("{:>width$}", format_count(metrics.in_errors), width = ERROR_WIDTH));
            cells.push(format!("{:>width$}", format_count(metrics.out_errors), width = ERROR_WIDTH));
        }
        cells
    }

    pub fn footer(&self) -> String {
        format!(
            "interval {:2.0}s - Last Update: {} - Exec Time {:4.2} - Press \"Q\" to end",
            self.interval.as_secs_f64(),
            format_clock(&self.last_update),
            self.exec_time.as_secs_f64()
        )
    }
}

#[derive(Debug, Clone)]
enum Content {
    Blank,
    Banner(String),
    Dashboard(DashboardView),
    Error(String),
}

/// Owns the terminal and redraws whatever was last shown
pub struct MonitorScreen<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
    content: Content,
}

impl<B: Backend> MonitorScreen<B> {
    pub fn new(terminal: Terminal<B>, theme: Theme) -> Self {
        Self {
            terminal,
            theme,
            content: Content::Blank,
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn draw_banner(&mut self, started: &DateTime<Local>) -> Result<()> {
        self.content = Content::Banner(format!(
            "Collecting first interval, starting at: {}",
            format_clock(started)
        ));
        self.render(false)?;
        Ok(())
    }

    /// Mark the screen busy while a cycle talks to the device
    pub fn draw_busy(&mut self) -> Result<()> {
        self.render(true)?;
        Ok(())
    }

    /// Draw the interface table. Returns false when the area was too small
    /// and the resize notice was shown instead.
    pub fn draw_dashboard(&mut self, view: DashboardView) -> Result<bool> {
        self.content = Content::Dashboard(view);
        self.render(false)
    }

    pub fn draw_error(&mut self, message: &str) -> Result<()> {
        self.content = Content::Error(message.to_string());
        self.render(false)?;
        Ok(())
    }

    /// Full repaint of the current content
    pub fn repaint(&mut self) -> Result<()> {
        self.terminal.clear()?;
        self.render(false)?;
        Ok(())
    }

    fn render(&mut self, busy: bool) -> Result<bool> {
        let theme = &self.theme;
        let content = &self.content;
        let mut fits = true;

        self.terminal.draw(|f| {
            fits = render_content(f, theme, content);
            if busy {
                render_busy(f, theme);
            }
        })?;

        Ok(fits)
    }
}

fn render_content(f: &mut Frame, theme: &Theme, content: &Content) -> bool {
    let area = f.size();
    match content {
        Content::Blank => true,
        Content::Banner(text) => {
            f.render_widget(Paragraph::new(text.as_str()).style(theme.header), area);
            true
        }
        Content::Error(message) => {
            let lines = vec![
                Line::styled(message.clone(), theme.header),
                Line::raw("press any key"),
            ];
            f.render_widget(Paragraph::new(lines), area);
            true
        }
        Content::Dashboard(view) => {
            let (width, height) = view.required_size();
            if area.width < width || area.height < height {
                render_overflow(f, theme, area);
                false
            } else {
                render_dashboard(f, theme, view, area);
                true
            }
        }
    }
}

fn render_dashboard(f: &mut Frame, theme: &Theme, view: &DashboardView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(view.rows.len() as u16 + 1), // header + interfaces
            Constraint::Length(1),                          // footer
            Constraint::Min(0),
        ])
        .split(area);

    let header = Row::new(view.header_cells()).style(theme.header);

    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|metrics| {
            let row = Row::new(view.row_cells(metrics).into_iter().map(Cell::from));
            if metrics.state.is_down() {
                row.style(theme.down_row)
            } else {
                row
            }
        })
        .collect();

    let widths: Vec<Constraint> = view
        .column_widths()
        .into_iter()
        .map(Constraint::Length)
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(COLUMN_SPACING);

    f.render_widget(table, chunks[0]);
    f.render_widget(Paragraph::new(view.footer()), chunks[1]);
}

fn render_overflow(f: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::raw("..."),
        Line::styled("      --- increase screen size ---", theme.notice),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_busy(f: &mut Frame, theme: &Theme) {
    let area = f.size();
    let marker = Rect::new(area.x, area.y, area.width.min(3), area.height.min(1));
    f.render_widget(Paragraph::new("BSY").style(theme.busy), marker);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::LinkState;
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;

    fn metrics(name: &str, state: LinkState, in_tput: f64) -> InterfaceMetrics {
        InterfaceMetrics {
            interface: name.to_string(),
            prev_in_bytes: 0,
            prev_out_bytes: 0,
            in_tput,
            out_tput: 2.5,
            in_errors: 1234,
            out_errors: 0,
            state,
            description: "a very long description that will be cut".to_string(),
            speed_label: "10 Gb/s".to_string(),
        }
    }

    fn view(rows: Vec<InterfaceMetrics>, include_errors: bool) -> DashboardView {
        DashboardView {
            rows,
            unit_label: "Mbps".to_string(),
            include_errors,
            interval: Duration::from_secs(5),
            last_update: Local.with_ymd_and_hms(2024, 7, 15, 10, 20, 30).unwrap(),
            exec_time: Duration::from_millis(420),
        }
    }

    fn screen(width: u16, height: u16) -> MonitorScreen<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        MonitorScreen::new(terminal, Theme::colored())
    }

    fn screen_lines(screen: &MonitorScreen<TestBackend>) -> Vec<String> {
        let buffer = screen.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_row_cells_format() {
        let v = view(vec![], true);
        let cells = v.row_cells(&metrics("port-channel12", LinkState::Up, 1234.56));
        assert_eq!(cells[0], "Po12");
        assert_eq!(cells[1], "10 Gb/s    up  ");
        assert_eq!(cells[2], "a very long descript");
        assert_eq!(cells[3], "   1,234.6");
        assert_eq!(cells[4], "       2.5");
        assert_eq!(cells[5], "       1,234");
        assert_eq!(cells.len(), 7);
    }

    #[test]
    fn test_header_and_footer() {
        let v = view(vec![], false);
        let header = v.header_cells();
        assert_eq!(header.len(), 5);
        assert_eq!(header[3], "   Mbps in");
        assert_eq!(
            v.footer(),
            "interval  5s - Last Update: 10:20:30 - Exec Time 0.42 - Press \"Q\" to end"
        );
    }

    #[test]
    fn test_draw_dashboard() {
        let mut s = screen(100, 10);
        let fits = s
            .draw_dashboard(view(
                vec![
                    metrics("Ethernet1/1", LinkState::Up, 10.0),
                    metrics("Ethernet1/2", LinkState::Down, 0.0),
                ],
                false,
            ))
            .unwrap();
        assert!(fits);

        let lines = screen_lines(&s);
        assert!(lines[0].contains("Speed and State"));
        assert!(lines[1].starts_with("Eth1/1"));
        assert!(lines[2].starts_with("Eth1/2"));
        assert!(lines[3].starts_with("interval  5s"));

        let buffer = s.backend().buffer();
        assert_eq!(buffer.get(0, 2).fg, Color::Red);
        assert_ne!(buffer.get(0, 1).fg, Color::Red);
    }

    #[test]
    fn test_overflow_shows_notice() {
        let mut s = screen(100, 3);
        let fits = s
            .draw_dashboard(view(
                vec![
                    metrics("Ethernet1/1", LinkState::Up, 1.0),
                    metrics("Ethernet1/2", LinkState::Up, 1.0),
                ],
                false,
            ))
            .unwrap();
        assert!(!fits);
        let lines = screen_lines(&s);
        assert!(lines[1].contains("--- increase screen size ---"));
    }

    #[test]
    fn test_narrow_terminal_overflows() {
        let mut s = screen(40, 20);
        let fits = s
            .draw_dashboard(view(vec![metrics("Ethernet1/1", LinkState::Up, 1.0)], true))
            .unwrap();
        assert!(!fits);
    }

    #[test]
    fn test_busy_marker_over_banner() {
        let mut s = screen(80, 5);
        let started = Local.with_ymd_and_hms(2024, 7, 15, 8, 0, 0).unwrap();
        s.draw_banner(&started).unwrap();
        assert!(screen_lines(&s)[0].starts_with("Collecting first interval, starting at: 08:00:00"));

        s.draw_busy().unwrap();
        assert!(screen_lines(&s)[0].starts_with("BSY"));

        s.repaint().unwrap();
        assert!(screen_lines(&s)[0].starts_with("Collecting"));
    }

    #[test]
    fn test_error_screen() {
        let mut s = screen(60, 5);
        s.draw_error("Wrong interface e1/99").unwrap();
        let lines = screen_lines(&s);
        assert!(lines[0].starts_with("Wrong interface e1/99"));
        assert!(lines[1].starts_with("press any key"));
    }
}
