use std::f64::consts::TAU;
use std::io;
use std::time::Duration;

use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};

use crate::team_stats::ScoringExtremes;

pub const PIE_TITLE: &str = "Win vs Loss Probability for 1st Half Leaders";
pub const BAR_TITLE: &str = "Comparison of Total Points: Fewest vs. Most";

const WIN_COLOR: Color = Color::Blue;
const LOSS_COLOR: Color = Color::Rgb(255, 140, 0);

#[derive(Debug, Clone)]
pub struct ChartView {
    pub win_p: f64,
    pub loss_p: f64,
    pub extremes: Option<ScoringExtremes>,
    pub headline: String,
}

#[derive(Debug, Clone, Default)]
pub struct PieFill {
    pub win: Vec<(f64, f64)>,
    pub loss: Vec<(f64, f64)>,
}

/// Sample the unit disc and split it into the win and loss wedges.
///
/// Wedges start on the positive x axis and sweep counter-clockwise, win first.
pub fn pie_fill(win_p: f64, steps: usize) -> PieFill {
    let mut fill = PieFill::default();
    if steps == 0 {
        return fill;
    }
    let win_p = win_p.clamp(0.0, 1.0);
    let step = 2.0 / steps as f64;
    for i in 0..=steps {
        let x = -1.0 + i as f64 * step;
        for j in 0..=steps {
            let y = -1.0 + j as f64 * step;
            if x * x + y * y > 1.0 {
                continue;
            }
            let angle = y.atan2(x).rem_euclid(TAU);
            if angle < win_p * TAU {
                fill.win.push((x, y));
            } else {
                fill.loss.push((x, y));
            }
        }
    }
    fill
}

/// Where a wedge's percentage label sits: mid-angle, 0.6 of the radius.
pub fn wedge_label_anchor(start_frac: f64, frac: f64) -> (f64, f64) {
    let mid = (start_frac + frac / 2.0) * TAU;
    (0.6 * mid.cos(), 0.6 * mid.sin())
}

pub fn format_pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

pub fn bar_labels(extremes: &ScoringExtremes) -> [String; 2] {
    [
        format!("Fewest Points - {}", extremes.fewest.team_name),
        format!("Most Points - {}", extremes.most.team_name),
    ]
}

/// Display both charts until the user presses `q`, `Esc` or `Enter`.
pub fn show_charts(view: &ChartView) -> io::Result<()> {
    with_restore(enable_raw_mode, restore_terminal, || {
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
        let mut terminal = ratatui::Terminal::new(backend)?;
        run_charts(&mut terminal, view)
    })
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

struct RestoreOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

/// Run `body` after `enter` succeeds; `restore` runs on every exit from
/// `body`, including errors and panics.
fn with_restore<T>(
    enter: impl FnOnce() -> io::Result<()>,
    restore: impl FnMut(),
    body: impl FnOnce() -> io::Result<T>,
) -> io::Result<T> {
    enter()?;
    let _guard = RestoreOnDrop(restore);
    body()
}

fn run_charts<B: Backend>(terminal: &mut Terminal<B>, view: &ChartView) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, view))?;
        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter)
        {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, view: &ChartView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(format!("NCAA HALF-TIME LEADS\n{}", view.headline))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_pie(frame, body[0], view);
    render_bars(frame, body[1], view);

    let footer = Paragraph::new("q/Esc Quit").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

fn render_pie(frame: &mut Frame, area: Rect, view: &ChartView) {
    let block = Block::default().title(PIE_TITLE).borders(Borders::ALL);
    let inner = block.inner(area);
    if inner.width == 0 || inner.height == 0 {
        frame.render_widget(block, area);
        return;
    }

    // Terminal cells are about twice as tall as wide; widen x to keep it round.
    let y_half = 1.35;
    let x_half = y_half * inner.width as f64 / (2.0 * inner.height as f64);
    let fill = pie_fill(view.win_p, 120);
    let win_anchor = wedge_label_anchor(0.0, view.win_p);
    let loss_anchor = wedge_label_anchor(view.win_p, view.loss_p);
    let pct_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-x_half, x_half])
        .y_bounds([-y_half, y_half])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &fill.win,
                color: WIN_COLOR,
            });
            ctx.draw(&Points {
                coords: &fill.loss,
                color: LOSS_COLOR,
            });
            ctx.layer();
            let wedges = [
                ("Win", view.win_p, win_anchor, WIN_COLOR),
                ("Loss", view.loss_p, loss_anchor, LOSS_COLOR),
            ];
            for (name, p, (x, y), color) in wedges {
                if p <= 0.0 {
                    continue;
                }
                ctx.print(x, y, Span::styled(format_pct(p), pct_style));
                ctx.print(x * 1.9, y * 1.9, Span::styled(name, Style::default().fg(color)));
            }
        });
    frame.render_widget(canvas, area);
}

fn render_bars(frame: &mut Frame, area: Rect, view: &ChartView) {
    let block = Block::default().title(BAR_TITLE).borders(Borders::ALL);
    let Some(extremes) = &view.extremes else {
        let empty = Paragraph::new("No team totals").block(block);
        frame.render_widget(empty, area);
        return;
    };

    let [fewest_label, most_label] = bar_labels(extremes);
    let fewest = Bar::default()
        .value(extremes.fewest.total_points.max(0.0).round() as u64)
        .label(Line::from(fewest_label))
        .text_value(format!("{:.0}", extremes.fewest.total_points))
        .style(Style::default().fg(Color::Red));
    let most = Bar::default()
        .value(extremes.most.total_points.max(0.0).round() as u64)
        .label(Line::from(most_label))
        .text_value(format!("{:.0}", extremes.most.total_points))
        .style(Style::default().fg(Color::Green));

    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / 3).max(1);
    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&[fewest, most]))
        .bar_width(bar_width)
        .bar_gap(bar_width / 2)
        .value_style(Style::default().fg(Color::Black).bg(Color::White));
    frame.render_widget(chart, area);
}
