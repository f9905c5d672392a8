use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::session::{Phase, SessionSnapshot, STATUS_READY};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Renders one exercise session from its snapshot
pub struct SessionView<'a> {
    pub snapshot: &'a SessionSnapshot,
    pub feed_url: &'a str,
}

impl<'a> SessionView<'a> {
    pub fn new(snapshot: &'a SessionSnapshot, feed_url: &'a str) -> Self {
        Self { snapshot, feed_url }
    }
}

impl Widget for SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let accent = match snapshot.phase {
            Phase::Active => Color::Cyan,
            Phase::Rest => Color::Blue,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // title
                Constraint::Length(2), // feed
                Constraint::Length(3), // set + reps
                Constraint::Length(1), // status
                Constraint::Min(0),    // form corrections
                Constraint::Length(3), // timer
                Constraint::Length(1), // key help
            ])
            .split(area);

        Paragraph::new(snapshot.exercise.title())
            .block(Block::default().borders(Borders::ALL).title("formcoach"))
            .style(Style::default().patch(bold_style).fg(accent))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let mut feed = vec![Line::from(vec![
            Span::styled("Feed: ", dim_style),
            Span::raw(self.feed_url),
        ])];
        if !snapshot.connected {
            feed.push(Line::from(Span::styled(
                "telemetry offline, press c to reconnect",
                Style::default().fg(Color::Yellow),
            )));
        }
        Paragraph::new(feed).render(chunks[1], buf);

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Set {}", snapshot.current_set),
                bold_style,
            )),
            Line::from(vec![
                Span::styled(
                    snapshot.rep_count.to_string(),
                    Style::default().patch(bold_style).fg(accent),
                ),
                Span::raw(" Reps Completed"),
            ]),
        ])
        .render(chunks[2], buf);

        let status_style = if snapshot.status_text == STATUS_READY {
            dim_style
        } else {
            Style::default().fg(accent)
        };
        Paragraph::new(Line::from(vec![
            Span::raw("Status: "),
            Span::styled(snapshot.status_text.as_str(), status_style),
        ]))
        .render(chunks[3], buf);

        if !snapshot.form_tips.is_empty() {
            let warn = Style::default().fg(Color::Red);
            let mut lines = vec![Line::from(Span::styled(
                "Form Corrections:",
                warn.add_modifier(Modifier::BOLD),
            ))];
            lines.extend(
                snapshot
                    .form_tips
                    .iter()
                    .map(|tip| Line::from(Span::styled(format!("  ! {tip}"), warn))),
            );
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(chunks[4], buf);
        }

        let timer = snapshot.timer;
        let title = match snapshot.phase {
            Phase::Active => "Workout Timer",
            Phase::Rest => "Rest Period",
        };
        let label = if timer.running {
            timer.clock()
        } else {
            format!("{} (paused)", timer.clock())
        };
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(Style::default().fg(accent))
            .ratio(timer.progress().clamp(0.0, 1.0))
            .label(label)
            .render(chunks[5], buf);

        Paragraph::new(Span::styled(
            "space start/pause · r reset · c reconnect · q quit",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
    }
}
