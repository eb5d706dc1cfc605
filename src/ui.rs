use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use storerate::column::{Cell, Tone};
use storerate::domain::AppConfig;
use storerate::rating::{MAX_RATING, MIN_RATING, stars};

use crate::inputter::InputResult;
use crate::model::{DashboardData, Model, RatingPanel, TAB_TITLES, TableData};

pub const TABS_HEIGHT: usize = 3;
pub const STATUSLINE_HEIGHT: usize = 1;
// Borders plus header row
pub const TABLE_CHROME_HEIGHT: usize = 3;

const DISTRIBUTION_BAR_WIDTH: usize = 20;

pub struct TableUI {
    max_column_width: usize,
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Neutral => Style::default(),
        Tone::Primary => Style::default().fg(Color::Cyan),
        Tone::Accent => Style::default().fg(Color::Magenta),
        Tone::Destructive => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn cell_span(cell: &Cell) -> Span<'static> {
    match cell {
        Cell::Stars { .. } => Span::styled(cell.text(), Style::default().fg(Color::Yellow)),
        _ => Span::styled(cell.text(), tone_style(cell.tone())),
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

impl TableUI {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            max_column_width: cfg.max_column_width,
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [tabs_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(TABS_HEIGHT as u16),
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        self.draw_tabs(frame, tabs_area, uidata.selected_tab);
        if let Some(table) = &uidata.table {
            self.draw_table(frame, main_area, table);
        }
        if let Some(dashboard) = &uidata.dashboard {
            self.draw_dashboard(frame, main_area, dashboard);
        }

        match &uidata.cmdinput {
            Some(input) => self.draw_cmdinput(frame, status_area, input, &uidata.cmd_prompt),
            None => self.draw_statusline(frame, status_area, &uidata.status_message),
        }

        if let Some(panel) = &uidata.rating {
            self.draw_rating_popup(frame, main_area, panel);
        }
        if let Some(help) = uidata.popup {
            self.draw_help_popup(frame, main_area, help);
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect, selected: usize) {
        let tabs = Tabs::new(TAB_TITLES)
            .block(Block::bordered().title(" Store Ratings "))
            .select(selected)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn column_widths(&self, data: &TableData) -> Vec<Constraint> {
        (0..data.headers.len())
            .map(|c| {
                let widest = data
                    .rows
                    .iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.text().chars().count())
                    .chain(std::iter::once(data.headers[c].chars().count()))
                    .max()
                    .unwrap_or(0);
                Constraint::Length(widest.min(self.max_column_width) as u16)
            })
            .collect()
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, data: &TableData) {
        let mut title = format!(" {} ", data.title);
        if !data.search.is_empty() {
            title.push_str(&format!("[search: {}] ", data.search));
        }
        for (label, term) in data.field_terms.iter() {
            title.push_str(&format!("[{label}: {term}] "));
        }
        if let Some(filter) = &data.filter_label {
            title.push_str(&format!("[{filter}] "));
        }
        let summary = data.filtered_summary.as_ref().unwrap_or(&data.summary);
        let mut bottom: Vec<Span> = vec![format!(" {summary} ").into()];
        if data.filtered_summary.is_some() {
            bottom.push("[c]lear filters ".magenta());
        }
        bottom.push(format!("{} ", data.actions).blue());
        let position = if data.nrows > 0 {
            format!(" Row {}/{} ", data.abs_selected_row + 1, data.nrows)
        } else {
            String::new()
        };
        let block = Block::bordered()
            .title(Line::from(title.bold()))
            .title_bottom(Line::from(bottom))
            .title_bottom(Line::from(position).right_aligned())
            .border_set(border::ROUNDED);

        if data.no_data {
            let empty = Paragraph::new("No data found").centered().block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(data.headers.iter().enumerate().map(|(idx, h)| {
            let style = if idx == data.selected_column {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            };
            Span::styled(h.clone(), style)
        }));
        let rows = data
            .rows
            .iter()
            .map(|row| Row::new(row.iter().map(cell_span)));

        let table = Table::new(rows, self.column_widths(data))
            .header(header)
            .block(block)
            .column_spacing(2)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = TableState::default().with_selected(Some(data.selected_row));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn distribution_lines(data: &DashboardData) -> Vec<Line<'static>> {
        data.summary
            .distribution
            .iter_desc()
            .map(|(bucket, count)| {
                let pct = data.summary.percentage(bucket);
                let filled = ((pct / 100.0) * DISTRIBUTION_BAR_WIDTH as f64).round() as usize;
                Line::from(vec![
                    format!("{bucket} ★ ").yellow(),
                    "█".repeat(filled).yellow(),
                    "░".repeat(DISTRIBUTION_BAR_WIDTH - filled).dark_gray(),
                    format!(" {count:>3}  {pct:>5.1}%").into(),
                ])
            })
            .collect()
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let [top, reviews, platform] = Layout::vertical([
            Constraint::Length(MAX_RATING as u16 + 4),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .areas(area);
        let [overview, distribution] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(top);

        let summary = &data.summary;
        let overview_text = Text::from(vec![
            Line::from(data.store_name.clone().bold()),
            Line::from(""),
            Line::from(vec![
                summary.display_average().bold(),
                "  ".into(),
                stars(summary.average).yellow(),
            ]),
            Line::from(format!("{} ratings", summary.total)),
        ]);
        frame.render_widget(
            Paragraph::new(overview_text).block(Block::bordered().title(" Average Rating ")),
            overview,
        );
        frame.render_widget(
            Paragraph::new(Self::distribution_lines(data))
                .block(Block::bordered().title(" Rating Distribution ")),
            distribution,
        );

        let mut lines = Vec::new();
        for review in data.recent.iter() {
            lines.push(Line::from(vec![
                format!("[{}] ", review.initials).cyan().bold(),
                review.author.clone().bold(),
                "  ".into(),
                stars(review.value as f64).yellow(),
                format!("  {}", review.date).dark_gray(),
            ]));
            if let Some(comment) = &review.comment {
                lines.push(Line::from(format!("     {comment}")));
            }
        }
        if lines.is_empty() {
            lines.push(Line::from("No reviews yet".italic()));
        }
        let mut block = Block::bordered().title(" Recent Reviews ");
        if let Some(note) = &data.recent_note {
            block = block.title_bottom(format!(" {note} "));
        }
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            reviews,
        );

        let stats = &data.stats;
        let platform_line = Line::from(format!(
            " Users: {}   Stores: {}   Ratings: {}   Average: {:.1}",
            stats.total_users, stats.total_stores, stats.total_ratings, stats.average
        ));
        frame.render_widget(
            Paragraph::new(platform_line).block(Block::bordered().title(" Platform ")),
            platform,
        );
    }

    fn draw_statusline(&self, frame: &mut Frame, area: Rect, message: &str) {
        frame.render_widget(Paragraph::new(message.to_string()).dark_gray(), area);
    }

    fn draw_cmdinput(&self, frame: &mut Frame, area: Rect, input: &InputResult, prompt: &str) {
        frame.render_widget(Paragraph::new(format!("{prompt}{}", input.input)), area);
        let x = area.x + (prompt.chars().count() + input.curser_pos) as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }

    fn draw_rating_popup(&self, frame: &mut Frame, area: Rect, panel: &RatingPanel) {
        let popup = centered_rect(area, 44, 8);
        let strip: Vec<Span> = (MIN_RATING..=MAX_RATING)
            .map(|i| {
                if i <= panel.shown {
                    "★ ".yellow().bold()
                } else {
                    "☆ ".dark_gray()
                }
            })
            .collect();
        let mut lines = vec![Line::from(panel.store_name.clone().bold()), Line::from(strip)];
        if let Some(badge) = &panel.committed_badge {
            lines.push(Line::from(format!("Your rating: {badge}").cyan()));
        }
        lines.push(Line::from(""));
        let submit = if panel.can_submit {
            "<Enter> submit".green()
        } else {
            "<Enter> submit".dark_gray()
        };
        lines.push(Line::from(vec!["<1-5> stars  ".into(), submit, "  <Esc> cancel".into()]));

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).centered().block(
                Block::bordered()
                    .title(format!(" {} ", panel.prompt))
                    .border_set(border::THICK),
            ),
            popup,
        );
    }

    fn draw_help_popup(&self, frame: &mut Frame, area: Rect, help: &str) {
        let height = help.lines().count() as u16 + 2;
        let popup = centered_rect(area, 60, height);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(help.to_string()).block(Block::bordered().title(" Help ")),
            popup,
        );
    }
}
