use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use lumiishift_core::{Effect, MoodEntry, ThemeColor};
use crate::app::{ActiveEffect, App, InputMode, GRID_COLUMNS};

/// Rows of terminal per mood button.
const CELL_HEIGHT: u16 = 3;

fn theme(color: ThemeColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Readable text color on top of a theme color.
fn contrast(color: ThemeColor) -> Color {
    if color.is_light() {
        Color::Black
    } else {
        Color::White
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let grid_height = app.grid_rows() as u16 * CELL_HEIGHT + 2;

    // Main layout: header, tagline, grid, mood, reply, footer
    let [header_area, tagline_area, grid_area, mood_area, reply_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(grid_height),
        Constraint::Length(5),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    frame.render_widget(
        Paragraph::new("Click your mood to see a personalized response and color experience!")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center),
        tagline_area,
    );
    render_grid(app, frame, grid_area);
    render_mood(app, frame, mood_area);
    render_reply(app, frame, reply_area);
    render_footer(app, frame, footer_area);

    if let Some(effect) = app.effect {
        let effect_area = Rect::new(
            mood_area.x,
            mood_area.y,
            mood_area.width,
            mood_area.height + reply_area.height,
        );
        render_effect(effect, frame, effect_area);
    }

    if app.input_mode == InputMode::ApiKey {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let key_indicator = match app.key_source {
        Some(source) => format!(" [key: {}]", source.as_str()),
        None => " [no key]".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" 🌈 LumiiShift ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(key_indicator, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            app.orchestrator.settings().model.clone(),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_grid(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 🎭 Select Your Current Mood ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cell_width = inner.width / GRID_COLUMNS as u16;
    let rows = app.grid_rows() as u16;
    if cell_width == 0 || inner.height < CELL_HEIGHT {
        app.grid_area = None;
        return;
    }
    // Hit-testing uses the same cell arithmetic as drawing
    app.grid_area = Some(Rect::new(
        inner.x,
        inner.y,
        cell_width * GRID_COLUMNS as u16,
        (rows * CELL_HEIGHT).min(inner.height),
    ));

    let selected = app.interaction.selected_mood();
    let pending = app.pending_mood.as_deref();

    for (index, entry) in app.orchestrator.catalog().iter().enumerate() {
        let col = (index % GRID_COLUMNS) as u16;
        let row = (index / GRID_COLUMNS) as u16;
        let y = inner.y + row * CELL_HEIGHT;
        if y + CELL_HEIGHT > inner.y + inner.height {
            break;
        }
        let cell = Rect::new(inner.x + col * cell_width, y, cell_width, CELL_HEIGHT);

        let is_cursor = index == app.grid_cursor && app.input_mode == InputMode::Normal;
        let is_selected = selected == Some(entry.id);
        let is_pending = pending == Some(entry.id);
        render_mood_button(entry, is_cursor, is_selected, is_pending, frame, cell);
    }
}

fn render_mood_button(
    entry: &MoodEntry,
    is_cursor: bool,
    is_selected: bool,
    is_pending: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let color = theme(entry.theme_color);

    let border_style = if is_cursor {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let label_style = if is_selected {
        Style::default().bg(color).fg(contrast(entry.theme_color)).bold()
    } else if is_pending {
        Style::default().fg(color).add_modifier(Modifier::SLOW_BLINK)
    } else {
        Style::default().fg(color)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    let label = Paragraph::new(format!("{} {}", entry.icon, entry.display_name()))
        .style(label_style)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(label, area);
}

fn render_mood(app: &App, frame: &mut Frame, area: Rect) {
    let Some(entry) = app.selected_entry() else {
        let hint = Paragraph::new("Pick a mood above to get started.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(hint, area);
        return;
    };

    let text_color = contrast(entry.theme_color);
    let lines = vec![
        Line::from(Span::styled(
            format!("{} {}", entry.icon, entry.display_name()),
            Style::default().fg(text_color).bold(),
        )),
        Line::from(Span::styled(entry.acknowledgment, Style::default().fg(text_color))),
    ];

    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme(entry.theme_color)))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(text_color)));
    frame.render_widget(panel, area);
}

fn render_reply(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 🤖 LumiiShift Response ");

    let paragraph = if app.is_loading() {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        Paragraph::new(Line::from(Span::styled(
            format!("Getting your personalized LumiiShift response{}", dots),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )))
    } else if app.interaction.selected_mood().is_some() {
        Paragraph::new(app.interaction.last_reply().to_string())
    } else {
        Paragraph::new("Your reply will appear here.").style(Style::default().fg(Color::DarkGray))
    };

    frame.render_widget(paragraph.wrap(Wrap { trim: true }).block(block), area);
}

/// Balloons float up for cheerful moods, snow drifts down for serene ones.
fn render_effect(effect: ActiveEffect, frame: &mut Frame, area: Rect) {
    let (glyph, color) = match effect.kind {
        Effect::Cheerful => ("🎈", Color::LightRed),
        Effect::Serene => ("❄", Color::White),
        Effect::Neutral => return,
    };
    // Leave room for double-width glyphs
    if area.width < 4 || area.height < 2 {
        return;
    }

    let width = area.width - 2;
    let height = area.height;
    let particles = (area.width / 6).max(3);
    let buffer = frame.buffer_mut();

    for i in 0..particles {
        let x = area.x + (i * 37 + 11) % width;
        let offset = (effect.frame + i * 3) % height;
        let y = match effect.kind {
            Effect::Cheerful => area.y + height - 1 - offset,
            _ => area.y + offset,
        };
        buffer.set_string(x, y, glyph, Style::default().fg(color));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal if app.is_loading() => (" WAITING ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::Normal => (" MOODS ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::ApiKey => (" API KEY ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let hints = match app.input_mode {
        InputMode::Normal => vec![
            Span::styled(" ←↓↑→/hjkl ", key_style),
            Span::styled(" move ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" click ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::ApiKey => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" save ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };
    spans.extend(hints);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 64.min(area.width.saturating_sub(4));
    let popup_height = 9;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height.min(area.height));

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Enter your Together.ai API key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    if inner.height < 5 {
        return;
    }

    let instructions = Paragraph::new("Get a key at https://together.ai. Enter to save, Esc to quit.")
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 2));

    // Input field
    let input_area = Rect::new(inner.x, inner.y + 3, inner.width, 1);

    // Mask the key, keeping the last 4 chars visible
    let char_count = app.api_key_input.chars().count();
    let display_text = if char_count <= 4 {
        "*".repeat(char_count)
    } else {
        let masked_len = char_count - 4;
        let last_four: String = app.api_key_input.chars().skip(masked_len).collect();
        format!("{}{}", "*".repeat(masked_len), last_four)
    };
    let visible: String = display_text.chars().take(inner.width as usize).collect();
    frame.render_widget(Paragraph::new(visible).style(Style::default().fg(Color::Cyan)), input_area);

    let cursor_x = app.api_key_input_cursor.min(inner.width.saturating_sub(1) as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let (status_text, status_style) = match &app.api_key_error {
        Some(err) => (err.clone(), Style::default().fg(Color::Red)),
        None => (
            "Tip: put TOGETHER_API_KEY=your_key in a .env file to skip this step.".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(
        Paragraph::new(status_text).style(status_style),
        Rect::new(inner.x, inner.y + 5, inner.width, 1),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumiishift_core::{
        CompletionOutcome, CompletionSettings, Credential, KeySource, MoodCatalog, ResponseOrchestrator,
    };
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        let orchestrator =
            ResponseOrchestrator::new(MoodCatalog::standard(), CompletionSettings::default()).unwrap();
        let credential = Credential::new("token").unwrap();
        App::new(orchestrator, Some((credential, KeySource::Config)))
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for row in buffer.content.chunks(buffer.area.width as usize) {
            for cell in row {
                text.push_str(cell.symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_contrast() {
        assert_eq!(contrast(ThemeColor::rgb(255, 215, 0)), Color::Black);
        assert_eq!(contrast(ThemeColor::rgb(65, 105, 225)), Color::White);
    }

    #[test]
    fn test_render_grid_and_reply() {
        let mut app = app();
        app.apply_outcome("sad", &CompletionOutcome::Success("Sending a warm hug".to_string()));

        let mut terminal = Terminal::new(TestBackend::new(100, 34)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("LumiiShift"));
        assert!(text.contains("Happy"));
        assert!(text.contains("Angry"));
        assert!(text.contains("Sending a warm hug"));
        assert!(text.contains("It's okay to feel sad sometimes."));

        // Hit-testing area follows the drawn grid
        let grid = app.grid_area.unwrap();
        assert_eq!(grid.width, 5 * ((100 - 2) / 5));
        assert_eq!(grid.height, 4 * CELL_HEIGHT);
    }

    #[test]
    fn test_render_api_key_prompt() {
        let orchestrator =
            ResponseOrchestrator::new(MoodCatalog::standard(), CompletionSettings::default()).unwrap();
        let mut app = App::new(orchestrator, None);
        app.api_key_input = "abcdefgh".to_string();
        app.api_key_input_cursor = 8;

        let mut terminal = Terminal::new(TestBackend::new(100, 34)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Enter your Together.ai API key"));
        assert!(text.contains("****efgh"));
        assert!(!text.contains("abcd"));
    }

    #[test]
    fn test_render_survives_tiny_terminal() {
        let mut app = app();
        app.apply_outcome("happy", &CompletionOutcome::Success("Yay".to_string()));
        let mut terminal = Terminal::new(TestBackend::new(12, 6)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
    }
}
