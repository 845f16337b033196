//! TUI rendering logic for the feed viewer.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Wrap};
use zenfeeds_feed::{FeedViewState, LoadPhase};

use super::state::{InputMode, ViewerState};
use crate::render::{add_channel_hint, published_label};

/// Draws the feed viewer UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, feed: &FeedViewState, viewer: &mut ViewerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(5),    // main content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], feed);

    match feed.phase() {
        LoadPhase::InitialLoad | LoadPhase::LoadingVideos => {
            draw_loading(frame, chunks[1], feed, viewer);
        }
        LoadPhase::NoChannels => draw_empty_feed(frame, chunks[1], feed),
        LoadPhase::VideosReady => draw_video_list(frame, chunks[1], feed, viewer),
    }

    draw_footer(frame, chunks[2], viewer);
}

/// Draws the header with the feed name and channel count.
fn draw_header(frame: &mut Frame, area: Rect, feed: &FeedViewState) {
    let summary = match feed.phase() {
        LoadPhase::InitialLoad => String::new(),
        LoadPhase::NoChannels => String::from("0 channels"),
        LoadPhase::LoadingVideos => format!("{} channels", feed.channels().len()),
        LoadPhase::VideosReady => format!(
            "{} channels  {} videos",
            feed.channels().len(),
            feed.videos().len()
        ),
    };

    let header = Paragraph::new(Line::from(summary)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", feed.feed_name()))
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .title(
                Line::from(" a: add  e: rename  i: image  d: delete  q: back ").right_aligned(),
            ),
    );
    frame.render_widget(header, area);
}

/// Draws the spinner shown while a pass is running.
fn draw_loading(frame: &mut Frame, area: Rect, feed: &FeedViewState, viewer: &ViewerState) {
    let label = if feed.phase() == LoadPhase::InitialLoad {
        "Loading feed..."
    } else {
        "Loading videos..."
    };
    let spinner = Paragraph::new(format!("{} {label}", viewer.spinner_frame()))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Videos "));
    frame.render_widget(spinner, area);
}

/// Draws the call to action for a feed without channels.
fn draw_empty_feed(frame: &mut Frame, area: Rect, feed: &FeedViewState) {
    let body = Paragraph::new(add_channel_hint(feed.feed_name()))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Videos "));
    frame.render_widget(body, area);
}

/// Draws the newest-first video list.
fn draw_video_list(frame: &mut Frame, area: Rect, feed: &FeedViewState, viewer: &mut ViewerState) {
    let videos = feed.videos();
    if videos.is_empty() {
        let body = Paragraph::new("No videos found.")
            .block(Block::default().borders(Borders::ALL).title(" Videos "));
        frame.render_widget(body, area);
        return;
    }

    let header = Row::new(vec!["Published", "Channel", "Title"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = videos
        .iter()
        .map(|v| {
            Row::new(vec![
                published_label(v),
                String::from(v.channel_title()),
                String::from(v.video.title()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(17), // Published
        Constraint::Length(24), // Channel
        Constraint::Min(20),    // Title
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Videos "))
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, &mut viewer.table_state);
}

/// Draws the footer with key hints, or the current prompt.
fn draw_footer(frame: &mut Frame, area: Rect, viewer: &ViewerState) {
    if let InputMode::Prompt(kind) = viewer.input_mode {
        let prompt = Paragraph::new(Line::from(format!("{}: {}_", kind.label(), viewer.input)))
            .style(Style::default().fg(Color::Cyan))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Enter: save  Esc: cancel "),
            );
        frame.render_widget(prompt, area);
        return;
    }

    let (text, style) = match viewer.status() {
        Some(status) if viewer.is_confirming_delete() => {
            (status, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        }
        Some(status) => (status, Style::default().fg(Color::Yellow)),
        None => (
            "\u{2191}\u{2193}/j/k: move  o/Enter: open  r: refresh",
            Style::default(),
        ),
    };

    let footer = Paragraph::new(Line::from(text))
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
