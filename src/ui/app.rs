use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;
use tracing::{info, warn};

use crate::controller::{LoadOutcome, LoadRequest, TableController};
use crate::error::FetchError;
use crate::models::{Artwork, ArtworkPage};

use super::forms::{ConfirmClearAll, PageForm};
use super::helpers::{
    centered_rect, number_cell, record_range, single_line, surface_error, text_cell,
};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the title block above the table.
const HEADER_HEIGHT: u16 = 4;
/// Share of the body width given to the table; the selection panel gets the rest.
const TABLE_PERCENT: u16 = 70;
/// Rows skipped by PageUp/PageDown inside a list.
const CURSOR_JUMP: isize = 5;

/// Which list receives cursor keys.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    Table,
    Panel,
}

/// Fine-grained modes layered over the main view.
enum Mode {
    Normal,
    GoToPage(PageForm),
    ConfirmClearAll(ConfirmClearAll),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the TUI. Page data and selections live in
/// the [`TableController`]; this type adds cursors, modals and the queue of
/// page loads the event loop still has to start.
pub struct App {
    controller: TableController,
    rows_options: Vec<u32>,
    table_cursor: usize,
    panel_cursor: usize,
    focus: Focus,
    mode: Mode,
    status: Option<StatusMessage>,
    pending_load: Option<LoadRequest>,
}

impl App {
    /// Wrap `controller` and queue the first page load.
    pub fn new(mut controller: TableController, rows_options: Vec<u32>) -> Self {
        let first_load = controller.begin_load();
        Self {
            controller,
            rows_options,
            table_cursor: 0,
            panel_cursor: 0,
            focus: Focus::Table,
            mode: Mode::Normal,
            status: None,
            pending_load: Some(first_load),
        }
    }

    pub fn controller(&self) -> &TableController {
        &self.controller
    }

    /// Hand the most recent unstarted page load to the caller. Older requests
    /// that were never started are superseded and simply dropped.
    pub fn take_load_request(&mut self) -> Option<LoadRequest> {
        self.pending_load.take()
    }

    /// Feed a finished fetch back into the table.
    pub fn apply_load(&mut self, seq: u64, result: Result<ArtworkPage, FetchError>) {
        match self.controller.apply_load(seq, result) {
            LoadOutcome::Loaded => {
                if matches!(self.status, Some(StatusMessage { kind: StatusKind::Error, .. })) {
                    self.clear_status();
                }
                self.clamp_table_cursor();
            }
            LoadOutcome::Failed => {
                let reason = self
                    .controller
                    .last_error()
                    .unwrap_or("unknown error")
                    .to_string();
                self.set_status(format!("Failed to load page: {reason}"), StatusKind::Error);
                self.table_cursor = 0;
            }
            LoadOutcome::Stale => {}
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::GoToPage(form) => self.handle_go_to_page(code, form)?,
            Mode::ConfirmClearAll(confirm) => self.handle_confirm_clear_all(code, confirm)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-CURSOR_JUMP),
            KeyCode::PageDown => self.move_cursor(CURSOR_JUMP),
            KeyCode::Left | KeyCode::Char('p') => {
                let request = self.controller.previous_page();
                self.queue_navigation(request, "Already on the first page.");
            }
            KeyCode::Right | KeyCode::Char('n') => {
                let request = self.controller.next_page();
                self.queue_navigation(request, "Already on the last page.");
            }
            KeyCode::Home => {
                let request = self.controller.first_page();
                self.queue_navigation(request, "Already on the first page.");
            }
            KeyCode::End => {
                let request = self.controller.last_page();
                self.queue_navigation(request, "Already on the last page.");
            }
            KeyCode::Char('r') => self.cycle_rows_per_page(),
            KeyCode::Char('R') => {
                let request = self.controller.reload();
                self.queue_load(request);
                self.set_status(
                    format!("Reloading page {}.", request.page),
                    StatusKind::Info,
                );
            }
            KeyCode::Char('g') => {
                self.clear_status();
                return Ok(Mode::GoToPage(PageForm::with_max(
                    self.controller.page_count(),
                )));
            }
            KeyCode::Char(' ') => match self.focus {
                Focus::Table => self.toggle_current_row(),
                Focus::Panel => self.deselect_panel_item(),
            },
            KeyCode::Char('a') => self.toggle_all_rows(),
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => match self.focus {
                Focus::Table => self.deselect_current_row(),
                Focus::Panel => self.deselect_panel_item(),
            },
            KeyCode::Char('c') => {
                let count = self.controller.selected_count();
                if count == 0 {
                    self.set_status("Nothing is selected.", StatusKind::Info);
                } else {
                    self.clear_status();
                    return Ok(Mode::ConfirmClearAll(ConfirmClearAll { count }));
                }
            }
            KeyCode::Enter | KeyCode::Char('o') => self.open_focused_artwork(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_go_to_page(&mut self, code: KeyCode, mut form: PageForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Go to page cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_page() {
                Ok(page) => {
                    let request = self.controller.go_to_page(page);
                    self.queue_load(request);
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::GoToPage(form))
    }

    fn handle_confirm_clear_all(
        &mut self,
        code: KeyCode,
        confirm: ConfirmClearAll,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.controller.clear_all();
                self.panel_cursor = 0;
                self.set_status(
                    format!("Cleared {} selected items.", confirm.count),
                    StatusKind::Info,
                );
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Selections kept.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmClearAll(confirm)),
        }
    }

    /// Check or uncheck the row under the cursor. The table reports the whole
    /// set of checked rows on the page, as a checkbox column would.
    fn toggle_current_row(&mut self) {
        let Some(row) = self.current_row().cloned() else {
            self.set_status("No row to select.", StatusKind::Error);
            return;
        };

        let mut selection = self.controller.current_page_selection().to_vec();
        if let Some(position) = selection.iter().position(|art| art.id == row.id) {
            selection.remove(position);
        } else {
            selection.push(row);
        }
        self.controller.selection_change(&selection);
        self.clamp_panel_cursor();
        self.clear_status();
    }

    /// Header checkbox: check every row, or uncheck them all when they
    /// already are.
    fn toggle_all_rows(&mut self) {
        let visible = self.controller.visible_rows();
        if visible.is_empty() {
            self.set_status("No rows on this page.", StatusKind::Error);
            return;
        }

        let all_checked = visible.len() == self.controller.current_page_selection().len();
        let selection = if all_checked {
            Vec::new()
        } else {
            visible.to_vec()
        };
        self.controller.selection_change(&selection);
        self.clamp_panel_cursor();
        self.clear_status();
    }

    fn deselect_current_row(&mut self) {
        let Some(id) = self.current_row().map(|art| art.id) else {
            return;
        };
        if self.controller.deselect(id).is_some() {
            self.clamp_panel_cursor();
        }
    }

    fn deselect_panel_item(&mut self) {
        let Some(art) = self
            .controller
            .registry()
            .get_index(self.panel_cursor)
            .cloned()
        else {
            self.set_status("No selected item to remove.", StatusKind::Error);
            return;
        };

        self.controller.deselect(art.id);
        self.clamp_panel_cursor();
        self.set_status(format!("Removed {}.", art.display_title()), StatusKind::Info);
    }

    fn open_focused_artwork(&mut self) {
        let target = match self.focus {
            Focus::Table => self.current_row().cloned(),
            Focus::Panel => self
                .controller
                .registry()
                .get_index(self.panel_cursor)
                .cloned(),
        };
        let Some(art) = target else {
            self.set_status("Nothing to open.", StatusKind::Error);
            return;
        };

        let url = art.web_url();
        match open_link(&url) {
            Ok(()) => {
                info!(id = art.id, %url, "opened artwork page");
                self.set_status(format!("Opened {}.", art.display_title()), StatusKind::Info);
            }
            Err(err) => {
                warn!(id = art.id, %url, error = %err, "failed to open artwork page");
                self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
            }
        }
    }

    /// Step through the configured page sizes, wrapping at the end.
    fn cycle_rows_per_page(&mut self) {
        if self.rows_options.is_empty() {
            return;
        }
        let current = self.controller.rows_per_page();
        let next = self
            .rows_options
            .iter()
            .copied()
            .find(|rows| *rows > current)
            .unwrap_or(self.rows_options[0]);
        let request = self.controller.change_rows_per_page(next);
        self.queue_load(request);
        self.set_status(format!("Showing {next} rows per page."), StatusKind::Info);
    }

    fn queue_navigation(&mut self, request: Option<LoadRequest>, boundary_message: &str) {
        match request {
            Some(request) => {
                self.clear_status();
                self.queue_load(request);
            }
            None => self.set_status(boundary_message, StatusKind::Info),
        }
    }

    fn queue_load(&mut self, request: LoadRequest) {
        self.table_cursor = 0;
        self.pending_load = Some(request);
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Table => Focus::Panel,
            Focus::Panel => Focus::Table,
        };
        self.clamp_panel_cursor();
    }

    fn move_cursor(&mut self, offset: isize) {
        let (cursor, len) = match self.focus {
            Focus::Table => (&mut self.table_cursor, self.controller.visible_rows().len()),
            Focus::Panel => (&mut self.panel_cursor, self.controller.selected_count()),
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        let target = (*cursor as isize + offset).clamp(0, len as isize - 1);
        *cursor = target as usize;
    }

    fn current_row(&self) -> Option<&Artwork> {
        self.controller.visible_rows().get(self.table_cursor)
    }

    fn clamp_table_cursor(&mut self) {
        let len = self.controller.visible_rows().len();
        self.table_cursor = self.table_cursor.min(len.saturating_sub(1));
    }

    fn clamp_panel_cursor(&mut self) {
        let len = self.controller.selected_count();
        self.panel_cursor = self.panel_cursor.min(len.saturating_sub(1));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(content_area);
        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(TABLE_PERCENT),
                Constraint::Percentage(100 - TABLE_PERCENT),
            ])
            .split(chunks[1]);
        self.draw_table(frame, body[0]);
        self.draw_selection_panel(frame, body[1]);
        self.draw_paginator(frame, chunks[2]);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::GoToPage(form) => self.draw_page_form(frame, area, form),
            Mode::ConfirmClearAll(confirm) => self.draw_confirm_clear_all(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let header = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(
                    "Art Institute - Artworks",
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled(
                    format!("Total selected: {}", self.controller.selected_count()),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(Span::styled(
                "Fields: title, place_of_origin, artist_display, inscriptions, date_start, date_end",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let title = if self.controller.is_loading() {
            format!("Artworks • page {} • loading…", self.controller.page())
        } else {
            format!("Artworks • page {}", self.controller.page())
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.focus_style(Focus::Table));

        let rows = self.controller.visible_rows();
        if rows.is_empty() {
            let text = if self.controller.is_loading() {
                "Loading…"
            } else {
                "No records found for this page."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let table_rows = rows.iter().map(|art| {
            let checkbox = if self.controller.is_selected(art.id) {
                "[x]"
            } else {
                "[ ]"
            };
            Row::new(vec![
                Cell::from(checkbox),
                Cell::from(text_cell(art.title.as_deref())),
                Cell::from(text_cell(art.place_of_origin.as_deref())),
                Cell::from(text_cell(art.artist_display.as_deref())),
                Cell::from(text_cell(art.inscriptions.as_deref())),
                Cell::from(number_cell(art.date_start)),
                Cell::from(number_cell(art.date_end)),
            ])
        });

        let table = Table::new(
            table_rows,
            [
                Constraint::Length(3),
                Constraint::Percentage(22),
                Constraint::Percentage(13),
                Constraint::Percentage(30),
                Constraint::Percentage(15),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        )
        .header(
            Row::new(vec![
                "",
                "Title",
                "Place of Origin",
                "Artist Display",
                "Inscriptions",
                "Date Start",
                "Date End",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(if self.focus == Focus::Table {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        })
        .highlight_symbol("▶ ")
        .column_spacing(1)
        .block(block);

        let mut state = TableState::default().with_selected(Some(self.table_cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_selection_panel(&self, frame: &mut Frame, area: Rect) {
        let registry = self.controller.registry();
        let block = Block::default()
            .title(format!("Selected Items ({})", registry.len()))
            .title_bottom("Selections persist across pages")
            .borders(Borders::ALL)
            .border_style(self.focus_style(Focus::Panel));

        if registry.is_empty() {
            let message = Paragraph::new("No items selected yet.")
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = registry
            .iter()
            .map(|art| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        art.display_title(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        art.place_of_origin
                            .as_deref()
                            .map(single_line)
                            .unwrap_or_default(),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(if self.focus == Focus::Panel {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            })
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.panel_cursor));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_paginator(&self, frame: &mut Frame, area: Rect) {
        let controller = &self.controller;
        let range = match record_range(
            controller.first_record_offset(),
            controller.visible_rows().len(),
        ) {
            Some((first, last)) => {
                format!("{first}-{last} of {}", controller.total_records())
            }
            None => "no records".to_string(),
        };
        let options = self
            .rows_options
            .iter()
            .map(|rows| {
                if *rows == controller.rows_per_page() {
                    format!("[{rows}]")
                } else {
                    rows.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let line = Line::from(vec![
            Span::styled(
                format!("Page {} of {}", controller.page(), controller.page_count()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("   {range}   Rows per page: {options}")),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let toggle_label = match self.focus {
            Focus::Table => " Toggle   ",
            Focus::Panel => " Remove   ",
        };
        Line::from(vec![
            Span::styled("[↑↓]", key_style),
            Span::raw(" Move   "),
            Span::styled("[Space]", key_style),
            Span::raw(toggle_label),
            Span::styled("[a]", key_style),
            Span::raw(" All   "),
            Span::styled("[←→]", key_style),
            Span::raw(" Page   "),
            Span::styled("[g]", key_style),
            Span::raw(" Go To   "),
            Span::styled("[r]", key_style),
            Span::raw(" Rows   "),
            Span::styled("[R]", key_style),
            Span::raw(" Reload   "),
            Span::styled("[Tab]", key_style),
            Span::raw(" Panel   "),
            Span::styled("[c]", key_style),
            Span::raw(" Clear All   "),
            Span::styled("[Enter]", key_style),
            Span::raw(" Open   "),
            Span::styled("[q]", key_style),
            Span::raw(" Quit"),
        ])
    }

    fn draw_page_form(&self, frame: &mut Frame, area: Rect, form: &PageForm) {
        let popup_area = centered_rect(40, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Go To Page").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to jump • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = "Page: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
    }

    fn draw_confirm_clear_all(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmClearAll) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Clear All").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Remove all {} selected items across every page?",
                confirm.count
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn focus_style(&self, target: Focus) -> Style {
        if self.focus == target {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }
}
