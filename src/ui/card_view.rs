use crate::calc::{
    bar_color, compute_state, format_duration, format_iso_date, progress_percent, status_text,
    DatetimeState,
};
use crate::data::card_config::frequency_field_value;
use crate::data::{CardConfig, HostState, Persistable, TrackedEntity};
use crate::gesture::{HoldActivation, HoldGesture, PointerSignal, Propagation};
use crate::service::{
    reset_date, CommandSink, PendingConfirmation, ResetOutcome, ResetTrigger, ServiceCall,
};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const HOST_REFRESH_INTERVAL: Duration = Duration::from_secs(10);
const TRACK_BG: Color = Color::Rgb(0xa0, 0xde, 0xa0);
const TOGGLES: [&str; 4] = ["Filter overdue", "Show months", "Show next date", "Debug"];

type RowGesture = HoldGesture<Box<dyn FnMut(HoldActivation)>>;

enum Mode {
    Normal,
    /// Date picker for one entity; `buffer` holds the typed `YYYY-MM-DD`.
    EditDate { entity: TrackedEntity, buffer: String },
    Confirm(PendingConfirmation),
}

#[derive(PartialEq, Default)]
enum ViewState {
    #[default]
    Card,
    Editor,
}

#[derive(Clone, Copy, PartialEq)]
enum EditorField {
    Frequency,
    Name,
}

struct VisibleRow {
    entity: TrackedEntity,
    name: String,
    state: DatetimeState,
}

pub struct App<'a> {
    config: &'a mut CardConfig,
    host: HostState,
    sink: &'a mut dyn CommandSink,
    data_dir: PathBuf,
    now: NaiveDateTime,
    mode: Mode,
    view_state: ViewState,
    selected: usize,
    /// One hold recognizer per visible row, indexed like the rows.
    gestures: Vec<RowGesture>,
    /// Entity each gesture was attached for; a changed id drops its press.
    gesture_ids: Vec<String>,
    hold_tx: Sender<usize>,
    hold_rx: Receiver<usize>,
    /// Screen area of each rendered row, from the last render.
    row_areas: Vec<Rect>,
    /// Row under the last mouse-down, for click detection.
    pressed_row: Option<usize>,
    /// Feedback line (message, color). Cleared on the next keypress.
    status: Option<(String, Color)>,
    list_cursor: usize,
    edit_field: Option<EditorField>,
    input_buffer: String,
}

impl<'a> App<'a> {
    pub fn new(
        config: &'a mut CardConfig,
        host: HostState,
        sink: &'a mut dyn CommandSink,
        data_dir: PathBuf,
        now: NaiveDateTime,
    ) -> Self {
        let (hold_tx, hold_rx) = channel();
        App {
            config,
            host,
            sink,
            data_dir,
            now,
            mode: Mode::Normal,
            view_state: ViewState::Card,
            selected: 0,
            gestures: Vec::new(),
            gesture_ids: Vec::new(),
            hold_tx,
            hold_rx,
            row_areas: Vec::new(),
            pressed_row: None,
            status: None,
            list_cursor: 0,
            edit_field: None,
            input_buffer: String::new(),
        }
    }

    pub fn set_clock(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    /// Re-reads host state; keeps the old snapshot when the file is unreadable.
    pub fn refresh_host(&mut self) {
        match HostState::load_from(&self.data_dir) {
            Ok(host) => self.host = host,
            Err(e) => warn!(error = %format!("{e:#}"), "host state refresh failed"),
        }
    }

    fn visible_rows(&self) -> Vec<VisibleRow> {
        self.config
            .resolved_entities(&self.host)
            .into_iter()
            .map(|entity| {
                let state = compute_state(
                    self.now,
                    self.host.last_event(&entity.id),
                    entity.frequency_days,
                );
                let name = entity.display_name(&self.host);
                VisibleRow {
                    entity,
                    name,
                    state,
                }
            })
            .filter(|row| !self.config.filter_overdue || row.state.is_overdue)
            .collect()
    }

    fn new_gesture(&self, index: usize) -> RowGesture {
        let tx = self.hold_tx.clone();
        let callback: Box<dyn FnMut(HoldActivation)> = Box::new(move |_| {
            let _ = tx.send(index);
        });
        HoldGesture::new(
            callback,
            Some(Duration::from_millis(self.config.hold_threshold_ms)),
        )
    }

    /// Keeps exactly one gesture per visible row; dropped ones detach. A
    /// gesture whose row now shows another entity is detached so a press in
    /// flight cannot carry over to it.
    fn sync_gestures(&mut self, rows: &[VisibleRow]) {
        self.gestures.truncate(rows.len());
        self.gesture_ids.truncate(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if i == self.gestures.len() {
                let g = self.new_gesture(i);
                self.gestures.push(g);
                self.gesture_ids.push(row.entity.id.clone());
            } else if self.gesture_ids[i] != row.entity.id {
                self.gestures[i].detach();
                self.gesture_ids[i] = row.entity.id.clone();
            }
        }
    }

    fn detach_all(&mut self) {
        for g in &mut self.gestures {
            g.detach();
        }
        self.row_areas.clear();
        self.pressed_row = None;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.gestures.iter().filter_map(|g| g.next_deadline()).min()
    }

    /// Advances hold timers and runs any reset they triggered.
    pub fn tick(&mut self, now: Instant) {
        for g in &mut self.gestures {
            g.tick(now);
        }
        let fired: Vec<usize> = self.hold_rx.try_iter().collect();
        for index in fired {
            self.on_hold(index);
        }
    }

    fn on_hold(&mut self, index: usize) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        let Some(id) = self.gesture_ids.get(index) else {
            return;
        };
        let rows = self.visible_rows();
        let Some((position, row)) = rows.iter().enumerate().find(|(_, r)| &r.entity.id == id)
        else {
            return;
        };
        self.selected = position;
        self.pressed_row = None;
        let skip = self.config.skip_confirmation;
        self.start_reset(row.entity.clone(), ResetTrigger::Hold, skip);
    }

    fn start_reset(&mut self, entity: TrackedEntity, trigger: ResetTrigger, skip: bool) {
        match reset_date(&entity, trigger, &self.host, &mut *self.sink, skip, self.now) {
            ResetOutcome::Dispatched(call) => self.after_dispatch(&call),
            ResetOutcome::AwaitingConfirmation(pending) => self.mode = Mode::Confirm(pending),
        }
    }

    fn after_dispatch(&mut self, call: &ServiceCall) {
        info!(entity_id = %call.data.entity_id, date = %call.data.date, "reset issued");
        self.refresh_host();
        self.status = Some((
            format!("{} set to {}", call.data.entity_id, call.data.date),
            Color::Green,
        ));
    }

    fn open_edit_dialog(&mut self, index: usize) {
        let rows = self.visible_rows();
        if let Some(row) = rows.get(index) {
            self.selected = index;
            self.mode = Mode::EditDate {
                entity: row.entity.clone(),
                buffer: format_iso_date(row.state.last_event_date),
            };
        }
    }

    /// Routes a terminal mouse report through the row hold gestures, then
    /// treats an unswallowed press+release on the same row as a click.
    pub fn handle_mouse(&mut self, kind: MouseEventKind, column: u16, row: u16, now: Instant) {
        let Some(signal) = PointerSignal::from_mouse(kind) else {
            return;
        };
        if self.view_state != ViewState::Card || !matches!(self.mode, Mode::Normal) {
            return;
        }
        let position = Position::new(column, row);

        let mut propagation = Propagation::Continue;
        for g in &mut self.gestures {
            if g.handle(signal, position, now) == Propagation::Stop {
                propagation = Propagation::Stop;
            }
        }

        let hit = self.row_areas.iter().position(|r| r.contains(position));
        match signal {
            PointerSignal::MouseDown => {
                self.pressed_row = hit;
                if let Some(i) = hit {
                    self.selected = i;
                }
            }
            PointerSignal::MouseUp => {
                let pressed = self.pressed_row.take();
                if propagation == Propagation::Continue {
                    if let (Some(i), Some(p)) = (hit, pressed) {
                        if i == p {
                            self.open_edit_dialog(i);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.view_state == ViewState::Editor {
            self.handle_editor_key(code);
            return false;
        }

        match self.mode {
            Mode::EditDate { .. } => {
                self.handle_edit_date_key(code);
                false
            }
            Mode::Confirm(_) => {
                self.handle_confirm_key(code);
                false
            }
            Mode::Normal => {
                self.status = None;
                let count = self.visible_rows().len();
                match code {
                    KeyCode::Up => {
                        self.selected = self.selected.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        if self.selected + 1 < count {
                            self.selected += 1;
                        }
                    }
                    KeyCode::Enter => {
                        self.open_edit_dialog(self.selected);
                    }
                    KeyCode::Char('r') => {
                        let rows = self.visible_rows();
                        if let Some(row) = rows.get(self.selected) {
                            let skip = self.config.skip_confirmation;
                            self.start_reset(row.entity.clone(), ResetTrigger::Hold, skip);
                        }
                    }
                    KeyCode::Char('o') => {
                        self.detach_all();
                        self.view_state = ViewState::Editor;
                        self.list_cursor = 0;
                        self.edit_field = None;
                        self.input_buffer.clear();
                    }
                    KeyCode::Char('l') => {
                        self.refresh_host();
                        self.status = Some(("Reloaded host state".to_string(), Color::Cyan));
                    }
                    KeyCode::Char('q') => return true,
                    _ => {}
                }
                false
            }
        }
    }

    fn handle_edit_date_key(&mut self, code: KeyCode) {
        let Mode::EditDate { entity, buffer } = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                if buffer.len() < 10 {
                    buffer.push(c);
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char('t') => {
                let entity = entity.clone();
                self.mode = Mode::Normal;
                let today = self.now.date();
                // The dialog is the confirmation step.
                self.start_reset(entity, ResetTrigger::Picked(today), true);
            }
            KeyCode::Enter => match ResetTrigger::from_picker(buffer) {
                Ok(trigger) => {
                    let entity = entity.clone();
                    self.mode = Mode::Normal;
                    self.start_reset(entity, trigger, true);
                }
                Err(e) => {
                    self.status = Some((e.to_string(), Color::Red));
                }
            },
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = None;
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Mode::Confirm(pending) = std::mem::replace(&mut self.mode, Mode::Normal) {
                    let call = pending.accept(&mut *self.sink);
                    self.after_dispatch(&call);
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                if let Mode::Confirm(pending) = std::mem::replace(&mut self.mode, Mode::Normal) {
                    pending.decline();
                    self.status = Some(("Cancelled".to_string(), Color::DarkGray));
                }
            }
            _ => {}
        }
    }

    fn toggle_value(&self, i: usize) -> bool {
        match i {
            0 => self.config.filter_overdue,
            1 => self.config.show_months,
            2 => self.config.show_next_date,
            _ => self.config.debug,
        }
    }

    fn flip_toggle(&mut self, i: usize) {
        let flag = match i {
            0 => &mut self.config.filter_overdue,
            1 => &mut self.config.show_months,
            2 => &mut self.config.show_next_date,
            _ => &mut self.config.debug,
        };
        *flag = !*flag;
        self.selected = 0;
    }

    fn handle_editor_key(&mut self, code: KeyCode) {
        let entity_count = self.config.entities.len();
        let on_entity = self.list_cursor < entity_count;

        let Some(field) = self.edit_field else {
            match code {
                KeyCode::Up => {
                    self.list_cursor = self.list_cursor.saturating_sub(1);
                }
                KeyCode::Down => {
                    if self.list_cursor + 1 < entity_count + TOGGLES.len() {
                        self.list_cursor += 1;
                    }
                }
                KeyCode::Enter | KeyCode::Char('e') if on_entity => {
                    self.input_buffer = frequency_field_value(&self.config.entities[self.list_cursor]);
                    self.edit_field = Some(EditorField::Frequency);
                }
                KeyCode::Char('n') if on_entity => {
                    self.input_buffer = self.config.entities[self.list_cursor]
                        .friendly_name
                        .clone()
                        .unwrap_or_default();
                    self.edit_field = Some(EditorField::Name);
                }
                KeyCode::Enter | KeyCode::Char(' ') if !on_entity => {
                    self.flip_toggle(self.list_cursor - entity_count);
                }
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.view_state = ViewState::Card;
                    self.status = None;
                }
                _ => {}
            }
            return;
        };

        match code {
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => match field {
                EditorField::Frequency => {
                    match self.config.set_frequency(self.list_cursor, &self.input_buffer) {
                        Ok(n) => {
                            self.status = Some((format!("Every {n} days"), Color::Green));
                            self.input_buffer.clear();
                            self.edit_field = None;
                        }
                        Err((e, revert)) => {
                            self.status = Some((e.to_string(), Color::Red));
                            self.input_buffer = revert;
                        }
                    }
                }
                EditorField::Name => {
                    self.config
                        .set_friendly_name(self.list_cursor, &self.input_buffer);
                    self.input_buffer.clear();
                    self.edit_field = None;
                }
            },
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.edit_field = None;
                self.status = None;
            }
            _ => {}
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        match self.view_state {
            ViewState::Editor => {
                let area = f.area();
                self.render_editor(f, area);
            }
            ViewState::Card => {
                let size = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(3), Constraint::Length(1)])
                    .split(size);

                self.render_card(f, chunks[0]);
                self.render_footer(f, chunks[1]);

                match &self.mode {
                    Mode::Normal => {}
                    Mode::EditDate { entity, buffer } => {
                        self.render_edit_dialog(f, size, entity, buffer)
                    }
                    Mode::Confirm(pending) => self.render_confirm_dialog(f, size, pending),
                }
            }
        }
    }

    fn row_height(&self) -> u16 {
        if self.config.debug { 4 } else { 3 }
    }

    fn render_card(&mut self, f: &mut Frame, area: Rect) {
        let rows = self.visible_rows();
        if self.selected >= rows.len() {
            self.selected = rows.len().saturating_sub(1);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.config.title));
        let inner = block.inner(area);
        f.render_widget(block, area);

        self.sync_gestures(&rows);
        self.row_areas.clear();

        if rows.is_empty() {
            let msg = if self.config.filter_overdue {
                "Nothing is overdue."
            } else {
                "No input_datetime entities to show."
            };
            let p = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
            f.render_widget(p, inner);
            return;
        }

        let interactive = matches!(self.mode, Mode::Normal);
        let height = self.row_height();
        let bottom = inner.y + inner.height;
        let mut y = inner.y;
        for (i, row) in rows.iter().enumerate() {
            if y + height > bottom {
                // Rows that do not fit are not targets.
                for g in &mut self.gestures[i..] {
                    g.detach();
                }
                break;
            }
            let rect = Rect::new(inner.x, y, inner.width, height);
            self.row_areas.push(rect);
            if interactive {
                self.gestures[i].attach(rect);
            } else {
                self.gestures[i].detach();
            }
            self.render_row(f, rect, row, i == self.selected);
            y += height + 1;
        }
    }

    fn render_row(&self, f: &mut Frame, area: Rect, row: &VisibleRow, is_selected: bool) {
        let today = self.now.date();
        let (r, g, b) = bar_color(&row.state);
        let color = Color::Rgb(r, g, b);

        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(1); area.height as usize])
            .split(area);

        let label = format_duration(row.state.days_since_last_event, self.config.show_months);
        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(label.chars().count() as u16 + 1),
            ])
            .split(lines[0]);
        let (marker, name_style) = if is_selected {
            ("▶ ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            ("  ", Style::default().add_modifier(Modifier::BOLD))
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(row.name.clone(), name_style),
            ])),
            header[0],
        );
        f.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(color)))
                .alignment(Alignment::Right),
            header[1],
        );

        let status = status_text(&row.state, today, self.config.show_next_date);
        f.render_widget(
            Paragraph::new(format!("  {status}")).style(Style::default().fg(Color::DarkGray)),
            lines[1],
        );

        let percent = progress_percent(row.state.days_since_last_event, row.entity.frequency_days);
        let bar_area = Rect {
            x: lines[2].x + 2,
            width: lines[2].width.saturating_sub(3),
            ..lines[2]
        };
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(color).bg(TRACK_BG))
                .ratio((percent / 100.0).clamp(0.0, 1.0))
                .label(""),
            bar_area,
        );

        if self.config.debug && lines.len() > 3 {
            let debug = format!(
                "  Last: {} | Next: {} | Progress: {:.0}% | Icon: {}",
                format_iso_date(row.state.last_event_date),
                format_iso_date(row.state.next_event_date),
                percent,
                row.entity.icon(&self.host),
            );
            f.render_widget(
                Paragraph::new(debug).style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
                lines[3],
            );
        }
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some((msg, color)) => Line::from(Span::styled(
                msg.clone(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                "↑↓=select  Enter/click=edit date  r/hold=reset  o=editor  l=reload  q=quit",
                Style::default().fg(Color::DarkGray),
            )),
        };
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_edit_dialog(&self, f: &mut Frame, area: Rect, entity: &TrackedEntity, buffer: &str) {
        let dialog = centered_rect(52, 9, area);
        f.render_widget(Clear, dialog);

        let mut lines = vec![
            Line::from(Span::styled(
                entity.display_name(&self.host),
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(format!("Date: {buffer}_")),
            Line::from(""),
            Line::from(Span::styled(
                "Enter=save  t=mark as done today  Esc=cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        if let Some((msg, color)) = &self.status {
            lines.push(Line::from(Span::styled(msg.clone(), Style::default().fg(*color))));
        }

        let p = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Edit Last Event Date "),
        );
        f.render_widget(p, dialog);
    }

    fn render_confirm_dialog(&self, f: &mut Frame, area: Rect, pending: &PendingConfirmation) {
        let dialog = centered_rect(56, 7, area);
        f.render_widget(Clear, dialog);
        let lines = vec![
            Line::from(pending.message().to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "y/Enter=confirm  n/Esc=cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let p = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Confirm "));
        f.render_widget(p, dialog);
    }

    fn render_editor(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(2)])
            .split(area);

        let header = Row::new(vec![
            Cell::from("Item").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Entity").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Every (days)").style(Style::default().add_modifier(Modifier::BOLD)),
        ]);

        let mut rows: Vec<Row> = self
            .config
            .entities
            .iter()
            .enumerate()
            .map(|(i, entity)| {
                let editing = self.list_cursor == i;
                let name = match self.edit_field {
                    Some(EditorField::Name) if editing => format!("{}_", self.input_buffer),
                    _ => entity.display_name(&self.host),
                };
                let frequency = match self.edit_field {
                    Some(EditorField::Frequency) if editing => format!("{}_", self.input_buffer),
                    _ => frequency_field_value(entity),
                };
                Row::new(vec![
                    Cell::from(format!("  {name}")),
                    Cell::from(entity.id.clone()),
                    Cell::from(frequency),
                ])
            })
            .collect();

        for (i, label) in TOGGLES.iter().enumerate() {
            let value = if self.toggle_value(i) { "on" } else { "off" };
            rows.push(Row::new(vec![
                Cell::from(format!("  {label}")),
                Cell::from(""),
                Cell::from(value),
            ]));
        }

        let mut table_state = TableState::default();
        table_state.select(Some(self.list_cursor));

        let table = Table::new(
            rows,
            [Constraint::Min(20), Constraint::Min(24), Constraint::Length(14)],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Editor  (↑↓=select  e=edit days  n=edit name  Enter/Space=toggle  Esc=back) "),
        )
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(table, chunks[0], &mut table_state);

        let hint = match &self.status {
            Some((msg, color)) => Span::styled(msg.clone(), Style::default().fg(*color)),
            None if self.edit_field.is_some() => Span::styled(
                "Type new value  Enter=save  Esc=cancel",
                Style::default().fg(Color::DarkGray),
            ),
            None => Span::styled(
                "↑↓=select  Esc=back to card (changes are saved on exit)",
                Style::default().fg(Color::DarkGray),
            ),
        };
        f.render_widget(Paragraph::new(Line::from(hint)), chunks[1]);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut last_refresh = Instant::now();
    loop {
        app.set_clock(Local::now().naive_local());
        terminal.draw(|f| app.render(f))?;

        let now = Instant::now();
        let timeout = app
            .next_deadline()
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(POLL_INTERVAL)
            .min(POLL_INTERVAL);
        if event::poll(timeout)? {
            match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key.code, key.modifiers) {
                        break;
                    }
                }
                CEvent::Mouse(mouse) => {
                    app.handle_mouse(mouse.kind, mouse.column, mouse.row, Instant::now());
                }
                _ => {}
            }
        }
        app.tick(Instant::now());

        if last_refresh.elapsed() >= HOST_REFRESH_INTERVAL {
            app.refresh_host();
            last_refresh = Instant::now();
        }
    }
    Ok(())
}
