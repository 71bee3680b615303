// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use leasescope_app::{LeaseColumn, LeaseTable, TableCommand};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use std::io::{self, Write};

const FULL_PAGE_ROWS: isize = 20;

/// What a key press means to the viewer. Sort changes go to [`LeaseTable`];
/// everything else only moves the highlighted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Table(TableCommand),
    MoveRow(isize),
    JumpFirstRow,
    JumpLastRow,
}

pub fn key_action(key: KeyEvent) -> Option<KeyAction> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Table(TableCommand::Quit))
        }
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(KeyAction::Table(TableCommand::Quit)),
        (KeyCode::Right, _) => Some(KeyAction::Table(TableCommand::NextColumn)),
        (KeyCode::Left, _) => Some(KeyAction::Table(TableCommand::PrevColumn)),
        (KeyCode::Char(' '), _) => Some(KeyAction::Table(TableCommand::ToggleOrder)),
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(KeyAction::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(KeyAction::MoveRow(-1)),
        (KeyCode::PageDown, _) => Some(KeyAction::MoveRow(FULL_PAGE_ROWS)),
        (KeyCode::PageUp, _) => Some(KeyAction::MoveRow(-FULL_PAGE_ROWS)),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(KeyAction::JumpFirstRow),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(KeyAction::JumpLastRow),
        _ => None,
    }
}

/// Row highlight. Lives outside [`LeaseTable`] because it never affects
/// ordering.
#[derive(Debug, Default)]
pub struct TableView {
    state: TableState,
}

impl TableView {
    pub fn new(row_count: usize) -> Self {
        let selected = (row_count > 0).then_some(0);
        Self {
            state: TableState::default().with_selected(selected),
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    fn move_row(&mut self, delta: isize, row_count: usize) {
        if row_count == 0 {
            self.state.select(None);
            return;
        }
        let current = self.state.selected().unwrap_or(0) as isize;
        let last = row_count as isize - 1;
        let next = (current + delta).clamp(0, last);
        self.state.select(Some(next as usize));
    }

    fn jump(&mut self, last: bool, row_count: usize) {
        let target = match (row_count, last) {
            (0, _) => None,
            (_, false) => Some(0),
            (count, true) => Some(count - 1),
        };
        self.state.select(target);
    }
}

/// Applies one key press. Returns `true` once the table has been closed.
pub fn handle_key(table: &mut LeaseTable, view: &mut TableView, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return table.is_closed();
    }

    let row_count = table.rows().len();
    match key_action(key) {
        Some(KeyAction::Table(command)) => {
            table.dispatch(command);
        }
        Some(KeyAction::MoveRow(delta)) => view.move_row(delta, row_count),
        Some(KeyAction::JumpFirstRow) => view.jump(false, row_count),
        Some(KeyAction::JumpLastRow) => view.jump(true, row_count),
        None => {}
    }
    table.is_closed()
}

pub fn render(frame: &mut ratatui::Frame<'_>, table: &LeaseTable, view: &mut TableView) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(frame.area());

    let header = Paragraph::new(table.header_text())
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, layout[0]);

    let block = Block::default()
        .title(format!("DHCP leases ({})", table.rows().len()))
        .borders(Borders::ALL);

    if table.rows().is_empty() {
        let empty = Paragraph::new("router reported no DHCP leases").block(block);
        frame.render_widget(empty, layout[1]);
        return;
    }

    let active = table.sort().column;
    let header_row = Row::new(LeaseColumn::ALL.map(|column| {
        let style = if column == active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        };
        Cell::from(column.title()).style(style)
    }));

    let rows = table
        .rows()
        .iter()
        .map(|row| Row::new(row.cells().map(|text| Cell::from(text.to_owned()))));
    let widths = LeaseColumn::ALL.map(|column| Constraint::Length(column.width()));

    let widget = Table::new(rows, widths)
        .header(header_row)
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(block);
    frame.render_stateful_widget(widget, layout[1], &mut view.state);
}

/// Raw mode plus alternate screen. Dropping the guard puts the terminal back,
/// so early returns and panics do not leave the shell unusable.
struct TerminalGuard<W: Write> {
    out: W,
    restored: bool,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut guard = Self {
            out,
            restored: false,
        };
        execute!(guard.out, terminal::EnterAlternateScreen).context("enter alternate screen")?;
        Ok(guard)
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        let raw = disable_raw_mode().context("disable raw mode");
        let screen =
            execute!(self.out, terminal::LeaveAlternateScreen).context("leave alternate screen");
        raw.and(screen)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Shows `table` full screen until the user quits. Blocks on terminal input.
pub fn run_lease_table(table: &mut LeaseTable) -> Result<()> {
    let mut guard = TerminalGuard::enter(io::stdout())?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    let mut view = TableView::new(table.rows().len());

    let mut result = Ok(());
    while !table.is_closed() {
        if let Err(error) = terminal.draw(|frame| render(frame, table, &mut view)) {
            result = Err(error).context("draw frame");
            break;
        }

        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                if handle_key(table, &mut view, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    guard.restore()?;
    result
}

#[cfg(test)]
mod tests {
    use super::{KeyAction, TableView, TerminalGuard, handle_key, key_action, render};
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use leasescope_app::{Lease, LeaseColumn, LeaseTable, SortDirection, TableCommand};
    use leasescope_testkit::LeaseFaker;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_table() -> LeaseTable {
        LeaseTable::new(vec![
            Lease::new("10.0.0.2", "AA:BB:CC:00:00:02", "printer").with_vendor("Acme Corp"),
            Lease::new("10.0.0.10", "00:1A:2B:00:00:10", "laptop").with_vendor("Unknown"),
        ])
    }

    fn render_lines(table: &LeaseTable, view: &mut TableView) -> Result<Vec<String>> {
        let mut terminal = Terminal::new(TestBackend::new(100, 12))?;
        terminal.draw(|frame| render(frame, table, view))?;
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        Ok((0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect())
    }

    fn line_index(lines: &[String], needle: &str) -> Option<usize> {
        lines.iter().position(|line| line.contains(needle))
    }

    #[test]
    fn sort_keys_map_to_table_commands() {
        assert_eq!(
            key_action(key(KeyCode::Right)),
            Some(KeyAction::Table(TableCommand::NextColumn))
        );
        assert_eq!(
            key_action(key(KeyCode::Left)),
            Some(KeyAction::Table(TableCommand::PrevColumn))
        );
        assert_eq!(
            key_action(key(KeyCode::Char(' '))),
            Some(KeyAction::Table(TableCommand::ToggleOrder))
        );
    }

    #[test]
    fn quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            assert_eq!(
                key_action(key(code)),
                Some(KeyAction::Table(TableCommand::Quit))
            );
        }
        assert_eq!(
            key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Table(TableCommand::Quit))
        );
        assert_eq!(key_action(key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn navigation_keys_move_rows() {
        assert_eq!(key_action(key(KeyCode::Down)), Some(KeyAction::MoveRow(1)));
        assert_eq!(key_action(key(KeyCode::Char('k'))), Some(KeyAction::MoveRow(-1)));
        assert_eq!(key_action(key(KeyCode::Home)), Some(KeyAction::JumpFirstRow));
        assert_eq!(key_action(key(KeyCode::End)), Some(KeyAction::JumpLastRow));
        assert_eq!(key_action(key(KeyCode::Enter)), None);
    }

    #[test]
    fn navigation_never_changes_sort() {
        let mut table = sample_table();
        let before = table.clone();
        let mut view = TableView::new(table.rows().len());

        for code in [KeyCode::Down, KeyCode::Down, KeyCode::PageUp, KeyCode::End] {
            assert!(!handle_key(&mut table, &mut view, key(code)));
        }
        assert_eq!(table, before);
        assert_eq!(view.selected(), Some(1));
    }

    #[test]
    fn row_movement_is_clamped() {
        let mut table = LeaseTable::new(LeaseFaker::new(5).leases(30));
        let mut view = TableView::new(table.rows().len());

        handle_key(&mut table, &mut view, key(KeyCode::Up));
        assert_eq!(view.selected(), Some(0));
        handle_key(&mut table, &mut view, key(KeyCode::PageDown));
        assert_eq!(view.selected(), Some(20));
        handle_key(&mut table, &mut view, key(KeyCode::PageDown));
        assert_eq!(view.selected(), Some(29));
        handle_key(&mut table, &mut view, key(KeyCode::Char('g')));
        assert_eq!(view.selected(), Some(0));
    }

    #[test]
    fn empty_table_has_no_selection() {
        let mut table = LeaseTable::new(Vec::new());
        let mut view = TableView::new(0);
        handle_key(&mut table, &mut view, key(KeyCode::Down));
        handle_key(&mut table, &mut view, key(KeyCode::End));
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn sort_keys_update_table_and_quit_closes() {
        let mut table = sample_table();
        let mut view = TableView::new(table.rows().len());

        assert!(!handle_key(&mut table, &mut view, key(KeyCode::Right)));
        assert_eq!(table.sort().column, LeaseColumn::Mac);
        assert!(!handle_key(&mut table, &mut view, key(KeyCode::Char(' '))));
        assert_eq!(table.sort().direction, SortDirection::Desc);
        assert!(handle_key(&mut table, &mut view, key(KeyCode::Char('q'))));
        assert!(table.is_closed());
    }

    #[test]
    fn release_events_are_ignored() {
        let mut table = sample_table();
        let mut view = TableView::new(table.rows().len());
        let mut release = key(KeyCode::Right);
        release.kind = KeyEventKind::Release;

        assert!(!handle_key(&mut table, &mut view, release));
        assert_eq!(table.sort().column, LeaseColumn::Address);
    }

    #[test]
    fn render_shows_header_and_sorted_rows() -> Result<()> {
        let table = sample_table();
        let mut view = TableView::new(table.rows().len());
        let lines = render_lines(&table, &mut view)?;

        assert!(lines[0].contains("Sorting by IP ↑ (← → to change column, space to toggle order)"));
        assert!(line_index(&lines, "DHCP leases (2)").is_some());
        let header = line_index(&lines, "Hostname").expect("column header rendered");
        assert!(lines[header].contains("MAC"));
        assert!(lines[header].contains("Vendor"));

        // string ordering puts "10.0.0.10" before "10.0.0.2"
        let ten = line_index(&lines, "10.0.0.10").expect("row rendered");
        let two = line_index(&lines, "10.0.0.2 ").expect("row rendered");
        assert!(ten < two);
        assert!(lines[two].contains("Acme Corp"));
        Ok(())
    }

    #[test]
    fn render_reflects_toggled_direction() -> Result<()> {
        let mut table = sample_table();
        let mut view = TableView::new(table.rows().len());
        handle_key(&mut table, &mut view, key(KeyCode::Left));
        handle_key(&mut table, &mut view, key(KeyCode::Char(' ')));

        let lines = render_lines(&table, &mut view)?;
        assert!(lines[0].contains("Sorting by Vendor ↓"));
        let unknown = line_index(&lines, "Unknown").expect("row rendered");
        let acme = line_index(&lines, "Acme Corp").expect("row rendered");
        assert!(unknown < acme);
        Ok(())
    }

    #[test]
    fn render_empty_table() -> Result<()> {
        let table = LeaseTable::new(Vec::new());
        let mut view = TableView::new(0);
        let lines = render_lines(&table, &mut view)?;
        assert!(line_index(&lines, "router reported no DHCP leases").is_some());
        assert!(line_index(&lines, "DHCP leases (0)").is_some());
        Ok(())
    }

    const LEAVE_ALTERNATE_SCREEN: &str = "\x1b[?1049l";

    #[test]
    fn dropped_guard_leaves_alternate_screen() {
        let mut out = Vec::new();
        {
            let _guard = TerminalGuard {
                out: &mut out,
                restored: false,
            };
        }
        let written = String::from_utf8_lossy(&out);
        assert!(written.contains(LEAVE_ALTERNATE_SCREEN), "{written:?}");
    }

    #[test]
    fn guard_restores_only_once() -> Result<()> {
        let mut out = Vec::new();
        {
            let mut guard = TerminalGuard {
                out: &mut out,
                restored: false,
            };
            guard.restore()?;
            guard.restore()?;
        }
        let written = String::from_utf8_lossy(&out);
        assert_eq!(written.matches(LEAVE_ALTERNATE_SCREEN).count(), 1);
        Ok(())
    }
}
