// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Lease, LeaseColumn, LeaseRow, SortDirection, SortState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCommand {
    NextColumn,
    PrevColumn,
    ToggleOrder,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    SortChanged(SortState),
    Closed,
}

/// Sort state machine behind the lease viewer. Rows are only reordered in
/// response to a sort change; navigation keys never reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseTable {
    rows: Vec<LeaseRow>,
    sort: SortState,
    closed: bool,
}

impl LeaseTable {
    pub fn new(leases: impl IntoIterator<Item = Lease>) -> Self {
        let mut table = Self {
            rows: leases.into_iter().map(LeaseRow::from).collect(),
            sort: SortState::default(),
            closed: false,
        };
        table.resort();
        table
    }

    pub fn rows(&self) -> &[LeaseRow] {
        &self.rows
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        match command {
            TableCommand::NextColumn => {
                self.sort.column = self.sort.column.next();
                self.sort_changed()
            }
            TableCommand::PrevColumn => {
                self.sort.column = self.sort.column.prev();
                self.sort_changed()
            }
            TableCommand::ToggleOrder => {
                self.sort.direction = self.sort.direction.toggled();
                self.sort_changed()
            }
            TableCommand::Quit => {
                self.closed = true;
                vec![TableEvent::Closed]
            }
        }
    }

    /// Header line naming the active sort column and direction.
    pub fn header_text(&self) -> String {
        format!(
            "Sorting by {} {} (← → to change column, space to toggle order)",
            self.sort.column.title(),
            self.sort.direction.glyph()
        )
    }

    fn sort_changed(&mut self) -> Vec<TableEvent> {
        self.resort();
        vec![TableEvent::SortChanged(self.sort)]
    }

    fn resort(&mut self) {
        let SortState { column, direction } = self.sort;
        sort_rows(&mut self.rows, column, direction);
    }
}

/// Stable sort on one column; equal values keep their incoming order in
/// both directions.
pub fn sort_rows(rows: &mut [LeaseRow], column: LeaseColumn, direction: SortDirection) {
    rows.sort_by(|left, right| {
        let order = left.value(column).cmp(right.value(column));
        match direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });
}
