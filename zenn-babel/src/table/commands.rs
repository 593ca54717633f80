//! Table commands
//!
//! Each command resolves the table around the selection, runs its primitives in one
//! transaction and commits. Row inserts run with the header row switched off so the new
//! row never inherits header cells, then switch it back on for row 0.

use super::{EditorState, Path, TableContext, Transaction};
use crate::error::EditError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableCommand {
    AddRowBefore,
    AddRowAfter,
    DeleteRow,
    AddColumnBefore,
    AddColumnAfter,
    DeleteColumn,
    ToggleHeaderRow,
}

impl TableCommand {
    pub const ALL: [TableCommand; 7] = [
        TableCommand::AddRowBefore,
        TableCommand::AddRowAfter,
        TableCommand::DeleteRow,
        TableCommand::AddColumnBefore,
        TableCommand::AddColumnAfter,
        TableCommand::DeleteColumn,
        TableCommand::ToggleHeaderRow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TableCommand::AddRowBefore => "addRowBefore",
            TableCommand::AddRowAfter => "addRowAfter",
            TableCommand::DeleteRow => "deleteRow",
            TableCommand::AddColumnBefore => "addColumnBefore",
            TableCommand::AddColumnAfter => "addColumnAfter",
            TableCommand::DeleteColumn => "deleteColumn",
            TableCommand::ToggleHeaderRow => "toggleHeaderRow",
        }
    }

    /// Accepts the camelCase name or its kebab-case spelling (`add-row-before`).
    pub fn from_name(name: &str) -> Option<TableCommand> {
        let folded: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        TableCommand::ALL
            .into_iter()
            .find(|command| command.name().to_ascii_lowercase() == folded)
    }

    fn run(self, tr: &mut Transaction, context: &TableContext) -> Result<(), EditError> {
        let table = &context.table;
        match self {
            TableCommand::AddRowBefore => add_row(tr, context, context.row),
            TableCommand::AddRowAfter => add_row(tr, context, context.row + 1),
            TableCommand::DeleteRow => {
                let rows = row_count(tr, table);
                if rows <= 1 {
                    return tr.delete_table(table);
                }
                tr.delete_row(table, context.row)?;
                if context.row == 0 {
                    tr.toggle_header_row(table)?;
                }
                focus_cell(tr, table, context.row.min(rows - 2), context.column);
                Ok(())
            }
            TableCommand::AddColumnBefore => tr.add_column(table, context.column),
            TableCommand::AddColumnAfter => tr.add_column(table, context.column + 1),
            TableCommand::DeleteColumn => {
                let single_column = tr
                    .doc()
                    .node_at(table.as_slice())
                    .is_some_and(|node| node.content.iter().all(|row| row.content.len() <= 1));
                if single_column {
                    return tr.delete_table(table);
                }
                tr.delete_column(table, context.column)?;
                focus_cell(tr, table, context.row, context.column);
                Ok(())
            }
            TableCommand::ToggleHeaderRow => tr.toggle_header_row(table),
        }
    }
}

fn add_row(tr: &mut Transaction, context: &TableContext, index: usize) -> Result<(), EditError> {
    tr.unset_table_header(&context.table)?;
    tr.add_row(&context.table, index, context.row)?;
    tr.toggle_header_row(&context.table)
}

fn row_count(tr: &Transaction, table: &Path) -> usize {
    tr.doc()
        .node_at(table.as_slice())
        .map_or(0, |node| node.content.len())
}

/// Puts the selection in the paragraph of the cell nearest to `row`, `column`.
fn focus_cell(tr: &mut Transaction, table: &Path, row: usize, column: usize) {
    let columns = tr
        .doc()
        .node_at(table.child(row).as_slice())
        .map_or(0, |node| node.content.len());
    if columns == 0 {
        return;
    }
    let cell = table.child(row).child(column.min(columns - 1));
    tr.set_selection(cell.child(0));
}

impl EditorState {
    /// Runs a table command against the table enclosing the selection.
    ///
    /// Either the whole command applies or the state is left untouched.
    pub fn apply(&mut self, command: TableCommand) -> Result<(), EditError> {
        let result = TableContext::resolve(&self.doc, &self.selection).and_then(|context| {
            let mut tr = self.transaction();
            command.run(&mut tr, &context)?;
            tr.commit(self)
        });
        match &result {
            Ok(()) => debug!(command = command.name(), selection = %self.selection, "table command applied"),
            Err(error) => warn!(command = command.name(), %error, "table command rejected"),
        }
        result
    }
}
