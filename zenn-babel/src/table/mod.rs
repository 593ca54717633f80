//! Table structural editor
//!
//!     Row and column editing for tables in the document tree, built on a small set of
//!     transactional primitives (insert, delete, set node type, set attributes) rather than on
//!     direct splicing of the tree.
//!
//!     A table always satisfies the header invariant: it has at least one row, every row has at
//!     least one cell, the cells of row 0 are all `tableHeader` and every other cell is a
//!     `tableCell`. Commands run inside a [`Transaction`], which is checked as a whole on commit,
//!     so either the full edit (including restoring the invariant) lands or nothing does.
//!
//!     The editing position is a [`Path`] of child indexes from the document root to a cell or
//!     to something inside a cell.
//!
//!     Example:
//!
//!         let mut state = EditorState::new(doc, "0.1.0".parse()?);
//!         state.apply(TableCommand::AddRowAfter)?;

pub mod commands;
pub mod transaction;

pub use commands::TableCommand;
pub use transaction::{Step, Transaction};

use crate::error::EditError;
use crate::schema::{Node, NodeType};
use std::fmt;
use std::str::FromStr;

/// Child-index path from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indexes: Vec<usize>) -> Self {
        Path(indexes)
    }

    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Path(indexes)
    }

    pub fn parent(&self) -> Option<Path> {
        self.0
            .split_last()
            .map(|(_, parent)| Path(parent.to_vec()))
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub(crate) fn indexes_mut(&mut self) -> &mut Vec<usize> {
        &mut self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indexes: Vec<usize>) -> Self {
        Path(indexes)
    }
}

/// Dot-separated indexes (`0.2.1`); the empty string is the root.
impl FromStr for Path {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Path::root());
        }
        s.split('.')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
            .map_err(|_| EditError::InvalidPath(s.to_string()))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// A document together with the current editing position.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub doc: Node,
    pub selection: Path,
}

impl EditorState {
    pub fn new(doc: Node, selection: Path) -> Self {
        EditorState { doc, selection }
    }

    /// Starts a transaction on a copy of the current document.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self)
    }
}

/// The table, row and column enclosing a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableContext {
    pub table: Path,
    pub row: usize,
    pub column: usize,
}

impl TableContext {
    pub fn resolve(doc: &Node, selection: &Path) -> Result<Self, EditError> {
        let indexes = selection.as_slice();
        if doc.node_at(indexes).is_none() {
            return Err(EditError::InvalidPath(selection.to_string()));
        }
        let depth = (0..indexes.len())
            .rev()
            .find(|&depth| {
                doc.node_at(&indexes[..depth])
                    .is_some_and(|node| node.kind == NodeType::Table)
            })
            .ok_or(EditError::NotInTable)?;

        // the selection must reach at least a cell below the table
        let (row, column) = match indexes.get(depth..depth + 2) {
            Some(&[row, column]) => (row, column),
            _ => return Err(EditError::NotInTable),
        };
        let table = Path(indexes[..depth].to_vec());
        row_anchor(doc, &table, row)?;
        Ok(TableContext { table, row, column })
    }

    pub fn row_path(&self) -> Path {
        self.table.child(self.row)
    }

    pub fn cell_path(&self) -> Path {
        self.row_path().child(self.column)
    }
}

/// Path of the first cell of a row.
///
/// Every row of a table has a first cell; a row without one means the tree was broken
/// elsewhere and is reported as an invariant violation.
pub fn row_anchor(doc: &Node, table: &Path, row: usize) -> Result<Path, EditError> {
    let row_path = table.child(row);
    let node = doc
        .node_at(row_path.as_slice())
        .ok_or_else(|| EditError::InvalidPath(row_path.to_string()))?;
    if node.kind != NodeType::TableRow {
        return Err(EditError::Invariant(format!(
            "expected a table row at {row_path}, found {}",
            node.kind.name()
        )));
    }
    match node.content.first() {
        Some(cell) if cell.kind.is_table_cell() => Ok(row_path.child(0)),
        _ => Err(EditError::Invariant(
            "No first cell found in the table row".to_string(),
        )),
    }
}

/// Checks the header invariant of the table at `path`.
pub fn check_table(table: &Node, path: &Path) -> Result<(), EditError> {
    if table.content.is_empty() {
        return Err(EditError::Invariant(format!("table at {path} has no rows")));
    }
    for (index, row) in table.content.iter().enumerate() {
        if row.content.is_empty() {
            return Err(EditError::Invariant(format!(
                "row {index} of table at {path} has no cells"
            )));
        }
        let expected = if index == 0 {
            NodeType::TableHeader
        } else {
            NodeType::TableCell
        };
        if let Some(cell) = row.content.iter().find(|cell| cell.kind != expected) {
            return Err(EditError::Invariant(format!(
                "row {index} of table at {path} holds a {} cell, expected {}",
                cell.kind.name(),
                expected.name()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_table(rows: usize, columns: usize) -> Node {
        let rows = (0..rows)
            .map(|r| {
                Node::table_row(
                    (0..columns)
                        .map(|c| {
                            let text = vec![Node::text(&format!("{r}{c}"))];
                            if r == 0 {
                                Node::table_header(text)
                            } else {
                                Node::table_cell(text)
                            }
                        })
                        .collect(),
                )
            })
            .collect();
        Node::table(rows)
    }

    #[test]
    fn test_path_parse_and_display() {
        let path: Path = "0.2.1".parse().unwrap();
        assert_eq!(path, Path::new(vec![0, 2, 1]));
        assert_eq!(path.to_string(), "0.2.1");
        assert_eq!("".parse::<Path>().unwrap(), Path::root());
        assert!(matches!(
            "0.x".parse::<Path>(),
            Err(EditError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_path_navigation() {
        let path = Path::new(vec![1, 2]);
        assert_eq!(path.parent(), Some(Path::new(vec![1])));
        assert_eq!(path.child(3), Path::new(vec![1, 2, 3]));
        assert!(path.starts_with(&Path::new(vec![1])));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn test_resolve_from_inside_a_cell() {
        let doc = Node::doc(vec![
            Node::paragraph(vec![]),
            sample_table(2, 2),
        ]);
        let context = TableContext::resolve(&doc, &"1.1.0.0".parse().unwrap()).unwrap();
        assert_eq!(
            context,
            TableContext {
                table: Path::new(vec![1]),
                row: 1,
                column: 0
            }
        );
    }

    #[test]
    fn test_resolve_outside_a_table() {
        let doc = Node::doc(vec![Node::paragraph(vec![]), sample_table(1, 1)]);
        assert_eq!(
            TableContext::resolve(&doc, &"0".parse().unwrap()),
            Err(EditError::NotInTable)
        );
        assert_eq!(
            TableContext::resolve(&doc, &"1.0".parse().unwrap()),
            Err(EditError::NotInTable)
        );
        assert!(matches!(
            TableContext::resolve(&doc, &"5".parse().unwrap()),
            Err(EditError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_row_anchor_without_cells() {
        let mut table = sample_table(2, 1);
        table.content[1].content.clear();
        let doc = Node::doc(vec![table]);
        assert_eq!(
            row_anchor(&doc, &Path::new(vec![0]), 1),
            Err(EditError::Invariant(
                "No first cell found in the table row".to_string()
            ))
        );
        assert_eq!(
            row_anchor(&doc, &Path::new(vec![0]), 0),
            Ok(Path::new(vec![0, 0, 0]))
        );
    }

    #[test]
    fn test_check_table() {
        assert!(check_table(&sample_table(3, 2), &Path::root()).is_ok());

        let mut table = sample_table(2, 2);
        table.content[1].content[0].kind = NodeType::TableHeader;
        assert!(matches!(
            check_table(&table, &Path::root()),
            Err(EditError::Invariant(_))
        ));
    }
}
