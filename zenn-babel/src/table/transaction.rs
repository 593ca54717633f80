//! Transactional editing primitives
//!
//! A [`Transaction`] works on its own copy of the document. Every primitive records a
//! [`Step`] and maps the selection through it; nothing reaches the [`EditorState`] until
//! [`Transaction::commit`] has validated the result.

use super::{check_table, row_anchor, EditorState, Path};
use crate::error::{EditError, SchemaError};
use crate::schema::{Attrs, Node, NodeType};
use tracing::trace;

/// A primitive change applied by a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Insert { path: Path, kind: NodeType },
    Delete { path: Path, kind: NodeType },
    SetNodeType { path: Path, kind: NodeType },
    SetAttrs { path: Path },
}

#[derive(Debug, Clone)]
pub struct Transaction {
    doc: Node,
    selection: Path,
    steps: Vec<Step>,
    tables: Vec<Path>,
}

impl Transaction {
    pub(crate) fn new(state: &EditorState) -> Self {
        Transaction {
            doc: state.doc.clone(),
            selection: state.selection.clone(),
            steps: Vec::new(),
            tables: Vec::new(),
        }
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> &Path {
        &self.selection
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn set_selection(&mut self, selection: Path) {
        self.selection = selection;
    }

    fn node(&self, path: &Path) -> Result<&Node, EditError> {
        self.doc
            .node_at(path.as_slice())
            .ok_or_else(|| EditError::InvalidPath(path.to_string()))
    }

    fn node_mut(&mut self, path: &Path) -> Result<&mut Node, EditError> {
        self.doc
            .node_at_mut(path.as_slice())
            .ok_or_else(|| EditError::InvalidPath(path.to_string()))
    }

    fn table(&mut self, path: &Path) -> Result<&Node, EditError> {
        let table = self
            .doc
            .node_at(path.as_slice())
            .filter(|node| node.kind == NodeType::Table)
            .ok_or(EditError::NotInTable)?;
        if !self.tables.contains(path) {
            self.tables.push(path.clone());
        }
        Ok(table)
    }

    /// Inserts `node` as child `index` of `parent`.
    pub fn insert(&mut self, parent: &Path, index: usize, node: Node) -> Result<(), EditError> {
        let kind = node.kind;
        let target = self.node_mut(parent)?;
        if target.kind == NodeType::Text || index > target.content.len() {
            return Err(EditError::InvalidPath(parent.child(index).to_string()));
        }
        target.content.insert(index, node);

        let depth = parent.len();
        if self.selection.starts_with(parent) {
            if let Some(position) = self.selection.indexes_mut().get_mut(depth) {
                if *position >= index {
                    *position += 1;
                }
            }
        }
        let path = parent.child(index);
        trace!(%path, kind = kind.name(), "insert");
        self.steps.push(Step::Insert { path, kind });
        Ok(())
    }

    /// Removes the node at `path` and returns it.
    pub fn delete(&mut self, path: &Path) -> Result<Node, EditError> {
        let (parent, index) = match (path.parent(), path.last()) {
            (Some(parent), Some(index)) => (parent, index),
            _ => return Err(EditError::InvalidPath("cannot delete the document".to_string())),
        };
        let target = self.node_mut(&parent)?;
        if index >= target.content.len() {
            return Err(EditError::InvalidPath(path.to_string()));
        }
        let removed = target.content.remove(index);
        let remaining = target.content.len();

        let depth = parent.len();
        if self.selection.starts_with(path) {
            // the selected node is gone; fall back to its nearest sibling
            let indexes = self.selection.indexes_mut();
            indexes.truncate(depth);
            if remaining > 0 {
                indexes.push(index.min(remaining - 1));
            }
        } else if self.selection.starts_with(&parent) {
            if let Some(position) = self.selection.indexes_mut().get_mut(depth) {
                if *position > index {
                    *position -= 1;
                }
            }
        }
        trace!(%path, kind = removed.kind.name(), "delete");
        self.steps.push(Step::Delete {
            path: path.clone(),
            kind: removed.kind,
        });
        Ok(removed)
    }

    /// Re-types a node, keeping its content and the attributes the new type declares.
    pub fn set_node_type(&mut self, path: &Path, kind: NodeType) -> Result<(), EditError> {
        let node = self.node_mut(path)?;
        if node.kind == kind {
            return Ok(());
        }
        let mut attrs = kind.default_attrs();
        for (name, value) in std::mem::take(&mut node.attrs) {
            if let Some(slot) = attrs.get_mut(&name) {
                *slot = value;
            }
        }
        node.kind = kind;
        node.attrs = attrs;
        self.steps.push(Step::SetNodeType {
            path: path.clone(),
            kind,
        });
        Ok(())
    }

    /// Merges `attrs` into the node's attributes.
    pub fn set_attrs(&mut self, path: &Path, attrs: Attrs) -> Result<(), EditError> {
        let node = self.node_mut(path)?;
        let specs = node.kind.attr_specs();
        if let Some(name) = attrs
            .keys()
            .find(|name| !specs.iter().any(|(spec, _)| *spec == name.as_str()))
        {
            return Err(SchemaError::UnknownAttribute {
                node: node.kind.name().to_string(),
                attr: name.clone(),
            }
            .into());
        }
        node.attrs.extend(attrs);
        self.steps.push(Step::SetAttrs { path: path.clone() });
        Ok(())
    }

    /// Switches the cells of row 0 between header and body cells.
    pub fn toggle_header_row(&mut self, table: &Path) -> Result<(), EditError> {
        self.table(table)?;
        let row = row_anchor(&self.doc, table, 0)?
            .parent()
            .unwrap_or_default();
        let cells = &self.node(&row)?.content;
        let kind = if cells.iter().all(|cell| cell.kind == NodeType::TableHeader) {
            NodeType::TableCell
        } else {
            NodeType::TableHeader
        };
        let count = cells.len();
        for column in 0..count {
            self.set_node_type(&row.child(column), kind)?;
        }
        Ok(())
    }

    /// Turns every header cell of the table into a body cell.
    pub fn unset_table_header(&mut self, table: &Path) -> Result<(), EditError> {
        let headers: Vec<Path> = self
            .table(table)?
            .content
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.content
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.kind == NodeType::TableHeader)
                    .map(move |(c, _)| table.child(r).child(c))
            })
            .collect();
        for path in headers {
            self.set_node_type(&path, NodeType::TableCell)?;
        }
        Ok(())
    }

    /// Inserts an empty row at `index`, copying cell types and alignment from row `reference`.
    pub fn add_row(&mut self, table: &Path, index: usize, reference: usize) -> Result<(), EditError> {
        let rows = self.table(table)?.content.len();
        if index > rows {
            return Err(EditError::InvalidPath(table.child(index).to_string()));
        }
        row_anchor(&self.doc, table, reference)?;
        let cells: Vec<Node> = self.node(&table.child(reference))?
            .content
            .iter()
            .map(|cell| {
                Node::new(cell.kind, vec![Node::paragraph(vec![])])
                    .with_attr("align", cell.attr_str("align"))
            })
            .collect();
        self.insert(table, index, Node::table_row(cells))
    }

    /// Inserts an empty cell at `index` in every row, typed like its neighbour.
    pub fn add_column(&mut self, table: &Path, index: usize) -> Result<(), EditError> {
        let rows = self.table(table)?.content.len();
        for row in 0..rows {
            row_anchor(&self.doc, table, row)?;
            let row_path = table.child(row);
            let cells = &self.node(&row_path)?.content;
            let position = index.min(cells.len());
            let neighbour = &cells[position.saturating_sub(1).min(cells.len() - 1)];
            let cell = Node::new(neighbour.kind, vec![Node::paragraph(vec![])]);
            self.insert(&row_path, position, cell)?;
        }
        Ok(())
    }

    pub fn delete_row(&mut self, table: &Path, index: usize) -> Result<(), EditError> {
        self.table(table)?;
        self.delete(&table.child(index)).map(|_| ())
    }

    /// Removes cell `index` from every row that has one.
    pub fn delete_column(&mut self, table: &Path, index: usize) -> Result<(), EditError> {
        let rows = self.table(table)?.content.len();
        for row in 0..rows {
            row_anchor(&self.doc, table, row)?;
            let row_path = table.child(row);
            if index < self.node(&row_path)?.content.len() {
                self.delete(&row_path.child(index))?;
            }
        }
        Ok(())
    }

    /// Removes the whole table; a parent left empty gets an empty paragraph.
    pub fn delete_table(&mut self, table: &Path) -> Result<(), EditError> {
        self.table(table)?;
        self.tables.retain(|path| path != table);
        self.delete(table)?;

        let parent = table.parent().unwrap_or_default();
        if self.node(&parent)?.content.is_empty() {
            self.insert(&parent, 0, Node::paragraph(vec![]))?;
            self.selection = parent.child(0);
        }
        Ok(())
    }

    /// Validates the edited tree and hands it to `state`.
    ///
    /// On error the state is left exactly as it was.
    pub fn commit(self, state: &mut EditorState) -> Result<(), EditError> {
        self.doc.check()?;
        for path in &self.tables {
            if let Some(table) = self
                .doc
                .node_at(path.as_slice())
                .filter(|node| node.kind == NodeType::Table)
            {
                check_table(table, path)?;
            }
        }
        state.doc = self.doc;
        state.selection = self.selection;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_table;
    use super::*;

    fn state(selection: &str) -> EditorState {
        EditorState::new(
            Node::doc(vec![sample_table(2, 2)]),
            selection.parse().unwrap(),
        )
    }

    #[test]
    fn test_insert_shifts_selection() {
        let state = state("0.1.1.0");
        let mut tr = state.transaction();
        tr.insert(&Path::new(vec![0]), 1, Node::table_row(vec![Node::table_cell(vec![])]))
            .unwrap();
        assert_eq!(tr.selection().to_string(), "0.2.1.0");
        assert_eq!(
            tr.steps(),
            &[Step::Insert {
                path: Path::new(vec![0, 1]),
                kind: NodeType::TableRow
            }]
        );
    }

    #[test]
    fn test_delete_moves_selection_to_sibling() {
        let state = state("0.1.1.0");
        let mut tr = state.transaction();
        tr.delete(&Path::new(vec![0, 1])).unwrap();
        assert_eq!(tr.selection().to_string(), "0.0");
    }

    #[test]
    fn test_set_node_type_keeps_shared_attrs() {
        let mut state = state("0.0.0");
        state.doc.content[0].content[0].content[0].set_attr("align", "right");
        let mut tr = state.transaction();
        tr.set_node_type(&"0.0.0".parse().unwrap(), NodeType::TableCell)
            .unwrap();
        let cell = tr.doc().node_at(&[0, 0, 0]).unwrap();
        assert_eq!(cell.kind, NodeType::TableCell);
        assert_eq!(cell.attr_str("align"), "right");
    }

    #[test]
    fn test_set_attrs_rejects_unknown_names() {
        let state = state("0.0.0");
        let mut tr = state.transaction();
        let mut attrs = Attrs::new();
        attrs.insert("colspan".to_string(), 2i64.into());
        assert!(matches!(
            tr.set_attrs(&"0.0.0".parse().unwrap(), attrs),
            Err(EditError::Schema(SchemaError::UnknownAttribute { .. }))
        ));
    }

    #[test]
    fn test_add_row_copies_reference_cell_types() {
        let state = state("0.0.0");
        let mut tr = state.transaction();
        tr.add_row(&Path::new(vec![0]), 1, 0).unwrap();
        let row = tr.doc().node_at(&[0, 1]).unwrap();
        assert!(row.content.iter().all(|c| c.kind == NodeType::TableHeader));
    }

    #[test]
    fn test_add_column_types_each_row() {
        let state = state("0.0.0");
        let mut tr = state.transaction();
        tr.add_column(&Path::new(vec![0]), 0).unwrap();
        let table = tr.doc().node_at(&[0]).unwrap();
        assert_eq!(table.content[0].content[0].kind, NodeType::TableHeader);
        assert_eq!(table.content[1].content[0].kind, NodeType::TableCell);
        assert_eq!(tr.selection().to_string(), "0.0.1");
    }

    #[test]
    fn test_commit_rejects_broken_invariant() {
        let mut state = state("0.0.0");
        let before = state.clone();
        let mut tr = state.transaction();
        tr.unset_table_header(&Path::new(vec![0])).unwrap();
        assert!(matches!(tr.commit(&mut state), Err(EditError::Invariant(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_commit_rejects_schema_violation() {
        let mut state = state("0.0.0");
        let before = state.clone();
        let mut tr = state.transaction();
        tr.insert(&Path::root(), 0, Node::text("loose")).unwrap();
        assert!(matches!(tr.commit(&mut state), Err(EditError::Schema(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_delete_table_refills_empty_parent() {
        let mut state = state("0.1.1.0");
        let mut tr = state.transaction();
        tr.delete_table(&Path::new(vec![0])).unwrap();
        tr.commit(&mut state).unwrap();
        assert_eq!(state.doc.to_string(), "doc(paragraph)");
        assert_eq!(state.selection.to_string(), "0");
    }
}
