//! Table commands driven through Markdown

use proptest::prelude::*;
use zenn_babel::table::{check_table, EditorState, Path, TableCommand};
use zenn_babel::transforms::{parse, serialize};
use zenn_babel::{EditError, Node, NodeType};

const SAMPLE: &str = "| a | b |\n| --- | --- |\n| c | d |";

fn state_at(markdown: &str, selection: &str) -> EditorState {
    EditorState::new(parse(markdown), selection.parse().unwrap())
}

fn has_table(doc: &Node) -> bool {
    doc.content.iter().any(|block| block.kind == NodeType::Table)
}

#[test]
fn test_add_row_after_in_markdown() {
    let mut state = state_at(SAMPLE, "0.1.1");
    state.apply(TableCommand::AddRowAfter).unwrap();
    assert_eq!(
        serialize(&state.doc),
        "| a | b |\n| --- | --- |\n| c | d |\n|  |  |"
    );
}

#[test]
fn test_add_column_keeps_alignment_of_others() {
    let mut state = state_at("| a | b |\n| :--- | ---: |\n| c | d |", "0.0.0");
    state.apply(TableCommand::AddColumnAfter).unwrap();
    assert_eq!(
        serialize(&state.doc),
        "| a |  | b |\n| :--- | --- | ---: |\n| c |  | d |"
    );
}

#[test]
fn test_delete_header_row_in_markdown() {
    let mut state = state_at(SAMPLE, "0.0.1");
    state.apply(TableCommand::DeleteRow).unwrap();
    assert_eq!(serialize(&state.doc), "| c | d |\n| --- | --- |");
    assert!(check_table(&state.doc.content[0], &Path::new(vec![0])).is_ok());
}

#[test]
fn test_delete_last_row_removes_table() {
    let mut state = state_at("Intro\n\n| a |\n| --- |", "1.0.0");
    state.apply(TableCommand::DeleteRow).unwrap();
    assert!(!has_table(&state.doc));
    assert_eq!(serialize(&state.doc), "Intro");
}

#[test]
fn test_delete_last_column_removes_table() {
    let mut state = state_at("| a |\n| --- |\n| b |\n\nOutro", "0.1.0");
    state.apply(TableCommand::DeleteColumn).unwrap();
    assert!(!has_table(&state.doc));
    assert_eq!(serialize(&state.doc), "Outro");
}

#[test]
fn test_deleting_only_block_leaves_empty_paragraph() {
    let mut state = state_at("| a |\n| --- |", "0.0.0");
    state.apply(TableCommand::DeleteRow).unwrap();
    assert_eq!(state.doc.to_string(), "doc(paragraph)");
    assert_eq!(state.selection, Path::new(vec![0]));
}

#[test]
fn test_command_outside_table_is_rejected() {
    let mut state = state_at("Intro\n\n| a |\n| --- |", "0");
    let before = state.clone();
    assert_eq!(
        state.apply(TableCommand::DeleteRow),
        Err(EditError::NotInTable)
    );
    assert_eq!(state, before);
}

#[test]
fn test_selection_past_the_document_is_rejected() {
    let mut state = state_at(SAMPLE, "0.7.0");
    assert!(matches!(
        state.apply(TableCommand::AddRowAfter),
        Err(EditError::InvalidPath(_))
    ));
}

fn table_shape(doc: &Node) -> Option<(usize, usize)> {
    let table = doc.content.first().filter(|block| block.kind == NodeType::Table)?;
    Some((table.content.len(), table.content[0].content.len()))
}

proptest! {
    #[test]
    fn test_commands_keep_table_invariants(
        steps in prop::collection::vec((0usize..7, 0usize..8, 0usize..8), 1..24)
    ) {
        let mut state = state_at(SAMPLE, "0.0.0");
        for (command, row, column) in steps {
            let Some((rows, columns)) = table_shape(&state.doc) else {
                break;
            };
            let command = TableCommand::ALL[command];
            state.selection = Path::new(vec![0, row % rows, column % columns]);
            let before = state.clone();

            match state.apply(command) {
                Ok(()) => {}
                Err(EditError::Invariant(_)) if command == TableCommand::ToggleHeaderRow => {
                    prop_assert_eq!(&state, &before);
                }
                Err(error) => {
                    return Err(TestCaseError::fail(format!("{} failed: {error}", command.name())));
                }
            }

            prop_assert!(state.doc.check().is_ok());
            if let Some(table) = state.doc.content.first().filter(|b| b.kind == NodeType::Table) {
                prop_assert!(check_table(table, &Path::new(vec![0])).is_ok());
                let width = table.content[0].content.len();
                prop_assert!(table.content.iter().all(|row| row.content.len() == width));
            }
            prop_assert_eq!(parse(&serialize(&state.doc)), state.doc.clone());
        }
    }
}
