mod common;

use common::{EventLog, FakeTransport, MemoryGrid};
use editable_grid::{
    ConfigError, DataGrid, DisplayType, Editable, Editor, EditorBase, Event, EventKind,
    FieldSchema, Options, RowData, RowState, RowToken, SourceSpec, TextOptions,
};
use serde_json::{json, Map, Value};

fn required_string_editor() -> Editor {
    Editor::StringInput(TextOptions {
        base: EditorBase {
            required: true,
            ..EditorBase::default()
        },
        ..TextOptions::default()
    })
}

fn article_row(id: Value, title: &str) -> RowData {
    let mut data = Map::new();
    data.insert("id".to_string(), id);
    data.insert("title".to_string(), json!(title));
    data.insert("notes".to_string(), json!("read-only"));
    data
}

fn article_options() -> Options {
    Options {
        update_source: Some(SourceSpec::Url("http://api.test/update".into())),
        delete_source: Some(SourceSpec::Url("http://api.test/delete".into())),
        create_source: Some(SourceSpec::Url("http://api.test/create".into())),
        row_identifier_field: "id".into(),
        fields: vec![
            FieldSchema::new("id", DisplayType::Number),
            FieldSchema::new("title", DisplayType::String).with_editor(required_string_editor()),
            FieldSchema::new("notes", DisplayType::String),
        ],
        ..Options::default()
    }
}

fn article_engine() -> (Editable<MemoryGrid>, FakeTransport, EventLog, RowToken) {
    let grid = MemoryGrid::seed(vec![article_row(json!(42), "old")]);
    let token = grid.tokens()[0];
    let transport = FakeTransport::new();
    let engine =
        Editable::with_transport(article_options(), grid, Box::new(transport.clone())).unwrap();
    let log = EventLog::new();
    log.attach(&engine);
    (engine, transport, log, token)
}

#[test]
fn begin_edit_renders_editors_only_for_editable_fields() {
    let (mut engine, _transport, log, token) = article_engine();

    engine.begin_edit(token).unwrap();

    assert_eq!(engine.state(token), RowState::Editing);
    let elements = engine.elements(token).unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].0, "title");
    assert_eq!(elements[0].1.read_value(), json!("old"));

    let events = log.events();
    assert_eq!(log.count(EventKind::Edit), 1);
    let Event::Edit { elements, .. } = &events[0] else {
        panic!("expected an edit event first");
    };
    assert_eq!(elements.len(), 1);
}

#[test]
fn begin_edit_twice_is_a_noop() {
    let (mut engine, _transport, log, token) = article_engine();

    engine.begin_edit(token).unwrap();
    engine.begin_edit(token).unwrap();

    assert_eq!(engine.state(token), RowState::Editing);
    assert_eq!(log.count(EventKind::Edit), 1);
}

#[test]
fn begin_edit_without_any_editor_is_a_config_error() {
    let mut options = article_options();
    for field in &mut options.fields {
        field.editor = None;
    }
    let grid = MemoryGrid::seed(vec![article_row(json!(42), "old")]);
    let token = grid.tokens()[0];
    let mut engine =
        Editable::with_transport(options, grid, Box::new(FakeTransport::new())).unwrap();

    assert!(matches!(
        engine.begin_edit(token),
        Err(ConfigError::NoEditableField)
    ));
}

#[test]
fn cancel_restores_the_pre_edit_snapshot() {
    let (mut engine, _transport, log, token) = article_engine();
    let original = engine.grid().get(token).unwrap().clone();

    engine.begin_edit(token).unwrap();
    engine.set_input_value(token, "title", &json!("mutated"));
    engine.set_input_value(token, "title", &json!("mutated again"));
    engine.cancel_edit(token);

    assert_eq!(engine.state(token), RowState::Display);
    assert_eq!(engine.grid().get(token).unwrap(), &original);
    assert!(engine.elements(token).is_none());
    assert_eq!(log.count(EventKind::Cancel), 1);
    assert_eq!(log.count(EventKind::Cancelled), 1);
}

#[tokio::test]
async fn validation_short_circuits_at_the_first_invalid_field() {
    let options = Options {
        update_source: Some(SourceSpec::Url("http://api.test/update".into())),
        row_identifier_field: "id".into(),
        fields: vec![
            FieldSchema::new("id", DisplayType::Number),
            FieldSchema::new("a", DisplayType::String)
                .with_editor(Editor::StringInput(TextOptions::default())),
            FieldSchema::new("b", DisplayType::String).with_editor(required_string_editor()),
            FieldSchema::new("c", DisplayType::String)
                .with_editor(Editor::StringInput(TextOptions::default())),
        ],
        ..Options::default()
    };
    let mut data = Map::new();
    data.insert("id".to_string(), json!(1));
    data.insert("a".to_string(), json!("x"));
    data.insert("b".to_string(), json!("present"));
    data.insert("c".to_string(), json!("y"));
    let grid = MemoryGrid::seed(vec![data.clone()]);
    let token = grid.tokens()[0];
    let transport = FakeTransport::new();
    let mut engine =
        Editable::with_transport(options, grid, Box::new(transport.clone())).unwrap();
    let log = EventLog::new();
    log.attach(&engine);

    engine.begin_edit(token).unwrap();
    engine.set_input_value(token, "b", &json!(""));
    engine.submit_edit(token).await.unwrap();

    assert_eq!(log.count(EventKind::InputValid), 1);
    assert_eq!(log.count(EventKind::InputInvalid), 1);
    let invalid = log
        .events()
        .into_iter()
        .find_map(|event| match event {
            Event::InputInvalid { field, message, .. } => Some((field, message)),
            _ => None,
        })
        .unwrap();
    assert_eq!(invalid.0, "b");
    assert!(!invalid.1.is_empty());

    // Nothing was sent and nothing was applied.
    assert!(transport.calls().is_empty());
    assert_eq!(engine.grid().get(token).unwrap(), &data);
    assert_eq!(engine.state(token), RowState::Editing);
}

#[tokio::test]
async fn submit_merges_values_and_emits_updated() {
    let (mut engine, transport, log, token) = article_engine();
    transport.push_ok(json!({"content": {"result": "ok"}}));

    engine.begin_edit(token).unwrap();
    engine.set_input_value(token, "title", &json!("new"));
    engine.submit_edit(token).await.unwrap();

    assert_eq!(engine.state(token), RowState::Display);
    assert_eq!(engine.grid().get(token).unwrap()["title"], json!("new"));

    assert_eq!(log.count(EventKind::Updated), 1);
    let updated = log
        .events()
        .into_iter()
        .find_map(|event| match event {
            Event::Updated {
                row_data,
                old_row_data,
                response,
                ..
            } => Some((row_data, old_row_data, response)),
            _ => None,
        })
        .unwrap();
    assert_eq!(updated.0["title"], json!("new"));
    assert_eq!(updated.1["title"], json!("old"));
    assert_eq!(updated.2, json!({"content": {"result": "ok"}}));

    // The payload carries the identifier and the editable field, and never
    // a field that has no editor.
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "PUT");
    assert_eq!(calls[0].body["id"], json!(42));
    assert_eq!(calls[0].body["title"], json!("new"));
    assert!(!calls[0].body.contains_key("notes"));
}

#[tokio::test]
async fn submit_failure_keeps_the_row_editing_for_retry() {
    let (mut engine, transport, log, token) = article_engine();
    transport.push_status(500);

    engine.begin_edit(token).unwrap();
    engine.set_input_value(token, "title", &json!("new"));
    engine.submit_edit(token).await.unwrap();

    assert_eq!(engine.state(token), RowState::Editing);
    assert_eq!(engine.grid().get(token).unwrap()["title"], json!("old"));
    assert_eq!(log.count(EventKind::HttpError), 1);
    assert_eq!(log.count(EventKind::Updated), 0);

    // The widget state survived; the same user action succeeds on retry.
    transport.push_ok(json!({"content": {"result": "ok"}}));
    engine.submit_edit(token).await.unwrap();
    assert_eq!(engine.state(token), RowState::Display);
    assert_eq!(engine.grid().get(token).unwrap()["title"], json!("new"));
}

#[tokio::test]
async fn submit_without_an_update_endpoint_is_a_config_error() {
    let mut options = article_options();
    options.update_source = None;
    let grid = MemoryGrid::seed(vec![article_row(json!(42), "old")]);
    let token = grid.tokens()[0];
    let mut engine =
        Editable::with_transport(options, grid, Box::new(FakeTransport::new())).unwrap();

    engine.begin_edit(token).unwrap();
    assert!(matches!(
        engine.submit_edit(token).await,
        Err(ConfigError::MissingEndpoint("update"))
    ));
}

#[test]
fn add_row_allows_a_single_unsaved_row() {
    let (mut engine, _transport, log, _token) = article_engine();

    let first = engine.add_row().unwrap();
    assert!(first.is_some());
    assert_eq!(engine.grid().len(), 2);

    let second = engine.add_row().unwrap();
    assert!(second.is_none());
    assert_eq!(engine.grid().len(), 2);
    assert_eq!(log.count(EventKind::NewRow), 1);

    // The unsaved row sits at the top of the page with one editor per
    // field; fields without an editor fall back to a string input.
    let row = first.unwrap();
    assert_eq!(engine.grid().index(row), Some(0));
    assert_eq!(engine.state(row), RowState::NewUnsaved);
    assert_eq!(engine.elements(row).unwrap().len(), 3);
}

#[tokio::test]
async fn save_new_row_takes_its_identifier_from_the_response() {
    let (mut engine, transport, log, _token) = article_engine();
    transport.push_ok(json!({"content": {"result": 7}}));

    let row = engine.add_row().unwrap().unwrap();
    engine.set_input_value(row, "title", &json!("fresh"));
    engine.save_new_row(row).await.unwrap();

    assert_eq!(engine.state(row), RowState::Display);
    let data = engine.grid().get(row).unwrap();
    assert_eq!(data["id"], json!(7));
    assert_eq!(data["title"], json!("fresh"));
    assert_eq!(log.count(EventKind::NewRowSave), 1);
    assert_eq!(log.count(EventKind::NewRowSaved), 1);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].url, "http://api.test/create");

    // The slot is free again.
    assert!(engine.add_row().unwrap().is_some());
}

#[tokio::test]
async fn save_new_row_without_an_identifier_stays_unsaved() {
    let (mut engine, transport, log, _token) = article_engine();
    transport.push_ok(json!({"ok": true}));

    let row = engine.add_row().unwrap().unwrap();
    engine.set_input_value(row, "title", &json!("fresh"));
    engine.save_new_row(row).await.unwrap();

    assert_eq!(engine.state(row), RowState::NewUnsaved);
    assert_eq!(log.count(EventKind::Error), 1);
    assert_eq!(log.count(EventKind::NewRowSaved), 0);
    // Still pending: no second unsaved row allowed.
    assert!(engine.add_row().unwrap().is_none());
}

#[test]
fn cancel_new_row_removes_it_without_a_request() {
    let (mut engine, transport, log, _token) = article_engine();

    let row = engine.add_row().unwrap().unwrap();
    engine.cancel_new_row(row);

    assert_eq!(engine.grid().len(), 1);
    assert!(transport.calls().is_empty());
    assert_eq!(log.count(EventKind::NewRowCancel), 1);
    assert_eq!(log.count(EventKind::NewRowCancelled), 1);
    assert!(engine.add_row().unwrap().is_some());
}

#[tokio::test]
async fn delete_success_removes_the_row() {
    let (mut engine, transport, log, token) = article_engine();
    transport.push_ok(Value::Null);

    engine.begin_delete(token).await.unwrap();

    assert_eq!(engine.grid().len(), 0);
    assert_eq!(log.count(EventKind::Delete), 1);
    assert_eq!(log.count(EventKind::Deleted), 1);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "DELETE");
    assert_eq!(calls[0].body["id"], json!(42));
}

#[tokio::test]
async fn delete_failure_keeps_the_row_in_the_grid() {
    let (mut engine, transport, log, token) = article_engine();
    transport.push_status(404);

    engine.begin_delete(token).await.unwrap();

    assert_eq!(engine.grid().len(), 1);
    assert_eq!(log.count(EventKind::Deleted), 0);
    let status = log
        .events()
        .into_iter()
        .find_map(|event| match event {
            Event::HttpError { status, .. } => Some(status),
            _ => None,
        })
        .unwrap();
    assert_eq!(status, 404);

    // Back on display: the row can go straight into an edit.
    assert_eq!(engine.state(token), RowState::Display);
    engine.begin_edit(token).unwrap();
    assert_eq!(engine.state(token), RowState::Editing);
}

#[tokio::test]
async fn delete_can_be_vetoed_by_the_host() {
    let (mut engine, transport, log, token) = article_engine();
    engine.set_delete_confirm(|_, _| false);

    engine.begin_delete(token).await.unwrap();

    assert_eq!(log.count(EventKind::Delete), 1);
    assert!(transport.calls().is_empty());
    assert_eq!(engine.grid().len(), 1);
    assert_eq!(engine.state(token), RowState::Display);
}

#[tokio::test]
async fn delete_falls_back_to_the_row_index_without_an_identifier() {
    let grid = MemoryGrid::seed(vec![article_row(Value::Null, "unsaved")]);
    let token = grid.tokens()[0];
    let transport = FakeTransport::new();
    transport.push_ok(Value::Null);
    let mut engine =
        Editable::with_transport(article_options(), grid, Box::new(transport.clone())).unwrap();

    engine.begin_delete(token).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body["id"], json!(0));
}

#[tokio::test]
async fn handle_action_routes_by_widget_name() {
    let (mut engine, _transport, log, token) = article_engine();

    engine.handle_action("edit-row-icon", token).await.unwrap();
    assert_eq!(engine.state(token), RowState::Editing);

    engine.handle_action("cancel-row-edit-icon", token).await.unwrap();
    assert_eq!(engine.state(token), RowState::Display);

    log.clear();
    engine.handle_action("sort-column-icon", token).await.unwrap();
    assert!(log.events().is_empty());
}

#[test]
fn double_click_surfaces_the_row() {
    let (mut engine, _transport, log, token) = article_engine();

    engine.handle_double_click(token);

    assert_eq!(log.count(EventKind::RowDblClick), 1);
}
