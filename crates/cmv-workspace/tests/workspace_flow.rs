//! Workspace flows over the inline backend.

use cmv_core::{CoreError, MainData, Row, Schema, ViewId, ViewSlot};
use cmv_views::{MappedData, RenderRequest, Settings, ViewError};
use cmv_workspace::{
    ComputeBackend, InlineBackend, RequestTicket, ResultOutcome, Workspace, WorkspaceConfig,
    WorkspaceError, WorkspaceResult,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn main_data() -> MainData {
    let rows: Vec<Row> = (0..4)
        .map(|i| {
            json!({"A": i, "B": i * 2, "C": i * 3})
                .as_object()
                .cloned()
                .expect("row object")
        })
        .collect();
    MainData::new(rows, Schema::from_names(["A", "B", "C"]))
}

fn workspace() -> Workspace {
    Workspace::new(WorkspaceConfig::default(), main_data())
}

fn axes(x: &str, y: &str) -> Value {
    json!({"options": {"axisTitles": [x, y]}})
}

#[test]
fn ids_start_at_config_and_unknown_types_fail() {
    let config = WorkspaceConfig {
        start_id: ViewId::new(5),
        ..WorkspaceConfig::default()
    };
    let mut ws = Workspace::new(config, main_data());
    assert_eq!(ws.add_view("scatter").unwrap(), ViewId::new(5));
    assert_eq!(ws.add_view("regression").unwrap(), ViewId::new(6));

    let err = ws.add_view("histogram").unwrap_err();
    assert!(matches!(err, WorkspaceError::View(ViewError::UnknownType { .. })));
}

#[test]
fn latest_request_wins() {
    let mut ws = workspace();
    let mut backend = InlineBackend::new();
    let id = ws.add_view("scatter").unwrap();

    let first = ws.submit_settings(id, &axes("A", "B"), &mut backend).unwrap();
    let second = ws.submit_settings(id, &axes("A", "C"), &mut backend).unwrap();
    assert!(second.seq > first.seq);

    let newest = backend.complete(second).unwrap();
    assert_eq!(ws.apply_message(newest), ResultOutcome::Applied);
    let older = backend.complete(first).unwrap();
    assert_eq!(ws.apply_message(older), ResultOutcome::Stale);

    let Some(ViewSlot::Computed(data)) = ws.dataset().slot(id) else {
        panic!("slot not computed");
    };
    assert_eq!(data.get("y"), Some(&json!([0.0, 3.0, 6.0, 9.0])));
}

#[test]
fn older_result_arriving_first_is_still_stale() {
    let mut ws = workspace();
    let mut backend = InlineBackend::new();
    let id = ws.add_view("scatter").unwrap();

    let first = ws.submit_settings(id, &axes("A", "B"), &mut backend).unwrap();
    ws.submit_settings(id, &axes("A", "C"), &mut backend).unwrap();

    let older = backend.complete(first).unwrap();
    assert_eq!(ws.apply_message(older), ResultOutcome::Stale);
    assert!(ws.dataset().slot(id).is_none());
    assert!(ws.coordinator().is_pending(id));
}

#[test]
fn incomplete_settings_dispatch_nothing() {
    let mut ws = workspace();
    let mut backend = InlineBackend::new();
    let id = ws.add_view("scatter").unwrap();

    let err = ws
        .submit_settings(id, &json!({"options": {"axisTitles": ["A"]}}), &mut backend)
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(e) if e.has_field("options.axisTitles.1")));
    assert_eq!(backend.pending(), 0);
    assert!(!ws.coordinator().is_pending(id));
}

/// A backend that refuses every request.
struct ClosedBackend;

impl ComputeBackend for ClosedBackend {
    fn submit(&mut self, _ticket: RequestTicket, _request: RenderRequest) -> WorkspaceResult<()> {
        Err(WorkspaceError::Backend {
            message: "closed".to_string(),
        })
    }
}

fn axis_titles(ws: &Workspace, id: ViewId) -> Vec<String> {
    match ws.view(id).map(|v| v.settings()) {
        Some(Settings::Scatter(s)) => s.options.axis_titles.clone(),
        other => panic!("unexpected settings {other:?}"),
    }
}

#[test]
fn refused_dispatch_changes_nothing() {
    let mut ws = workspace();
    let mut backend = InlineBackend::new();
    let id = ws.add_view("scatter").unwrap();
    let first = ws.submit_settings(id, &axes("A", "B"), &mut backend).unwrap();

    let err = ws
        .submit_settings(id, &axes("A", "C"), &mut ClosedBackend)
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::Backend { .. }));
    assert_eq!(axis_titles(&ws, id), ["A", "B"]);
    assert!(ws.coordinator().is_latest(first));

    let message = backend.complete(first).unwrap();
    assert_eq!(ws.apply_message(message), ResultOutcome::Applied);
    assert!(!ws.coordinator().is_pending(id));
}

#[test]
fn refused_first_dispatch_leaves_nothing_pending() {
    let mut ws = workspace();
    let id = ws.add_view("scatter").unwrap();
    assert!(ws.submit_settings(id, &axes("A", "B"), &mut ClosedBackend).is_err());
    assert!(!ws.coordinator().is_pending(id));
    assert_eq!(ws.coordinator().pending_count(), 0);
    assert!(axis_titles(&ws, id).is_empty());
}

#[test]
fn removed_view_results_are_stale() {
    let mut ws = workspace();
    let mut backend = InlineBackend::new();
    let id = ws.add_view("scatter").unwrap();
    let ticket = ws.submit_settings(id, &axes("A", "B"), &mut backend).unwrap();

    ws.remove_view(id).unwrap();
    let message = backend.complete(ticket).unwrap();
    assert_eq!(ws.apply_message(message), ResultOutcome::Stale);
    assert!(ws.dataset().slot(id).is_none());
    assert!(matches!(
        ws.remove_view(id),
        Err(WorkspaceError::ViewNotFound(missing)) if missing == id
    ));
}

#[test]
fn backend_failure_is_reported_and_slot_untouched() {
    let mut ws = workspace();
    let mut backend = InlineBackend::new();
    let id = ws.add_view("regression").unwrap();
    let values = json!({"method": "SVR", "featureColumns": ["A"], "targetColumn": "B"});
    ws.submit_settings(id, &values, &mut backend).unwrap();

    let message = backend.complete_next().unwrap();
    assert!(matches!(ws.apply_message(message), ResultOutcome::Failed { .. }));
    assert!(ws.dataset().slot(id).is_none());
}

#[test]
fn render_follows_results_and_dataset_changes() {
    let mut ws = workspace();
    let mut backend = InlineBackend::new();
    let id = ws.add_view("scatter").unwrap();

    assert_eq!(ws.render(id).unwrap().unwrap().data, MappedData::Empty);
    assert!(ws.render(id).unwrap().is_none());

    ws.submit_settings(id, &axes("A", "B"), &mut backend).unwrap();
    let message = backend.complete_next().unwrap();
    ws.apply_message(message);
    let payload = ws.render(id).unwrap().unwrap();
    assert!(matches!(payload.data, MappedData::Data(_)));
    assert!(ws.render(id).unwrap().is_none());

    // The anchor column "A" disappears from the new table.
    ws.replace_dataset(MainData::new(Vec::new(), Schema::from_names(["B", "C"])))
        .unwrap();
    assert_eq!(ws.render(id).unwrap().unwrap().data, MappedData::Reset);
    assert!(ws.render(id).unwrap().is_none());
}

#[test]
fn duplicate_schema_columns_are_refused() {
    let mut ws = workspace();
    let before = ws.dataset().version();
    let err = ws
        .replace_dataset(MainData::new(Vec::new(), Schema::from_names(["A", "A"])))
        .unwrap_err();
    assert!(matches!(
        err,
        WorkspaceError::Core(CoreError::DuplicateField { ref name }) if name == "A"
    ));
    assert_eq!(ws.dataset().version(), before);
    assert!(ws.dataset().main.schema.has_field("C"));
}

#[test]
fn selection_is_carried_in_the_payload() {
    let mut ws = workspace();
    let id = ws.add_view("scatter").unwrap();
    ws.render(id).unwrap();

    ws.select(id, vec![2, 0, 2]).unwrap();
    assert_eq!(ws.render(id).unwrap().unwrap().selected_indices, vec![0, 2]);
    ws.clear_selection(id).unwrap();
    assert!(ws.render(id).unwrap().unwrap().selected_indices.is_empty());
}

proptest! {
    #[test]
    fn only_the_newest_submission_lands(
        order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let mut ws = workspace();
        let mut backend = InlineBackend::new();
        let id = ws.add_view("scatter").unwrap();
        let columns = ["A", "B", "C", "A", "B"];
        let tickets: Vec<_> = columns
            .iter()
            .map(|y| ws.submit_settings(id, &axes("A", y), &mut backend).unwrap())
            .collect();

        let mut applied = 0;
        for index in order {
            let message = backend.complete(tickets[index]).unwrap();
            let outcome = ws.apply_message(message);
            if index == tickets.len() - 1 {
                prop_assert_eq!(outcome, ResultOutcome::Applied);
                applied += 1;
            } else {
                prop_assert_eq!(outcome, ResultOutcome::Stale);
            }
        }
        prop_assert_eq!(applied, 1);
        let Some(ViewSlot::Computed(data)) = ws.dataset().slot(id) else {
            panic!("slot not computed");
        };
        prop_assert_eq!(data.get("y"), Some(&json!([0.0, 2.0, 4.0, 6.0])));
    }
}
