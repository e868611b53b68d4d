use rschedule::db::access::QueryName;
use rschedule::errors::AppError;
use rschedule::schedule::edit::{CommitOutcome, FieldState, validate_priority};
use rschedule::schedule::{
    DiffSync, EditField, EventSink, PollOutcome, RebuildSync, ScheduleBoard, ScheduleEvent,
    ViewOp,
};
use rusqlite::types::Value;
use std::sync::mpsc::Receiver;
use std::time::Duration;

mod common;
use common::{RecordingPresenter, ScriptedData, record, records};

fn open_board(
    schedules: Vec<Result<Vec<Vec<Value>>, String>>,
) -> (ScheduleBoard<ScriptedData>, RecordingPresenter, Receiver<ScheduleEvent>) {
    let presenter = RecordingPresenter::default();
    let (events, rx) = EventSink::channel();
    let mut board = ScheduleBoard::open(
        "laser",
        ScriptedData::with_schedules(schedules),
        Box::new(RebuildSync::new(Box::new(presenter.clone()))),
        events,
    )
    .expect("initial load");
    board.start(Duration::from_millis(10));
    (board, presenter, rx)
}

fn open_diff_board(
    schedules: Vec<Result<Vec<Vec<Value>>, String>>,
) -> (ScheduleBoard<ScriptedData>, RecordingPresenter, Receiver<ScheduleEvent>) {
    let presenter = RecordingPresenter::default();
    let (events, rx) = EventSink::channel();
    let mut board = ScheduleBoard::open(
        "laser",
        ScriptedData::with_schedules(schedules),
        Box::new(DiffSync::new(Box::new(presenter.clone()))),
        events,
    )
    .expect("initial load");
    board.start(Duration::from_millis(10));
    (board, presenter, rx)
}

fn row_is_dirty(board: &ScheduleBoard<ScriptedData>, job: &str) -> bool {
    board
        .rows()
        .iter()
        .find(|r| r.job_number() == job)
        .map(|r| r.dirty)
        .unwrap_or(false)
}

#[test]
fn editing_marks_row_dirty_without_network() {
    let (mut board, presenter, _rx) = open_board(vec![Ok(records(&["J1", "J2", "J3"]))]);
    let calls_before = board.data_mut().calls.len();

    board.edit_field("J2", EditField::Priority, "005").unwrap();

    assert!(row_is_dirty(&board, "J2"));
    assert!(!row_is_dirty(&board, "J1"));
    assert_eq!(board.data_mut().calls.len(), calls_before);
    assert!(matches!(
        presenter.last_batch().as_slice(),
        [ViewOp::Update { index: 1, row }] if row.dirty && row.display_fields().priority == "005"
    ));
}

#[test]
fn successful_commit_clears_dirty_and_next_poll_stays_clean() {
    let mut after = records(&["J1", "J2", "J3"]);
    after[1][0] = Value::Integer(5);
    let (mut board, _presenter, rx) = open_board(vec![
        Ok(records(&["J1", "J2", "J3"])),
        Ok(after),
    ]);

    board.edit_field("J2", EditField::Priority, "005").unwrap();
    let outcome = board.commit("J2").unwrap();
    assert!(matches!(outcome, CommitOutcome::Committed(ref f) if f.priority == "005"));
    assert!(!row_is_dirty(&board, "J2"));
    assert!(board.edits().is_empty());

    let params = board
        .data_mut()
        .last_params(QueryName::UpdateJobFields)
        .cloned()
        .unwrap();
    assert_eq!(
        params,
        vec![
            Value::Text("ref-J2".into()),
            Value::Integer(5),
            Value::Text("S235".into()),
            Value::Text("2".into()),
        ]
    );

    assert!(matches!(board.tick(), PollOutcome::Applied(_)));
    let j2 = board.rows().iter().find(|r| r.job_number() == "J2").unwrap();
    assert_eq!(j2.display_fields().priority, "005");
    assert!(!j2.dirty);

    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&ScheduleEvent::EditCommitted { job: "J2".into() }));
}

#[test]
fn failed_commit_keeps_the_edit_and_names_the_job() {
    let (mut board, _presenter, rx) = open_board(vec![Ok(records(&["J1", "J2"]))]);
    board.data_mut().fail_writes = true;

    board.edit_field("J1", EditField::Material, "AISI304").unwrap();
    let err = board.commit("J1").unwrap_err();

    assert!(matches!(err, AppError::Write { ref job, .. } if job == "J1"));
    assert!(row_is_dirty(&board, "J1"));
    let session = board.edits().session("J1").unwrap();
    assert_eq!(session.state, FieldState::Editing);
    assert_eq!(session.pending.material, "AISI304");

    let j1 = board.rows().iter().find(|r| r.job_number() == "J1").unwrap();
    assert_eq!(j1.data.material, "S235");

    let events: Vec<_> = rx.try_iter().collect();
    assert!(matches!(
        events.as_slice(),
        [ScheduleEvent::EditFailed { job, .. }] if job == "J1"
    ));

    // no automatic retry
    assert_eq!(board.data_mut().count(QueryName::UpdateJobFields), 1);
}

#[test]
fn invalid_priority_is_rejected_before_writing() {
    let (mut board, _presenter, _rx) = open_board(vec![Ok(records(&["J1"]))]);

    board.edit_field("J1", EditField::Priority, "abc").unwrap();
    let err = board.commit("J1").unwrap_err();

    assert!(matches!(err, AppError::InvalidPriority { .. }));
    assert_eq!(board.data_mut().count(QueryName::UpdateJobFields), 0);
    assert!(row_is_dirty(&board, "J1"));
}

#[test]
fn priority_validation() {
    assert_eq!(validate_priority("005"), Some(5));
    assert_eq!(validate_priority(" 12 "), Some(12));
    assert_eq!(validate_priority("999"), Some(999));
    assert_eq!(validate_priority("0"), None);
    assert_eq!(validate_priority("1000"), None);
    assert_eq!(validate_priority("-3"), None);
    assert_eq!(validate_priority(""), None);
}

#[test]
fn commit_without_session_is_a_no_op() {
    let (mut board, _presenter, rx) = open_board(vec![Ok(records(&["J1"]))]);
    assert_eq!(board.commit("J1").unwrap(), CommitOutcome::NothingToCommit);
    assert_eq!(board.data_mut().count(QueryName::UpdateJobFields), 0);
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn editing_unknown_job_fails() {
    let (mut board, _presenter, _rx) = open_board(vec![Ok(records(&["J1"]))]);
    let err = board.edit_field("J9", EditField::Material, "x").unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref j) if j == "J9"));
}

#[test]
fn revert_drops_the_local_buffer() {
    let (mut board, _presenter, _rx) = open_board(vec![Ok(records(&["J1"]))]);
    board.edit_field("J1", EditField::MaterialQty, "40").unwrap();

    assert!(board.revert("J1"));
    assert!(!row_is_dirty(&board, "J1"));
    assert!(!board.revert("J1"));
    assert_eq!(board.data_mut().count(QueryName::UpdateJobFields), 0);
}

#[test]
fn pending_edit_survives_a_rebuild() {
    let (mut board, _presenter, rx) = open_board(vec![
        Ok(records(&["J1", "J2"])),
        Ok(records(&["J1", "J2", "J3"])),
    ]);
    board.edit_field("J1", EditField::Material, "AISI304").unwrap();

    assert!(matches!(board.tick(), PollOutcome::Applied(_)));

    let j1 = board.rows().iter().find(|r| r.job_number() == "J1").unwrap();
    assert!(j1.dirty);
    assert!(!j1.conflict);
    assert_eq!(j1.display_fields().material, "AISI304");
    assert!(board.edits().is_dirty("J1"));

    let events: Vec<_> = rx.try_iter().collect();
    assert!(!events.iter().any(|e| matches!(e, ScheduleEvent::EditConflict { .. })));
}

#[test]
fn upstream_change_to_an_edited_field_is_flagged_once() {
    let mut moved = records(&["J1", "J2"]);
    moved[0][3] = Value::Text("DC01".into());
    let mut moved_again = moved.clone();
    moved_again[0][9] = Value::Text("check drawing".into());
    let (mut board, _presenter, rx) = open_board(vec![
        Ok(records(&["J1", "J2"])),
        Ok(moved),
        Ok(moved_again),
    ]);
    board.edit_field("J1", EditField::Material, "AISI304").unwrap();

    board.tick();
    board.tick();

    let j1 = board.rows().iter().find(|r| r.job_number() == "J1").unwrap();
    assert!(j1.dirty && j1.conflict);
    assert_eq!(j1.display_fields().material, "AISI304");

    let conflicts = rx
        .try_iter()
        .filter(|e| matches!(e, ScheduleEvent::EditConflict { job } if job == "J1"))
        .count();
    assert_eq!(conflicts, 1);

    // the local save still wins
    board.commit("J1").unwrap();
    let j1 = board.rows().iter().find(|r| r.job_number() == "J1").unwrap();
    assert!(!j1.dirty && !j1.conflict);
    assert_eq!(j1.data.material, "AISI304");
}

#[test]
fn upstream_change_to_another_field_is_not_a_conflict() {
    let mut moved = records(&["J1"]);
    moved[0][4] = Value::Text("9".into());
    let (mut board, _presenter, rx) = open_board(vec![Ok(records(&["J1"])), Ok(moved)]);
    board.edit_field("J1", EditField::Material, "AISI304").unwrap();

    board.tick();

    let j1 = &board.rows()[0];
    assert!(j1.dirty && !j1.conflict);
    assert_eq!(j1.display_fields().material_qty, "9");
    assert_eq!(j1.display_fields().material, "AISI304");
    assert!(!rx
        .try_iter()
        .any(|e| matches!(e, ScheduleEvent::EditConflict { .. })));

    // the upstream quantity is written back, not the one seen at edit time
    board.commit("J1").unwrap();
    assert_eq!(
        board.data_mut().last_params(QueryName::UpdateJobFields).cloned().unwrap(),
        vec![
            Value::Text("ref-J1".into()),
            Value::Integer(1),
            Value::Text("AISI304".into()),
            Value::Text("9".into()),
        ]
    );
}

#[test]
fn material_edit_saves_on_a_priority_zero_row() {
    let (mut board, _presenter, _rx) = open_board(vec![Ok(vec![record("J1", 0)])]);

    board.edit_field("J1", EditField::Material, "S355").unwrap();
    let outcome = board.commit("J1").unwrap();

    assert!(matches!(outcome, CommitOutcome::Committed(ref f) if f.material == "S355"));
    assert!(!row_is_dirty(&board, "J1"));
    let params = board
        .data_mut()
        .last_params(QueryName::UpdateJobFields)
        .cloned()
        .unwrap();
    assert_eq!(params[1], Value::Integer(0));
    assert_eq!(params[2], Value::Text("S355".into()));
}

#[test]
fn touched_priority_of_zero_is_still_rejected() {
    let (mut board, _presenter, _rx) = open_board(vec![Ok(vec![record("J1", 4)])]);

    board.edit_field("J1", EditField::Priority, "000").unwrap();
    let err = board.commit("J1").unwrap_err();

    assert!(matches!(err, AppError::InvalidPriority { ref value, .. } if value == "000"));
    assert_eq!(board.data_mut().count(QueryName::UpdateJobFields), 0);
}

#[test]
fn untouched_priority_change_upstream_is_kept_on_commit() {
    let mut moved = records(&["J1"]);
    moved[0][0] = Value::Integer(42);
    let (mut board, _presenter, _rx) = open_board(vec![Ok(records(&["J1"])), Ok(moved)]);
    board.edit_field("J1", EditField::MaterialQty, "12").unwrap();

    board.tick();
    assert_eq!(board.rows()[0].display_fields().priority, "042");

    board.commit("J1").unwrap();
    let params = board
        .data_mut()
        .last_params(QueryName::UpdateJobFields)
        .cloned()
        .unwrap();
    assert_eq!(params[1], Value::Integer(42));
    assert_eq!(params[3], Value::Text("12".into()));
}

#[test]
fn edit_is_discarded_when_its_row_vanishes() {
    let (mut board, _presenter, rx) = open_board(vec![
        Ok(records(&["J1", "J2"])),
        Ok(vec![record("J1", 1)]),
    ]);
    board.edit_field("J2", EditField::Priority, "7").unwrap();

    board.tick();

    assert!(board.edits().session("J2").is_none());
    assert_eq!(board.rows().len(), 1);
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&ScheduleEvent::EditDiscarded { job: "J2".into() }));
}

#[test]
fn diff_sync_updates_an_edited_row_in_place_and_keeps_the_edit() {
    let mut moved = records(&["J1", "J2"]);
    moved[0][4] = Value::Text("9".into());
    let (mut board, presenter, rx) =
        open_diff_board(vec![Ok(records(&["J1", "J2"])), Ok(moved)]);
    board.edit_field("J1", EditField::Material, "AISI304").unwrap();

    assert!(matches!(board.tick(), PollOutcome::Applied(_)));

    let batch = presenter.last_batch();
    assert_eq!(batch.len(), 1);
    match &batch[0] {
        ViewOp::Update { index: 0, row } => {
            assert!(row.dirty && !row.conflict);
            let shown = row.display_fields();
            assert_eq!(shown.material, "AISI304");
            assert_eq!(shown.material_qty, "9");
        }
        other => panic!("expected an in-place update, got {other:?}"),
    }
    assert!(board.edits().is_dirty("J1"));
    assert!(!rx.try_iter().any(|e| matches!(e, ScheduleEvent::EditConflict { .. })));
}

#[test]
fn diff_sync_flags_a_conflicting_edit() {
    let mut moved = records(&["J1"]);
    moved[0][3] = Value::Text("DC01".into());
    let (mut board, presenter, rx) = open_diff_board(vec![Ok(records(&["J1"])), Ok(moved)]);
    board.edit_field("J1", EditField::Material, "AISI304").unwrap();

    board.tick();

    assert!(matches!(
        presenter.last_batch().as_slice(),
        [ViewOp::Update { index: 0, row }]
            if row.dirty && row.conflict && row.display_fields().material == "AISI304"
    ));
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&ScheduleEvent::EditConflict { job: "J1".into() }));
}

#[test]
fn diff_sync_removes_a_vanished_edited_row_and_discards_its_edit() {
    let (mut board, presenter, rx) = open_diff_board(vec![
        Ok(records(&["J1", "J2"])),
        Ok(vec![record("J1", 1)]),
    ]);
    board.edit_field("J2", EditField::MaterialQty, "30").unwrap();

    board.tick();

    assert_eq!(
        presenter.last_batch(),
        vec![ViewOp::Remove { job: "J2".into() }]
    );
    assert!(board.edits().session("J2").is_none());
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&ScheduleEvent::EditDiscarded { job: "J2".into() }));
}
