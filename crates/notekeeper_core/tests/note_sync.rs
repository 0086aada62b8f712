mod common;

use common::{logged_in, sync_in_memory, FakeNotesApi};
use notekeeper_core::sync::note_sync::{
    DELETE_FAILED_MESSAGE, FETCH_FAILED_MESSAGE, SAVE_FAILED_MESSAGE,
};
use notekeeper_core::{ClientError, Method, NoteId, NoteInput, SyncState};

fn input(title: &str, content: &str) -> NoteInput {
    NoteInput::new(title, content).unwrap()
}

#[test]
fn refresh_replaces_the_whole_list() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.seed_note("u1", "first", "a");
    api.seed_note("u2", "someone else", "b");

    sync.refresh().unwrap();
    let titles: Vec<&str> = sync.notes().iter().map(|note| note.title.as_str()).collect();
    assert_eq!(titles, vec!["first"]);
    assert_eq!(sync.state(), &SyncState::Idle);

    api.seed_note("u1", "second", "c");
    sync.refresh().unwrap();
    assert_eq!(sync.notes().len(), 2);
}

#[test]
fn create_then_refresh_exactly_once() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);

    let created = sync.create(&input("T", "C")).unwrap().unwrap();
    assert_eq!(created.title, "T");
    assert_eq!(api.count(Method::Post, "/notes"), 1);
    assert_eq!(api.count(Method::Get, "/notes"), 1);
    assert_eq!(sync.refresh_count(), 1);

    let listed = sync
        .notes()
        .iter()
        .find(|note| note.id == created.id)
        .unwrap();
    assert_eq!(listed.title, "T");
    assert_eq!(listed.content, "C");
}

#[test]
fn update_is_visible_after_the_call_returns() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    let id = NoteId::new(api.seed_note("u1", "old", "old body"));
    sync.refresh().unwrap();

    sync.update(&id, &input("new", "new body")).unwrap();
    let note = sync.notes().iter().find(|note| note.id == id).unwrap();
    assert_eq!(note.title, "new");
    assert_eq!(note.content, "new body");
    assert_eq!(api.count(Method::Get, "/notes"), 2);
}

#[test]
fn delete_removes_note_after_refresh() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    let keep = api.seed_note("u1", "keep", "k");
    let drop = NoteId::new(api.seed_note("u1", "drop", "d"));
    sync.refresh().unwrap();

    sync.delete(&drop).unwrap();
    let ids: Vec<&str> = sync.notes().iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, vec![keep.as_str()]);
}

#[test]
fn failed_save_leaves_list_untouched_and_skips_refresh() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.seed_note("u1", "existing", "e");
    sync.refresh().unwrap();
    let before = sync.notes().to_vec();
    api.reply_next(Method::Post, "/notes", 500, r#"{"detail":"boom"}"#);

    match sync.create(&input("T", "C")) {
        Err(ClientError::Failed { status, message }) => {
            assert_eq!(status, Some(500));
            assert_eq!(message, SAVE_FAILED_MESSAGE);
        }
        other => panic!("expected save failure, got {other:?}"),
    }
    assert_eq!(sync.notes(), before.as_slice());
    assert_eq!(api.count(Method::Get, "/notes"), 1);
}

#[test]
fn failed_update_of_missing_note_reports_save_failed() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);

    let err = sync
        .update(&NoteId::new("missing"), &input("T", "C"))
        .unwrap_err();
    assert_eq!(err.to_string(), SAVE_FAILED_MESSAGE);
    assert_eq!(err.status(), Some(404));
}

#[test]
fn failed_delete_reports_delete_failed() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.drop_next(Method::Delete, "/notes/n1");

    let err = sync.delete(&NoteId::new("n1")).unwrap_err();
    assert_eq!(err.to_string(), DELETE_FAILED_MESSAGE);
    assert_eq!(api.count(Method::Get, "/notes"), 0);
}

#[test]
fn refresh_failure_enters_error_state_and_keeps_list() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.seed_note("u1", "kept", "k");
    sync.refresh().unwrap();
    api.reply_next(Method::Get, "/notes", 503, "");

    let err = sync.refresh().unwrap_err();
    assert_eq!(err.to_string(), FETCH_FAILED_MESSAGE);
    assert_eq!(
        sync.state(),
        &SyncState::Error(FETCH_FAILED_MESSAGE.to_string())
    );
    assert_eq!(sync.notes().len(), 1);

    sync.refresh().unwrap();
    assert_eq!(sync.state(), &SyncState::Idle);
}

#[test]
fn refresh_unauthorized_clears_session_and_leaves_list() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.seed_note("u1", "kept", "k");
    sync.refresh().unwrap();
    api.revoke_token("tok1");

    let err = sync.refresh().unwrap_err();
    assert!(err.is_auth_invalid());
    assert!(!sync.session().is_authenticated());
    assert_eq!(sync.notes().len(), 1);
    assert_eq!(sync.state(), &SyncState::Idle);
}

#[test]
fn mutation_succeeds_even_if_follow_up_refresh_fails() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.reply_next(Method::Get, "/notes", 500, "");

    let created = sync.create(&input("T", "C")).unwrap().unwrap();
    assert_eq!(created.title, "T");
    assert_eq!(
        sync.state(),
        &SyncState::Error(FETCH_FAILED_MESSAGE.to_string())
    );
    assert!(sync.notes().is_empty());
    assert_eq!(api.note_titles("u1"), vec!["T".to_string()]);
}

#[test]
fn unauthorized_follow_up_refresh_is_escalated() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.reply_next(Method::Get, "/notes", 401, "");

    let err = sync.create(&input("T", "C")).unwrap_err();
    assert!(err.is_auth_invalid());
    assert!(!sync.session().is_authenticated());
}

#[test]
fn session_change_triggers_fetch_once_and_logout_empties_list() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.seed_note("u1", "mine", "m");

    sync.on_session_changed().unwrap();
    sync.on_session_changed().unwrap();
    assert_eq!(api.count(Method::Get, "/notes"), 1);
    assert_eq!(sync.notes().len(), 1);

    sync.session_mut().logout().unwrap();
    sync.on_session_changed().unwrap();
    assert!(sync.notes().is_empty());
    assert_eq!(api.count(Method::Get, "/notes"), 1);
}

#[test]
fn switching_users_fetches_the_new_users_list() {
    let api = FakeNotesApi::new();
    api.add_user("c@d.com", "y", "u2", "tok2");
    let mut sync = logged_in(&api);
    api.seed_note("u1", "mine", "m");
    api.seed_note("u2", "theirs", "t");
    sync.on_session_changed().unwrap();

    sync.session_mut().login("tok2", "u2").unwrap();
    sync.on_session_changed().unwrap();
    let titles: Vec<&str> = sync.notes().iter().map(|note| note.title.as_str()).collect();
    assert_eq!(titles, vec!["theirs"]);
}

#[test]
fn logged_out_sync_does_not_touch_the_network() {
    let api = FakeNotesApi::new();
    let mut sync = sync_in_memory(&api);

    sync.on_session_changed().unwrap();
    assert!(sync.refresh().unwrap_err().is_auth_invalid());
    assert!(api.requests().is_empty());
}

#[test]
fn external_writes_show_up_on_next_refresh() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    sync.create(&input("mine", "m")).unwrap();

    api.seed_note("u1", "from another client", "x");
    assert_eq!(sync.notes().len(), 1);
    sync.refresh().unwrap();
    assert_eq!(sync.notes().len(), 2);
}

#[test]
fn new_user_never_sees_previous_users_notes() {
    let api = FakeNotesApi::new();
    api.add_user("c@d.com", "y", "u2", "tok2");
    let mut sync = logged_in(&api);
    api.seed_note("u1", "u1 private", "secret");
    sync.on_session_changed().unwrap();
    api.revoke_token("tok1");
    assert!(sync.refresh().unwrap_err().is_auth_invalid());
    assert_eq!(sync.notes().len(), 1);

    sync.session_mut().login("tok2", "u2").unwrap();
    api.reply_next(Method::Get, "/notes", 503, "");
    let err = sync.on_session_changed().unwrap_err();

    assert_eq!(err.to_string(), FETCH_FAILED_MESSAGE);
    assert!(sync.notes().is_empty());
    assert_eq!(
        sync.state(),
        &SyncState::Error(FETCH_FAILED_MESSAGE.to_string())
    );

    sync.on_session_changed().unwrap();
    assert_eq!(api.count(Method::Get, "/notes"), 4);
}

#[test]
fn accepted_write_with_unreadable_body_still_refreshes() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    api.reply_next(Method::Post, "/notes", 201, "");

    let created = sync.create(&input("T", "C")).unwrap();
    assert_eq!(created, None);
    assert_eq!(api.count(Method::Get, "/notes"), 1);
    assert_eq!(sync.state(), &SyncState::Idle);
}

#[test]
fn accepted_update_with_unreadable_body_shows_server_copy() {
    let api = FakeNotesApi::new();
    let mut sync = logged_in(&api);
    let id = NoteId::new(api.seed_note("u1", "old", "body"));
    sync.refresh().unwrap();
    api.reply_next(Method::Put, &format!("/notes/{id}"), 200, "<html>ok</html>");

    assert_eq!(sync.update(&id, &input("new", "body")).unwrap(), None);
    assert_eq!(sync.notes()[0].title, "old");
    assert_eq!(api.count(Method::Get, "/notes"), 2);
}
