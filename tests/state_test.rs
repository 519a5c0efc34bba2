//! State aggregator tests: confirmed-row mutations, activity side effects,
//! completion celebrations, and the all-or-nothing initial load.

use std::sync::Arc;
use taskdeck::state::{activity, AppState};
use taskdeck::storage::{NewProject, NewTask, ProjectPatch, Storage, StoreError, TaskPatch};

async fn test_state() -> (Arc<AppState>, Storage, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    storage.seed_quotes().await.unwrap();
    let sink = activity::spawn(storage.clone());
    let state = Arc::new(AppState::new(storage.clone(), sink, "u1".to_string(), 10));
    (state, storage, dir)
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        user_id: "u1".to_string(),
        ..NewTask::default()
    }
}

/// Give the fire-and-forget activity writer a moment to land.
async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
}

// ── Create task end-to-end ───────────────────────────────────────────────────

#[tokio::test]
async fn create_task_prepends_confirmed_row_and_logs_once() {
    let (state, storage, _dir) = test_state().await;
    state.load().await.unwrap();

    let row = state
        .create_task(NewTask {
            title: "Write report".to_string(),
            priority: Some("high".to_string()),
            due_date: Some("2024-12-10".to_string()),
            user_id: "u1".to_string(),
            ..NewTask::default()
        })
        .await
        .unwrap();

    // Exactly one store insert.
    assert_eq!(storage.list_tasks().await.unwrap().len(), 1);

    // Mirror holds the server-returned row, prepended.
    let tasks = state.tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], row);

    // Exactly one activity record, with the create_task action.
    settle().await;
    let activities = storage.recent_activities(Some(100)).await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].action, "create_task");
    assert_eq!(activities[0].description, "Created task \"Write report\"");
    assert_eq!(activities[0].user_id, "u1");
}

#[tokio::test]
async fn create_prepends_newest_first() {
    let (state, _storage, _dir) = test_state().await;
    state.load().await.unwrap();

    state.create_task(new_task("older")).await.unwrap();
    state.create_task(new_task("newer")).await.unwrap();

    let tasks = state.tasks().await;
    assert_eq!(tasks[0].title, "newer");
    assert_eq!(tasks[1].title, "older");
}

// ── Completion toggle ────────────────────────────────────────────────────────

#[tokio::test]
async fn completing_a_task_celebrates_once() {
    let (state, storage, _dir) = test_state().await;
    state.load().await.unwrap();
    let t = state.create_task(new_task("ship it")).await.unwrap();

    // false → true: one update, one patch, a celebration quote.
    let (row, quote) = state.set_task_completed(&t.id, true).await.unwrap();
    assert!(row.completed);
    assert!(quote.is_some());
    assert_eq!(quote.unwrap().category.as_deref(), Some("completion"));
    assert!(state.tasks().await[0].completed);

    // true → false: update applied, no celebration.
    let (row, quote) = state.set_task_completed(&t.id, false).await.unwrap();
    assert!(!row.completed);
    assert!(quote.is_none());
    assert!(!state.tasks().await[0].completed);

    // re-completing an already-completed task celebrates; completing the
    // same state twice does not.
    let (_, quote) = state.set_task_completed(&t.id, true).await.unwrap();
    assert!(quote.is_some());
    let (_, quote) = state.set_task_completed(&t.id, true).await.unwrap();
    assert!(quote.is_none());

    settle().await;
    let actions: Vec<String> = storage
        .recent_activities(Some(100))
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect();
    assert_eq!(actions.iter().filter(|a| *a == "complete_task").count(), 2);
}

// ── Project mutations ────────────────────────────────────────────────────────

#[tokio::test]
async fn project_mutations_patch_the_mirror() {
    let (state, storage, _dir) = test_state().await;
    state.load().await.unwrap();

    let p = state
        .create_project(NewProject {
            title: "Mobile app".to_string(),
            user_id: "u1".to_string(),
            ..NewProject::default()
        })
        .await
        .unwrap();

    let updated = state
        .update_project(
            &p.id,
            ProjectPatch {
                progress: Some(60),
                ..ProjectPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(state.projects().await[0], updated);

    state.delete_project(&p.id).await.unwrap();
    assert!(state.projects().await.is_empty());

    settle().await;
    let actions: Vec<String> = storage
        .recent_activities(Some(100))
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect();
    assert!(actions.contains(&"create_project".to_string()));
    assert!(actions.contains(&"update_project".to_string()));
    assert!(actions.contains(&"delete_project".to_string()));
}

#[tokio::test]
async fn failed_mutation_sets_error_and_propagates() {
    let (state, _storage, _dir) = test_state().await;
    state.load().await.unwrap();

    let err = state
        .update_task("no-such-id", TaskPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert!(state.last_error().await.is_some());
    assert!(state.tasks().await.is_empty());
}

// ── All-or-nothing initial load ──────────────────────────────────────────────

#[tokio::test]
async fn load_failure_leaves_previous_mirror_untouched() {
    let (state, storage, _dir) = test_state().await;

    storage.create_task(new_task("pre-existing")).await.unwrap();
    storage
        .create_project(NewProject {
            title: "pre-existing project".to_string(),
            user_id: "u1".to_string(),
            ..NewProject::default()
        })
        .await
        .unwrap();
    storage
        .create_activity("create_task", "pre-existing activity", "u1")
        .await
        .unwrap();

    state.load().await.unwrap();
    assert_eq!(state.tasks().await.len(), 1);
    assert_eq!(state.projects().await.len(), 1);
    assert_eq!(state.activities().await.len(), 1);
    assert!(state.last_error().await.is_none());

    // New rows land in the store, then the task fetch is broken: the reload
    // must fail without applying the project/activity halves.
    storage
        .create_project(NewProject {
            title: "should not appear".to_string(),
            user_id: "u1".to_string(),
            ..NewProject::default()
        })
        .await
        .unwrap();
    sqlx::query("DROP TABLE tasks")
        .execute(&storage.pool())
        .await
        .unwrap();

    assert!(state.load().await.is_err());
    assert!(state.last_error().await.is_some());

    // Pre-failure values, wholesale.
    assert_eq!(state.tasks().await.len(), 1);
    assert_eq!(state.tasks().await[0].title, "pre-existing");
    assert_eq!(state.projects().await.len(), 1);
    assert_eq!(state.projects().await[0].title, "pre-existing project");
    assert_eq!(state.activities().await.len(), 1);
}
