mod support;

use std::time::Duration;

use axum::http::Method;
use chrono::{TimeZone, Utc};
use serde_json::json;
use support::{notification, task, user, Backend};
use taskdesk_client::{
    http::Attachment,
    models::{Granularity, TaskStatus},
    optimistic::Settled,
    search::{MemberFilter, TaskQuery},
};
use uuid::Uuid;

#[tokio::test]
async fn assignment_editor_sends_the_whole_selection() {
    let backend = Backend::start().await;
    let id = Uuid::new_v4();
    backend.state().tasks = vec![task(id, "Launch page", "PENDING", 0, &[3, 5])];
    let (app, _) = backend.signed_in("Manager").await;
    let board = app.task_board();
    board.load().await.unwrap();

    let mut editor = board.assignment_editor(id).await.unwrap();
    editor.load_members().await.unwrap();
    let candidates: Vec<i64> = editor.candidates("").iter().map(|u| u.id).collect();
    assert_eq!(candidates, vec![7]);

    editor.remove(3);
    editor.add(7);
    editor.add(7);
    editor.save().await.unwrap();

    let sent = backend
        .last(Method::POST, &format!("/tasks/{id}/assign/"))
        .unwrap();
    assert_eq!(sent.json(), json!({"assignees": [5, 7]}));
    assert_eq!(editor.notices.last().unwrap().message, "Assignments updated.");
}

#[tokio::test]
async fn member_progress_to_100_completes_and_refetches() {
    let backend = Backend::start().await;
    let id = Uuid::new_v4();
    backend.state().tasks = vec![task(id, "Write docs", "IN_PROGRESS", 30, &[1])];
    let (app, _) = backend.signed_in("Member").await;
    let page = app.my_tasks();
    page.load().await.unwrap();

    let settled = page.set_progress(id, 100).await.unwrap();

    assert_eq!(settled, Settled::Applied);
    let shown = page.task(id).await.unwrap();
    assert_eq!(shown.progress, 100);
    assert_eq!(shown.status, TaskStatus::Completed);
    assert_eq!(page.notices.last().unwrap().message, "Progress updated");
    assert_eq!(backend.count(Method::GET, "/tasks/my-tasks/"), 2);

    let (completed, line) = page.view(MemberFilter::Completed).await;
    assert_eq!(completed.len(), 1);
    assert_eq!(line, "Showing 1 of 1 tasks");
}

#[tokio::test]
async fn failed_progress_update_shows_draft_then_reverts() {
    let backend = Backend::start().await;
    let id = Uuid::new_v4();
    backend.state().tasks = vec![task(id, "Write docs", "IN_PROGRESS", 30, &[1])];
    backend
        .state()
        .progress_delays
        .push_back(Duration::from_millis(250));
    backend.fail("progress");
    let (app, _) = backend.signed_in("Member").await;
    let page = app.my_tasks();
    page.load().await.unwrap();

    let (outcome, during) = tokio::join!(page.set_progress(id, 100), async {
        tokio::time::sleep(Duration::from_millis(80)).await;
        page.task(id).await.unwrap()
    });

    assert_eq!(during.progress, 100);
    assert_eq!(during.status, TaskStatus::Completed);
    assert!(outcome.is_err());
    let after = page.task(id).await.unwrap();
    assert_eq!(after.progress, 30);
    assert_eq!(after.status, TaskStatus::InProgress);
    assert_eq!(page.notices.last().unwrap().message, "Progress locked");
}

#[tokio::test]
async fn late_reply_for_older_edit_does_not_override_newer_one() {
    let backend = Backend::start().await;
    let id = Uuid::new_v4();
    backend.state().tasks = vec![task(id, "Ship", "IN_PROGRESS", 10, &[])];
    backend
        .state()
        .progress_delays
        .push_back(Duration::from_millis(300));
    let (app, _) = backend.signed_in("Manager").await;
    let board = app.task_board();
    board.load().await.unwrap();

    let (first, second) = tokio::join!(board.set_progress(id, 40), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        board.set_progress(id, 70).await
    });

    assert_eq!(second.unwrap(), Settled::Applied);
    assert_eq!(first.unwrap(), Settled::Stale);
    assert_eq!(board.task(id).await.unwrap().progress, 70);
}

#[tokio::test]
async fn board_filters_and_summarizes() {
    let backend = Backend::start().await;
    backend.state().tasks = vec![
        task(Uuid::new_v4(), "Alpha release", "COMPLETED", 100, &[3]),
        task(Uuid::new_v4(), "Alpha docs", "IN_PROGRESS", 50, &[5]),
        task(Uuid::new_v4(), "Beta plan", "PENDING", 0, &[]),
    ];
    let (app, _) = backend.signed_in("Manager").await;
    let board = app.task_board();
    board.load().await.unwrap();

    let query = TaskQuery {
        text: "alpha".to_string(),
        ..TaskQuery::default()
    };
    let (page, counts) = board.view(&query, 1, 10).await;
    assert_eq!(page.items.len(), 2);
    assert_eq!(counts, "2 of 3");

    // Due dates in the fixtures are 2030-01-01.
    let later = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
    let summary = board.summary(later).await;
    assert_eq!(summary.total, 3);
    assert_eq!(summary.overdue, 2);
    assert!(summary.by_status.contains(&(TaskStatus::Completed, 1)));
}

#[tokio::test]
async fn posting_a_reply_clears_the_input() {
    let backend = Backend::start().await;
    let task_id = Uuid::new_v4();
    let parent = Uuid::new_v4();
    let (app, _) = backend.signed_in("Member").await;
    let thread = app.comment_thread(task_id);
    thread.on_scroll(2000, 100, 400);
    assert!(!thread.is_at_bottom());

    thread.set_text("  Looks good  ");
    thread.reply_to(parent);
    thread.post().await.unwrap();

    assert_eq!(thread.text(), "");
    assert_eq!(thread.replying_to(), None);
    assert!(thread.take_scroll_request());
    let comments = thread.comments().await;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "Looks good");
    let sent = backend.last(Method::POST, "/comments/").unwrap();
    assert_eq!(
        sent.json(),
        json!({"task": task_id, "text": "Looks good", "parent": parent})
    );
}

#[tokio::test]
async fn failed_post_keeps_the_typed_text() {
    let backend = Backend::start().await;
    backend.fail("comment");
    let (app, _) = backend.signed_in("Member").await;
    let thread = app.comment_thread(Uuid::new_v4());

    thread.set_text("Draft reply");
    assert!(thread.post().await.is_err());

    assert_eq!(thread.text(), "Draft reply");
    assert_eq!(thread.notices.last().unwrap().message, "Comments are closed");
}

#[tokio::test]
async fn dropping_the_poll_handle_stops_fetching() {
    let backend = Backend::start().await;
    let (app, _) = backend.signed_in("Member").await;
    let thread = app.comment_thread(Uuid::new_v4());

    let poll = thread.mount(Duration::from_millis(100)).await;
    tokio::time::sleep(Duration::from_millis(350)).await;
    drop(poll);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fetched = backend.count(Method::GET, "/comments/");
    assert!(fetched >= 2, "expected polling, saw {fetched} fetches");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(backend.count(Method::GET, "/comments/"), fetched);
}

#[tokio::test]
async fn mark_all_read_settles_with_the_backend() {
    let backend = Backend::start().await;
    backend.state().notifications = vec![
        notification(Uuid::new_v4(), false),
        notification(Uuid::new_v4(), false),
        notification(Uuid::new_v4(), true),
    ];
    let (app, _) = backend.signed_in("Member").await;
    let center = app.notification_center();
    center.load().await.unwrap();
    assert_eq!(center.unread_count().await, 2);

    center.mark_all_read().await.unwrap();

    assert_eq!(center.unread_count().await, 0);
    assert_eq!(
        backend.count(Method::POST, "/tasks/notifications/mark-all-read/"),
        1
    );
}

#[tokio::test]
async fn mark_all_read_failure_restores_flags() {
    let backend = Backend::start().await;
    backend.state().notifications = vec![
        notification(Uuid::new_v4(), false),
        notification(Uuid::new_v4(), false),
    ];
    backend.fail("mark-all-read");
    let (app, _) = backend.signed_in("Member").await;
    let center = app.notification_center();
    center.load().await.unwrap();

    assert!(center.mark_all_read().await.is_err());

    assert_eq!(center.unread_count().await, 2);
    assert_eq!(
        center.notices.last().unwrap().message,
        "Failed to mark all as read"
    );
}

#[tokio::test]
async fn mark_read_is_optimistic() {
    let backend = Backend::start().await;
    let id = Uuid::new_v4();
    backend.state().notifications = vec![
        notification(id, false),
        notification(Uuid::new_v4(), false),
    ];
    let (app, _) = backend.signed_in("Member").await;
    let center = app.notification_center();
    center.load().await.unwrap();

    let settled = center.mark_read(id).await.unwrap();

    assert_eq!(settled, Settled::Applied);
    assert_eq!(center.unread_count().await, 1);
    assert_eq!(
        backend.count(Method::POST, &format!("/tasks/notifications/{id}/mark-read/")),
        1
    );
}

fn comment(id: Uuid, task_id: Uuid, text: &str) -> serde_json::Value {
    json!({
        "id": id,
        "task": task_id,
        "text": text,
        "created_by": user(1, "tester", "Member"),
        "created_at": "2025-11-20T08:00:00Z",
        "self": true
    })
}

#[tokio::test]
async fn task_form_goes_multipart_only_with_files() {
    let backend = Backend::start().await;
    let id = Uuid::new_v4();
    backend.state().tasks = vec![task(id, "Spec review", "PENDING", 20, &[3])];
    let (app, _) = backend.signed_in("Manager").await;
    let board = app.task_board();
    board.load().await.unwrap();

    let mut form = board.create_form();
    form.title = "  Plan sprint ".to_string();
    form.due_date = Some(Utc.with_ymd_and_hms(2030, 2, 1, 0, 0, 0).unwrap());
    board.save(&form).await.unwrap();

    let created = backend.last(Method::POST, "/tasks/").unwrap();
    assert_eq!(created.content_type.as_deref(), Some("application/json"));
    assert_eq!(created.json()["title"], "Plan sprint");
    assert!(created.json().get("progress").is_none());
    assert_eq!(board.notices.last().unwrap().message, "Task saved successfully");
    assert_eq!(backend.count(Method::GET, "/tasks/"), 2);

    let mut form = board.edit_form(id).await.unwrap();
    form.files = vec![Attachment::new("brief.txt", b"scope".to_vec())];
    board.save(&form).await.unwrap();

    let updated = backend.last(Method::PUT, &format!("/tasks/{id}/")).unwrap();
    assert!(updated
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("multipart/form-data"));
    assert!(updated.body.contains("name=\"files\"; filename=\"brief.txt\""));
    assert!(updated.body.contains("name=\"progress\""));
    assert!(updated.body.contains("name=\"assignees\""));
}

#[tokio::test]
async fn deleting_a_comment_refetches_and_scrolls() {
    let backend = Backend::start().await;
    let task_id = Uuid::new_v4();
    let id = Uuid::new_v4();
    backend.state().comments = vec![comment(id, task_id, "Old note")];
    let (app, _) = backend.signed_in("Member").await;
    let thread = app.comment_thread(task_id);
    thread.load().await.unwrap();
    thread.on_scroll(2000, 100, 400);

    thread.delete(id).await.unwrap();

    assert_eq!(backend.count(Method::DELETE, &format!("/comments/{id}/")), 1);
    assert_eq!(backend.count(Method::GET, "/comments/"), 2);
    assert!(thread.comments().await[0].is_deleted);
    assert!(thread.take_scroll_request());
    assert!(!thread.take_scroll_request());
    assert_eq!(thread.notices.last().unwrap().message, "Comment deleted");
}

#[tokio::test]
async fn editing_a_comment_sends_trimmed_text() {
    let backend = Backend::start().await;
    let task_id = Uuid::new_v4();
    let id = Uuid::new_v4();
    backend.state().comments = vec![comment(id, task_id, "Teh draft")];
    let (app, _) = backend.signed_in("Member").await;
    let thread = app.comment_thread(task_id);

    thread.edit(id, "  The draft ").await.unwrap();

    let sent = backend.last(Method::PATCH, &format!("/comments/{id}/")).unwrap();
    assert_eq!(sent.json(), json!({"text": "The draft"}));
    let shown = &thread.comments().await[0];
    assert_eq!(shown.text, "The draft");
    assert!(shown.edited_at.is_some());
    assert_eq!(thread.notices.last().unwrap().message, "Comment updated");

    assert!(thread.edit(id, "   ").await.is_err());
    assert_eq!(backend.count(Method::PATCH, &format!("/comments/{id}/")), 1);
}

#[tokio::test]
async fn text_typed_while_posting_survives() {
    let backend = Backend::start().await;
    backend.state().comment_delay = Some(Duration::from_millis(200));
    let (app, _) = backend.signed_in("Member").await;
    let thread = app.comment_thread(Uuid::new_v4());
    thread.set_text("First thought");

    let (posted, _) = tokio::join!(thread.post(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        thread.set_text("Second thought");
    });

    posted.unwrap();
    assert_eq!(thread.text(), "Second thought");
    let sent = backend.last(Method::POST, "/comments/").unwrap();
    assert_eq!(sent.json()["text"], "First thought");
}

#[tokio::test]
async fn deleting_a_notification_refetches() {
    let backend = Backend::start().await;
    let gone = Uuid::new_v4();
    let kept = Uuid::new_v4();
    backend.state().notifications = vec![notification(gone, false), notification(kept, true)];
    let (app, _) = backend.signed_in("Member").await;
    let center = app.notification_center();
    center.load().await.unwrap();

    center.delete(gone).await.unwrap();

    assert_eq!(
        backend.count(Method::DELETE, &format!("/tasks/notifications/{gone}/")),
        1
    );
    let left: Vec<Uuid> = center.notifications().await.iter().map(|n| n.id).collect();
    assert_eq!(left, vec![kept]);
    assert_eq!(center.unread_count().await, 0);
    assert_eq!(center.notices.last().unwrap().message, "Notification deleted");

    assert!(center.delete(gone).await.is_err());
    assert_eq!(
        center.notices.last().unwrap().message,
        "Error deleting notification"
    );
}

#[tokio::test]
async fn notification_with_numeric_meta_still_lists() {
    let backend = Backend::start().await;
    let mut odd = notification(Uuid::new_v4(), false);
    odd["meta"] = json!({"user_id": 5, "task_id": 12});
    odd["type"] = json!("Escalation");
    backend.state().notifications = vec![odd, notification(Uuid::new_v4(), false)];
    let (app, _) = backend.signed_in("Member").await;
    let center = app.notification_center();

    center.load().await.unwrap();

    let listed = center.notifications().await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].meta_id("user_id").as_deref(), Some("5"));
}

#[tokio::test]
async fn statistics_send_range_and_granularity() {
    let backend = Backend::start().await;
    backend.state().statistics = json!({
        "series": [
            {"period": "2025-11-03", "tasks_created": 4, "tasks_completed": 2, "avg_progress": 55.0}
        ]
    });
    let (app, _) = backend.signed_in("Admin").await;
    let view = app.statistics();

    view.set_granularity(Granularity::Week).await.unwrap();
    let start = chrono::NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
    let end = chrono::NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
    view.set_range(start, end).await.unwrap();

    let sent = backend.last(Method::GET, "/tasks/statistics/").unwrap();
    assert_eq!(
        sent.query.as_deref(),
        Some("start_date=2025-11-01&end_date=2025-11-30&granularity=week")
    );
    assert_eq!(backend.count(Method::GET, "/tasks/statistics/"), 2);
    assert_eq!(view.csv().await.unwrap().lines().count(), 2);
    assert_eq!(view.csv_file_name().await, "task-stats_20251101_20251130.csv");
}
