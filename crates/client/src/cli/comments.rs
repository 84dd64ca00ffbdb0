use std::collections::HashSet;

use uuid::Uuid;

use taskdesk_client::{models::Comment, Route, Taskdesk};

use super::{enter, print_notices};

/// Comments live inside the task screens, so either task page grants access.
fn enter_thread(app: &Taskdesk) -> anyhow::Result<()> {
    enter(app, Route::Tasks).or_else(|_| enter(app, Route::MyTasks))
}

pub async fn show(app: &Taskdesk, task: Uuid, watch: bool) -> anyhow::Result<()> {
    enter_thread(app)?;
    let thread = app.comment_thread(task);

    if !watch {
        thread.load().await?;
        for comment in thread.comments().await {
            print_comment(&comment);
        }
        return Ok(());
    }

    let period = app.config.comment_poll_interval;
    let _poll = thread.mount(period).await;
    let mut seen = HashSet::new();
    loop {
        for comment in thread.comments().await {
            if seen.insert(comment.id) {
                print_comment(&comment);
            }
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(period) => {}
        }
    }
    Ok(())
}

pub async fn post(
    app: &Taskdesk,
    task: Uuid,
    text: String,
    reply_to: Option<Uuid>,
) -> anyhow::Result<()> {
    enter_thread(app)?;
    let thread = app.comment_thread(task);
    thread.set_text(text);
    if let Some(parent) = reply_to {
        thread.reply_to(parent);
    }
    let posted = thread.post().await;
    print_notices(&thread.notices);
    Ok(posted?)
}

pub async fn edit(
    app: &Taskdesk,
    task: Uuid,
    comment: Uuid,
    text: String,
) -> anyhow::Result<()> {
    enter_thread(app)?;
    let thread = app.comment_thread(task);
    let edited = thread.edit(comment, &text).await;
    print_notices(&thread.notices);
    Ok(edited?)
}

pub async fn delete(app: &Taskdesk, task: Uuid, comment: Uuid) -> anyhow::Result<()> {
    enter_thread(app)?;
    let thread = app.comment_thread(task);
    let deleted = thread.delete(comment).await;
    print_notices(&thread.notices);
    Ok(deleted?)
}

fn print_comment(comment: &Comment) {
    let author = comment.created_by.display_name();
    let when = comment.created_at.format("%Y-%m-%d %H:%M");
    let edited = if comment.edited_at.is_some() { " (edited)" } else { "" };
    if let Some(parent) = &comment.parent {
        println!(
            "  > {}: {}",
            parent.created_by.display_name(),
            parent.text.lines().next().unwrap_or_default()
        );
    }
    if comment.is_deleted {
        println!("{when}  {author}: [deleted]");
    } else {
        println!("{when}  {author}{edited}: {}", comment.text);
    }
    println!("  id {}", comment.id);
}
