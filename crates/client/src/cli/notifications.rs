use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use taskdesk_client::{format::relative_time, models::Notification, Route, Taskdesk};

use super::{enter, print_notices};

pub async fn show(app: &Taskdesk, watch: bool) -> anyhow::Result<()> {
    enter(app, Route::Profile)?;
    let center = app.notification_center();

    if !watch {
        center.load().await?;
        for n in center.notifications().await {
            print_notification(&n);
        }
        println!("{} unread", center.unread_count().await);
        return Ok(());
    }

    let period = app.config.notification_poll_interval;
    let _poll = center.mount(period).await;
    let mut seen = HashSet::new();
    loop {
        // Newest first from the backend; print oldest first.
        for n in center.notifications().await.iter().rev() {
            if seen.insert(n.id) {
                print_notification(n);
            }
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(period) => {}
        }
    }
    Ok(())
}

pub async fn read(app: &Taskdesk, id: Uuid) -> anyhow::Result<()> {
    enter(app, Route::Profile)?;
    let center = app.notification_center();
    center.load().await?;
    let outcome = center.mark_read(id).await;
    print_notices(&center.notices);
    outcome?;
    println!("{} unread", center.unread_count().await);
    Ok(())
}

pub async fn read_all(app: &Taskdesk) -> anyhow::Result<()> {
    enter(app, Route::Profile)?;
    let center = app.notification_center();
    center.load().await?;
    let outcome = center.mark_all_read().await;
    print_notices(&center.notices);
    Ok(outcome?)
}

pub async fn dismiss(app: &Taskdesk, id: Uuid) -> anyhow::Result<()> {
    enter(app, Route::Profile)?;
    let center = app.notification_center();
    let outcome = center.delete(id).await;
    print_notices(&center.notices);
    Ok(outcome?)
}

fn print_notification(n: &Notification) {
    let marker = if n.read { ' ' } else { '*' };
    println!(
        "{marker} {:<14} {}  {}",
        relative_time(n.created_at, Utc::now()),
        n.title,
        n.message
    );
    println!("  id {}", n.id);
}
