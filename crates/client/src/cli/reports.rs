use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use taskdesk_client::{
    models::{Granularity, Role},
    search::{UserQuery, DEFAULT_PAGE_SIZE},
    ClientError, Route, Taskdesk,
};

use super::{enter, print_notices};

pub async fn dashboard(app: &Taskdesk, user: Option<i64>) -> anyhow::Result<()> {
    let Some(role) = app.session.role() else {
        return Err(ClientError::SessionExpired.into());
    };
    match role {
        Role::Admin => admin(app).await,
        Role::Manager => manager(app).await,
        Role::Member => member(app, user).await,
    }
}

async fn admin(app: &Taskdesk) -> anyhow::Result<()> {
    enter(app, Route::AdminDashboard)?;
    let view = app.admin_dashboard();
    let loaded = view.load().await;
    print_notices(&view.notices);
    loaded?;

    if let Some(stats) = view.stats().await {
        println!(
            "users {} (managers {}, members {})",
            stats.total_users, stats.managers, stats.members
        );
        println!(
            "tasks {} completed {} performance {}%",
            stats.total_tasks, stats.completed_tasks, stats.performance_pct
        );
        if let Some(projects) = stats.active_projects {
            println!("active projects {projects}");
        }
    }
    let page = view.users(&UserQuery::default(), 1, DEFAULT_PAGE_SIZE).await;
    for row in &page.items {
        println!(
            "  {:<20} {:<8} {:<8} {}/{} tasks",
            row.full_name(),
            row.role,
            if row.is_active { "active" } else { "inactive" },
            row.completed_tasks,
            row.total_tasks
        );
    }
    Ok(())
}

async fn manager(app: &Taskdesk) -> anyhow::Result<()> {
    enter(app, Route::ManagerDashboard)?;
    let board = app.task_board();
    let loaded = board.load().await;
    print_notices(&board.notices);
    loaded?;

    let summary = board.summary(Utc::now()).await;
    println!("tasks {}  overdue {}", summary.total, summary.overdue);
    for (status, count) in summary.by_status {
        println!("  {:<12} {count}", status.label());
    }
    Ok(())
}

async fn member(app: &Taskdesk, user: Option<i64>) -> anyhow::Result<()> {
    enter(app, Route::MemberDashboard)?;
    let view = app.member_dashboard();
    let loaded = view.load(user).await;
    print_notices(&view.notices);
    loaded?;

    if let Some(dash) = view.data().await {
        let c = &dash.counts;
        println!("{}", dash.user.display_name());
        println!(
            "tasks {}  in progress {}  completed {}  overdue {}",
            c.total, c.in_progress, c.completed, c.overdue
        );
        println!(
            "average progress {:.1}%  on time {:.1}%",
            dash.performance.average_progress, dash.performance.on_time_completion_rate
        );
        for task in &dash.top_tasks {
            println!("  {:>3}%  {:<12} {}", task.progress, task.status.label(), task.title);
        }
    }
    Ok(())
}

pub async fn stats(
    app: &Taskdesk,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    granularity: Granularity,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    enter(app, Route::Reports)?;
    let view = app.statistics();
    let current = view.query().await;
    let start = from.unwrap_or(current.start_date);
    let end = to.unwrap_or(current.end_date);
    if start != current.start_date || end != current.end_date {
        view.set_range(start, end).await?;
    }
    view.set_granularity(granularity).await?;

    let Some(data) = view.data().await else {
        return Ok(());
    };
    let totals = &data.stats;
    println!(
        "{} to {} by {}",
        start,
        end,
        granularity.as_str()
    );
    println!(
        "tasks {}  completed {}  overdue {}  avg progress {:.1}%",
        totals.total_tasks, totals.completed, totals.overdue, totals.avg_progress
    );
    for (status, count) in &data.breakdowns.by_status {
        println!("  {status:<12} {count}");
    }
    for point in &data.series {
        println!(
            "  {:<25} created {:>3}  completed {:>3}",
            point.period.as_deref().unwrap_or("-"),
            point.tasks_created,
            point.tasks_completed
        );
    }

    if let Some(target) = csv {
        let path = if target.is_dir() {
            target.join(view.csv_file_name().await)
        } else {
            target
        };
        let body = view.csv().await.unwrap_or_default();
        tokio::fs::write(&path, body).await?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
