use std::path::PathBuf;

use anyhow::bail;
use chrono::Utc;
use clap::Subcommand;
use uuid::Uuid;

use taskdesk_client::{
    format::{format_file_name, format_size, DEFAULT_FILE_NAME_LEN},
    http::Attachment,
    models::{Priority, Role, Task, TaskStatus},
    optimistic::Settled,
    search::{MemberFilter, TaskQuery, DEFAULT_PAGE_SIZE},
    Route, Taskdesk,
};

use super::{enter, parse_due, print_notices};

#[derive(Subcommand)]
pub enum TaskAction {
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "pending")]
        status: TaskStatus,
        /// YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: String,
        #[arg(long = "assignee")]
        assignees: Vec<i64>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        progress: Option<i64>,
        /// Replaces the assignee list when given
        #[arg(long = "assignee")]
        assignees: Option<Vec<i64>>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    Delete {
        id: Uuid,
    },
}

pub async fn board(
    app: &Taskdesk,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    query: Option<String>,
    page: usize,
) -> anyhow::Result<()> {
    enter(app, Route::Tasks)?;
    let board = app.task_board();
    let loaded = board.load().await;
    print_notices(&board.notices);
    loaded?;

    let query = TaskQuery {
        status,
        priority,
        text: query.unwrap_or_default(),
    };
    let (page, counts) = board.view(&query, page, DEFAULT_PAGE_SIZE).await;
    let now = Utc::now();
    for task in &page.items {
        print_task_line(task, now);
    }
    println!("{counts} (page {} of {})", page.page, page.total_pages);
    Ok(())
}

pub async fn task(app: &Taskdesk, action: TaskAction) -> anyhow::Result<()> {
    enter(app, Route::Tasks)?;
    let board = app.task_board();

    match action {
        TaskAction::Create {
            title,
            description,
            priority,
            status,
            due,
            assignees,
            files,
        } => {
            let mut form = board.create_form();
            form.title = title;
            form.description = description;
            form.priority = Some(priority);
            form.status = Some(status);
            form.due_date = Some(parse_due(&due)?);
            form.assignees = assignees;
            form.files = read_files(files).await?;
            let saved = board.save(&form).await;
            print_notices(&board.notices);
            saved?;
        }
        TaskAction::Edit {
            id,
            title,
            description,
            priority,
            status,
            due,
            progress,
            assignees,
            files,
        } => {
            board.load().await?;
            let mut form = board.edit_form(id).await?;
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if priority.is_some() {
                form.priority = priority;
            }
            if status.is_some() {
                form.status = status;
            }
            if let Some(due) = due {
                form.due_date = Some(parse_due(&due)?);
            }
            if let Some(progress) = progress {
                form.progress = progress;
            }
            if let Some(assignees) = assignees {
                form.assignees = assignees;
            }
            form.files = read_files(files).await?;
            if let Err(errors) = form.validate() {
                for (field, message) in errors {
                    eprintln!("{field}: {message}");
                }
                bail!("Task not saved");
            }
            let saved = board.save(&form).await;
            print_notices(&board.notices);
            saved?;
        }
        TaskAction::Delete { id } => {
            let deleted = board.delete(id).await;
            print_notices(&board.notices);
            deleted?;
        }
    }
    Ok(())
}

pub async fn upload(app: &Taskdesk, task: Uuid, files: Vec<PathBuf>) -> anyhow::Result<()> {
    enter(app, Route::Tasks)?;
    let board = app.task_board();
    let files = read_files(files).await?;
    let uploaded = board.upload(task, &files).await;
    print_notices(&board.notices);
    uploaded?;
    if let Some(task) = board.task(task).await {
        print_files(&task);
    }
    Ok(())
}

pub async fn remove_file(app: &Taskdesk, file: Uuid) -> anyhow::Result<()> {
    enter(app, Route::Tasks)?;
    let board = app.task_board();
    let removed = board.remove_file(file).await;
    print_notices(&board.notices);
    Ok(removed?)
}

pub async fn assign(app: &Taskdesk, task: Uuid, members: Vec<i64>) -> anyhow::Result<()> {
    enter(app, Route::Tasks)?;
    let board = app.task_board();
    board.load().await?;
    let mut editor = board.assignment_editor(task).await?;
    editor.load_members().await?;

    for id in editor.selected_ids().to_vec() {
        if !members.contains(&id) {
            editor.remove(id);
        }
    }
    for id in members {
        editor.add(id);
    }
    let saved = editor.save().await;
    print_notices(&editor.notices);
    saved?;

    for (id, user) in editor.selected_users() {
        match user {
            Some(user) => println!("  {id:>5}  {}", user.display_name()),
            None => println!("  {id:>5}  (unknown member)"),
        }
    }
    Ok(())
}

pub async fn my_tasks(app: &Taskdesk, filter: MemberFilter) -> anyhow::Result<()> {
    enter(app, Route::MyTasks)?;
    let page = app.my_tasks();
    let loaded = page.load().await;
    print_notices(&page.notices);
    loaded?;

    let (tasks, counts) = page.view(filter).await;
    let now = Utc::now();
    for task in &tasks {
        print_task_line(task, now);
    }
    println!("{counts}");
    Ok(())
}

/// Members update their own tasks; managers and admins go through the board.
pub async fn progress(app: &Taskdesk, task: Uuid, value: u8) -> anyhow::Result<()> {
    let settled = if app.session.role() == Some(Role::Member) {
        enter(app, Route::MyTasks)?;
        let page = app.my_tasks();
        page.load().await?;
        let outcome = page.set_progress(task, value).await;
        print_notices(&page.notices);
        outcome?
    } else {
        enter(app, Route::Tasks)?;
        let board = app.task_board();
        board.load().await?;
        let outcome = board.set_progress(task, value).await;
        print_notices(&board.notices);
        outcome?
    };
    report_settled(settled);
    Ok(())
}

pub async fn complete(app: &Taskdesk, task: Uuid) -> anyhow::Result<()> {
    enter(app, Route::MyTasks)?;
    let page = app.my_tasks();
    page.load().await?;
    let outcome = page.mark_complete(task).await;
    print_notices(&page.notices);
    report_settled(outcome?);
    Ok(())
}

fn report_settled(settled: Settled) {
    if settled == Settled::Stale {
        println!("A newer change to this task is still pending");
    }
}

async fn read_files(paths: Vec<PathBuf>) -> anyhow::Result<Vec<Attachment>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(Attachment::from_path(path).await?);
    }
    Ok(files)
}

fn print_task_line(task: &Task, now: chrono::DateTime<Utc>) {
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let overdue = if task.is_overdue(now) { " overdue" } else { "" };
    let assignees: Vec<String> = task
        .assigned_users
        .iter()
        .map(|a| a.assignee.display_name())
        .collect();
    println!(
        "{}  {:<12} {:<6} {:>3}%  due {}{}  {}  [{}]",
        task.id,
        task.status.label(),
        task.priority,
        task.progress,
        due,
        overdue,
        task.title,
        assignees.join(", ")
    );
}

fn print_files(task: &Task) {
    for file in &task.attached_files {
        println!(
            "  {}  {:<18}  {}",
            file.id,
            format_file_name(&file.file_name, DEFAULT_FILE_NAME_LEN),
            format_size(file.file_size)
        );
    }
}
