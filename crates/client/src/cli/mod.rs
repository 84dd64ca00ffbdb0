mod account;
mod auth;
mod comments;
mod notifications;
mod reports;
mod tasks;

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use taskdesk_client::{
    models::{Granularity, Priority, TaskStatus},
    pages::{NoticeLevel, Notices},
    search::MemberFilter,
    Navigation, Route, Taskdesk,
};

/// Terminal client for the taskdesk backend
#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(about = "Role-based task management from the terminal")]
pub struct Cli {
    /// Backend base URL, overrides TASKDESK_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        #[arg(long, env = "TASKDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Request an account; an admin has to approve it
    Register(auth::RegisterArgs),
    /// Forget the saved session
    Logout,
    /// Show the signed-in user and token expiry
    Whoami,
    /// The manager task board
    Tasks {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Matches title, description and assignee names
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Create, edit or delete a task
    Task {
        #[command(subcommand)]
        action: tasks::TaskAction,
    },
    /// Attach files to a task
    Upload {
        task: Uuid,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove an attached file
    RemoveFile { file: Uuid },
    /// Replace a task's assignees
    Assign {
        task: Uuid,
        /// Member ids; pass none to unassign everybody
        members: Vec<i64>,
    },
    /// Tasks assigned to you
    MyTasks {
        #[arg(long, default_value = "all")]
        filter: MemberFilter,
    },
    /// Set a task's progress (0-100)
    Progress {
        task: Uuid,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,
    },
    /// Mark one of your tasks completed
    Complete { task: Uuid },
    /// Show a task's comment thread
    Comments {
        task: Uuid,
        /// Keep polling for new comments until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Post a comment
    Comment {
        task: Uuid,
        text: String,
        #[arg(long)]
        reply_to: Option<Uuid>,
    },
    /// Rewrite one of your comments
    EditComment {
        task: Uuid,
        comment: Uuid,
        text: String,
    },
    DeleteComment {
        task: Uuid,
        comment: Uuid,
    },
    /// List notifications
    Notifications {
        #[arg(long)]
        watch: bool,
    },
    /// Mark a notification read
    Read { notification: Uuid },
    ReadAll,
    /// Delete a notification
    Dismiss { notification: Uuid },
    /// Dashboard for your role
    Dashboard {
        /// Member whose dashboard to show, defaults to you
        #[arg(long)]
        user: Option<i64>,
    },
    /// Task statistics over a date range
    Stats {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value = "day")]
        granularity: Granularity,
        /// Write the series as CSV; a directory gets the default file name
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<account::ProfileAction>,
    },
    /// Change your password
    Password {
        #[arg(long, env = "TASKDESK_OLD_PASSWORD", hide_env_values = true)]
        old: String,
        #[arg(long, env = "TASKDESK_NEW_PASSWORD", hide_env_values = true)]
        new: String,
        #[arg(long, env = "TASKDESK_CONFIRM_PASSWORD", hide_env_values = true)]
        confirm: String,
    },
    /// Account requests awaiting approval
    Users,
    Approve { user: i64 },
    Reject { user: i64 },
}

pub async fn run(app: &Taskdesk, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => auth::login(app, username, password).await,
        Command::Register(args) => auth::register(app, args).await,
        Command::Logout => auth::logout(app).await,
        Command::Whoami => auth::whoami(app),
        Command::Tasks {
            status,
            priority,
            query,
            page,
        } => tasks::board(app, status, priority, query, page).await,
        Command::Task { action } => tasks::task(app, action).await,
        Command::Upload { task, files } => tasks::upload(app, task, files).await,
        Command::RemoveFile { file } => tasks::remove_file(app, file).await,
        Command::Assign { task, members } => tasks::assign(app, task, members).await,
        Command::MyTasks { filter } => tasks::my_tasks(app, filter).await,
        Command::Progress { task, value } => tasks::progress(app, task, value).await,
        Command::Complete { task } => tasks::complete(app, task).await,
        Command::Comments { task, watch } => comments::show(app, task, watch).await,
        Command::Comment {
            task,
            text,
            reply_to,
        } => comments::post(app, task, text, reply_to).await,
        Command::EditComment {
            task,
            comment,
            text,
        } => comments::edit(app, task, comment, text).await,
        Command::DeleteComment { task, comment } => comments::delete(app, task, comment).await,
        Command::Notifications { watch } => notifications::show(app, watch).await,
        Command::Read { notification } => notifications::read(app, notification).await,
        Command::ReadAll => notifications::read_all(app).await,
        Command::Dismiss { notification } => notifications::dismiss(app, notification).await,
        Command::Dashboard { user } => reports::dashboard(app, user).await,
        Command::Stats {
            from,
            to,
            granularity,
            csv,
        } => reports::stats(app, from, to, granularity, csv).await,
        Command::Profile { action } => account::profile(app, action).await,
        Command::Password { old, new, confirm } => {
            account::password(app, &old, &new, &confirm).await
        }
        Command::Users => account::users(app).await,
        Command::Approve { user } => account::decide(app, user, true).await,
        Command::Reject { user } => account::decide(app, user, false).await,
    }
}

/// Runs the route guard for the screen a command stands for.
fn enter(app: &Taskdesk, route: Route) -> anyhow::Result<()> {
    match app.guard.check(route) {
        Navigation::Allow => Ok(()),
        Navigation::RedirectToLogin => bail!("Not signed in. Run `taskdesk login <username>` first."),
        Navigation::Forbidden { home } => bail!(
            "Your role cannot open {}. Your dashboard is {}.",
            route.path(),
            home.path()
        ),
    }
}

fn print_notices(notices: &Notices) {
    for notice in notices.drain() {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
}

/// Accepts an RFC 3339 timestamp or a plain date (midnight UTC).
fn parse_due(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid due date {raw:?}, expected YYYY-MM-DD"))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
