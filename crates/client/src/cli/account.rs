use std::path::PathBuf;

use clap::Subcommand;

use taskdesk_client::{
    http::Attachment,
    models::{Decision, PendingUser},
    Route, Taskdesk,
};

use super::{enter, print_notices};

#[derive(Subcommand)]
pub enum ProfileAction {
    Edit {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        picture: Option<PathBuf>,
    },
}

pub async fn profile(app: &Taskdesk, action: Option<ProfileAction>) -> anyhow::Result<()> {
    enter(app, Route::Profile)?;
    let view = app.profile();
    let loaded = view.load().await;
    print_notices(&view.notices);
    loaded?;

    if let Some(ProfileAction::Edit {
        first_name,
        last_name,
        picture,
    }) = action
    {
        let current = view.profile().await;
        let (first, last) = match &current {
            Some(p) => (p.user.first_name.clone(), p.user.last_name.clone()),
            None => (String::new(), String::new()),
        };
        let picture = match picture {
            Some(path) => Some(Attachment::from_path(path).await?),
            None => None,
        };
        let saved = view
            .save(
                &first_name.unwrap_or(first),
                &last_name.unwrap_or(last),
                picture,
            )
            .await;
        print_notices(&view.notices);
        saved?;
    }

    if let Some(p) = view.profile().await {
        println!("{} ({})", p.user.display_name(), p.user.role);
        println!("username:   {}", p.user.username);
        println!("email:      {}", p.user.email);
        if let Some(number) = &p.user.employee_number {
            println!("employee #: {number}");
        }
        if let Some(department) = &p.department {
            println!("department: {department}");
        }
        if let Some(joined) = p.date_joined {
            println!("joined:     {}", joined.format("%Y-%m-%d"));
        }
    }
    Ok(())
}

pub async fn password(app: &Taskdesk, old: &str, new: &str, confirm: &str) -> anyhow::Result<()> {
    enter(app, Route::Profile)?;
    let view = app.profile();
    let changed = view.change_password(old, new, confirm).await;
    print_notices(&view.notices);
    Ok(changed?)
}

pub async fn users(app: &Taskdesk) -> anyhow::Result<()> {
    enter(app, Route::Users)?;
    let view = app.user_management();
    view.load().await?;
    let requests = view.requests().await;

    let counts = &requests.count;
    println!(
        "total {}  pending {}  active {}  rejected {}",
        counts.total, counts.pending, counts.active, counts.rejected
    );
    for (label, users) in [
        ("Pending", &requests.pending),
        ("Active", &requests.active),
        ("Rejected", &requests.rejected),
    ] {
        println!("{label}:");
        for user in users {
            print_user(user);
        }
    }
    Ok(())
}

pub async fn decide(app: &Taskdesk, user_id: i64, approve: bool) -> anyhow::Result<()> {
    enter(app, Route::Users)?;
    let view = app.user_management();
    let decision = if approve {
        Decision::Approve
    } else {
        Decision::Reject
    };
    let outcome = view.decide(user_id, decision).await;
    print_notices(&view.notices);
    Ok(outcome?)
}

fn print_user(user: &PendingUser) {
    println!(
        "  {:>5}  {:<20} {:<8} {}",
        user.id,
        format!("{} {}", user.first_name, user.last_name).trim(),
        user.role,
        user.email
    );
}
