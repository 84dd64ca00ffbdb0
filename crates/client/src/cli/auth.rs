use std::path::PathBuf;

use clap::Args;

use taskdesk_client::{
    http::Attachment, services::Credentials, session::peek_claims, Route, Taskdesk,
};

use super::{enter, print_notices};

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "TASKDESK_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long, env = "TASKDESK_CONFIRM_PASSWORD", hide_env_values = true)]
    confirm_password: String,
    /// Requested role: Manager or Member
    #[arg(long, default_value = "Member")]
    designation: String,
    #[arg(long, default_value = "")]
    employee_number: String,
    #[arg(long, default_value = "")]
    department: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    picture: Option<PathBuf>,
}

pub async fn login(app: &Taskdesk, username: String, password: String) -> anyhow::Result<()> {
    enter(app, Route::Login)?;
    let user = app
        .services
        .auth
        .login(&Credentials { username, password })
        .await?;
    println!(
        "Signed in as {} ({}). Home: {}",
        user.display_name(),
        user.role,
        Route::home(user.role).path()
    );
    Ok(())
}

pub async fn register(app: &Taskdesk, args: RegisterArgs) -> anyhow::Result<()> {
    enter(app, Route::Register)?;
    let mut page = app.registration();
    let picture = match args.picture {
        Some(path) => Some(Attachment::from_path(path).await?),
        None => None,
    };
    let form = &mut page.form;
    form.first_name = args.first_name;
    form.last_name = args.last_name;
    form.username = args.username;
    form.email = args.email;
    form.password = args.password;
    form.confirm_password = args.confirm_password;
    form.designation = args.designation;
    form.employee_number = args.employee_number;
    form.department = args.department;
    form.phone = args.phone;
    form.picture = picture;

    let outcome = page.submit().await;
    print_notices(&page.notices);
    Ok(outcome?)
}

pub async fn logout(app: &Taskdesk) -> anyhow::Result<()> {
    app.services.auth.logout().await?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(app: &Taskdesk) -> anyhow::Result<()> {
    let Some(session) = app.session.current() else {
        println!("Not signed in");
        return Ok(());
    };
    let user = &session.user;
    println!("{} <{}>", user.display_name(), user.email);
    println!("username: {}", user.username);
    println!("role:     {}", user.role);
    match peek_claims(&session.access_token) {
        Ok(claims) => {
            if let Some(expires) = claims.expires_at() {
                println!("token expires: {}", expires.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        Err(e) => tracing::debug!("Access token is not a readable JWT: {}", e),
    }
    let links: Vec<&str> = app.guard.sidebar().iter().map(|l| l.path).collect();
    println!("pages:    {}", links.join(" "));
    Ok(())
}
