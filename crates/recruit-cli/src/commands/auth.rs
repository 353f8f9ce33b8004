use super::{App, submission_error};
use anyhow::Result;
use recruit_application::SessionState;
use recruit_core::auth::{Credentials, Registration};

pub async fn login(app: &App, email: String, password: String) -> Result<()> {
    app.session.initialize().await;
    let user = app
        .session
        .login(&Credentials::new(email, password))
        .await
        .map_err(|e| submission_error("Login", e))?;
    println!("✅ Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn signup(app: &App, name: String, email: String, password: String) -> Result<()> {
    app.session.initialize().await;
    let user = app
        .session
        .sign_up(&Registration::new(name, email, password))
        .await
        .map_err(|e| submission_error("Registration", e))?;
    println!("✅ Registered and logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub fn logout(app: &App) {
    app.session.logout();
    println!("👋 Logged out");
}

pub async fn whoami(app: &App) -> Result<()> {
    match app.session.initialize().await {
        SessionState::Authenticated => {
            if let Some(user) = app.session.user() {
                println!("{} <{}>", user.name, user.email);
                println!("  id:   {}", user.id);
                println!("  role: {}", user.role);
            }
        }
        _ => println!("Not logged in"),
    }
    Ok(())
}
