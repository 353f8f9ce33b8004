use super::App;
use anyhow::Result;
use chrono::Local;
use recruit_core::applicant::ProfileUpdate;
use recruit_core::applicant::model::generate_cv_key;

pub async fn show(app: &App) -> Result<()> {
    app.require_user().await?;

    let Some(profile) = app.profiles.get_profile().await.map_err(|e| app.reject(e))? else {
        println!("No applicant profile yet. Create one with `recruit profile save`");
        return Ok(());
    };

    if let Some(name) = &profile.name {
        println!("Name:        {}", name);
    }
    if let Some(email) = &profile.email {
        println!("Email:       {}", email);
    }
    println!("Enrolled:    {}", profile.enroll_year);
    println!("Departments: {}", profile.departments().join(", "));
    println!("CV:          {}", profile.cv_file_name().unwrap_or("-"));
    Ok(())
}

pub async fn save(app: &App, year: u8, departments: Vec<String>, cv: Option<String>) -> Result<()> {
    app.require_user().await?;

    // Keep the stored CV unless a new file name was given.
    let cv_key = match cv {
        Some(file_name) => generate_cv_key(&file_name, Local::now().date_naive()),
        None => app
            .profiles
            .get_profile()
            .await
            .map_err(|e| app.reject(e))?
            .map(|profile| profile.cv_key)
            .unwrap_or_default(),
    };

    let update = ProfileUpdate::new(year, &departments, cv_key);
    app.profiles
        .save_profile(&update)
        .await
        .map_err(|e| app.reject(e))?;
    println!(
        "✅ Saved profile ({}, {})",
        update.enroll_year, update.department
    );
    Ok(())
}
