use super::App;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use recruit_application::{BookmarkOutcome, FetchOutcome};
use recruit_core::post::{Post, PostQuery};

pub async fn list(
    app: &App,
    page: u32,
    keyword: Option<String>,
    filters: Vec<(String, String)>,
) -> Result<()> {
    app.require_user().await?;

    let mut query = PostQuery::new().page(page);
    if let Some(keyword) = keyword {
        query = query.keyword(keyword);
    }
    for (key, value) in filters {
        query = query.param(key, value);
    }

    load_page(app, &query).await?;

    let view = app.posts.snapshot();
    if view.items.is_empty() {
        println!("No postings found");
        return Ok(());
    }
    let today = Local::now().date_naive();
    for post in &view.items {
        println!("{}", format_post(post, today));
    }
    println!("\nPage {} of {}", page, view.total_pages);
    Ok(())
}

pub async fn bookmark(app: &App, post_id: &str, page: u32) -> Result<()> {
    app.require_user().await?;
    load_page(app, &PostQuery::new().page(page)).await?;

    let pending = app.posts.toggle_bookmark(post_id);
    match pending.optimistic_state() {
        Some(true) => println!("★ Bookmarking {}...", post_id),
        Some(false) => println!("☆ Removing bookmark from {}...", post_id),
        None => println!("Toggling bookmark on {} (not on page {})...", post_id, page),
    }

    match pending.await {
        BookmarkOutcome::Confirmed => {
            println!("✅ Done");
            Ok(())
        }
        BookmarkOutcome::RolledBack(e) | BookmarkOutcome::Failed(e) => Err(app.reject(e)),
    }
}

pub async fn bookmarks(app: &App) -> Result<()> {
    app.require_user().await?;

    let posts = app.posts.fetch_bookmarked().await.map_err(|e| app.reject(e))?;
    if posts.is_empty() {
        println!("No bookmarked postings");
        return Ok(());
    }
    let today = Local::now().date_naive();
    for post in &posts {
        println!("{}", format_post(post, today));
    }
    Ok(())
}

async fn load_page(app: &App, query: &PostQuery) -> Result<()> {
    match app.posts.fetch_posts(query.encode()).await {
        FetchOutcome::Applied | FetchOutcome::Superseded => Ok(()),
        FetchOutcome::Failed(e) => Err(app.reject(e)),
    }
}

fn format_post(post: &Post, today: NaiveDate) -> String {
    let mark = if post.is_bookmarked { "★" } else { "☆" };
    format!(
        "{} [{:>6}] {} - {} ({})",
        mark,
        post.deadline(today).to_string(),
        post.company_name,
        post.position_title,
        post.id
    )
}
