use crate::app::{AppContext, Result, VaultError};
use crate::domain::{PostRef, ScrapeResult};

pub async fn extract(ctx: &AppContext, url: &str, json: bool) -> Result<()> {
    let result = extract_or_fail(ctx, url).await?;

    if json {
        println!("{}", to_json(&result)?);
    } else {
        print_scrape(&result);
    }
    Ok(())
}

/// Extract, persist, and print the `PersistResult` as JSON.
pub async fn archive(ctx: &AppContext, url: &str, owner: &str, post: Option<&str>) -> Result<()> {
    let post_ref = PostRef::parse(url)?;
    let post_id = post.unwrap_or(&post_ref.shortcode);

    // Fail on missing storage settings before launching a browser
    let persister = ctx.persister()?;

    let result = extract_or_fail(ctx, url).await?;
    let persisted = persister.persist(&result.media, owner, post_id).await;

    println!("{}", to_json(&persisted)?);
    if !persisted.success {
        eprintln!(
            "{} of {} items kept their CDN URL",
            persisted.errors.len(),
            persisted.urls.len()
        );
    }
    Ok(())
}

async fn extract_or_fail(ctx: &AppContext, url: &str) -> Result<ScrapeResult> {
    ctx.extract(url)
        .await?
        .ok_or_else(|| VaultError::Other(format!("No media found for {}", url)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| VaultError::Other(e.to_string()))
}

fn print_scrape(result: &ScrapeResult) {
    if !result.author.is_empty() {
        println!("Author: {}", result.author);
    }
    if !result.caption.is_empty() {
        println!("Caption: {}", result.caption);
    }
    println!("{} slides:", result.slide_count);
    for (i, item) in result.media.iter().enumerate() {
        let kind = if item.is_video() { "video" } else { "image" };
        println!("  [{}] {} {}", i, kind, item.url);
    }
}
