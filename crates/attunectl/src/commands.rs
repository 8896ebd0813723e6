//! Command implementations for attunectl

use crate::client::DaemonClient;
use anyhow::{bail, Result};
use attune_shared::EmotionLabel;
use owo_colors::OwoColorize;

fn emotion_marker(label: EmotionLabel) -> &'static str {
    match label {
        EmotionLabel::Sadness => "(sad)",
        EmotionLabel::Joy => "(joy)",
        EmotionLabel::Anger => "(angry)",
        EmotionLabel::Fear => "(afraid)",
        EmotionLabel::Surprise => "(surprised)",
        EmotionLabel::Disgust => "(disgusted)",
        EmotionLabel::Neutral => "(neutral)",
    }
}

pub async fn say(client: &DaemonClient, message: &str) -> Result<()> {
    if message.trim().is_empty() {
        bail!("No message provided");
    }

    let reply = client.respond(message).await?;

    println!(
        "{} {}",
        "you".bright_black(),
        emotion_marker(reply.emotion).cyan()
    );
    println!("{} {}", "attune:".bold(), reply.response);
    Ok(())
}

pub async fn rewrite(client: &DaemonClient, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("No text provided");
    }

    let reply = client.rewrite(text).await?;
    println!("{}", "rewritten:".bold());
    println!("{}", reply.rewritten_text);
    Ok(())
}

pub async fn health(client: &DaemonClient) -> Result<()> {
    let health = client.health().await?;

    println!("[OK] {}", health.status.green());
    println!("  version     {}", health.version);
    println!("  uptime      {}s", health.uptime_seconds);
    println!("  classifier  {}", health.classifier_model);
    println!("  generator   {}", health.generator_model);
    Ok(())
}
