//! Helpers behind the `mediasweep` command-line tool.

use std::io::BufRead;

use mediasweep_core::{AppError, AssetId, MediaAsset};
use mediasweep_db::ContentStore;
use mediasweep_services::ReferenceScanner;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Output format of `scan`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Render unused media as a fixed-width table.
pub fn render_table(rows: &[MediaAsset]) -> String {
    if rows.is_empty() {
        return "No unused media found.\n".to_string();
    }

    let mut out = format!("{:>8}  {:<40}  {}\n", "ID", "Filename", "URL");
    out.push_str(&"-".repeat(100));
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:>8}  {:<40}  {}\n",
            row.id,
            truncate_string(&row.filename, 40),
            row.url
        ));
    }
    out.push_str(&format!("\n{} unused attachment(s)\n", rows.len()));
    out
}

/// Read a yes/no answer. Anything but `y` or `yes` declines.
pub fn confirm(prompt: &str, mut input: impl BufRead) -> std::io::Result<bool> {
    println!("{} [y/N]", prompt);
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Ids a `delete` invocation targets: the explicit ids, or every attachment a fresh
/// scan finds unreferenced.
///
/// Selecting unused attachments needs every reference check; a narrowed policy is
/// refused.
pub async fn delete_targets(
    ids: &[AssetId],
    all_unused: bool,
    scanner: &ReferenceScanner,
    store: &dyn ContentStore,
) -> Result<Vec<AssetId>, AppError> {
    if !all_unused {
        return Ok(ids.to_vec());
    }

    if !scanner.policy().is_complete() {
        return Err(AppError::InvalidInput(
            "Selecting unused attachments requires every reference check".to_string(),
        ));
    }

    let all = store.list_asset_ids().await?;
    let result = scanner.find_unreferenced(&all, store).await?;
    Ok(result.unreferenced)
}
