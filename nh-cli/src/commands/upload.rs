//! Upload command - store an image in the configured images folder.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use console::style;

use nh_core::error::{NhError, NhResult};
use nh_services::{LocalFileStore, UploadService};
use crate::OutputFormat;

use super::AppContext;

/// MIME type from the file extension.
fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub async fn run(
    ctx: &AppContext,
    file: String,
    mime: Option<String>,
    format: OutputFormat,
) -> NhResult<()> {
    let path = Path::new(&file);
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| NhError::InvalidInput(format!("not a file name: {file}")))?;
    let mime = mime.unwrap_or_else(|| guess_mime(path).to_string());

    let root = ctx.baked.effective_file_root()?;
    let service = UploadService::new(Arc::new(LocalFileStore::new(root)), &ctx.config.images_folder);
    let result = service.upload(name, &mime, &BASE64.encode(&bytes));

    match format {
        OutputFormat::Json => super::print_json(&result)?,
        OutputFormat::Text => {
            if result.success {
                println!("  {} Uploaded {name}\n", style("OK").green().bold());
                println!("    Path: {}", result.file_path.as_deref().unwrap_or("-"));
                println!("    URL:  {}", result.file_url.as_deref().unwrap_or("-"));
            } else {
                println!(
                    "  {} {}",
                    style("FAIL").red().bold(),
                    result.error.as_deref().unwrap_or("upload failed")
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a/cat.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("README")), "application/octet-stream");
    }
}
