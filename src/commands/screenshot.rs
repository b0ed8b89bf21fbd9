// Screenshot command - capture the visible page into a new note and copy the image

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::TimeZone;
use futures::future::BoxFuture;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::session::Session;

use super::Notice;

/// Capture of the visible page
pub trait ScreenCapture: Send + Sync {
    /// PNG image as a `data:image/png;base64,...` URL
    fn capture(&self) -> BoxFuture<'_, Result<String>>;
}

/// System clipboard
pub trait ClipboardWriter: Send + Sync {
    fn write_png(&self, png: Vec<u8>) -> BoxFuture<'_, Result<()>>;
}

/// Note title for a capture taken at `at` (ms), in local time
pub fn screenshot_title(at: i64) -> String {
    match chrono::Local.timestamp_millis_opt(at).single() {
        Some(time) => format!("Screenshot - {}", time.format("%-m/%-d/%Y, %-I:%M:%S %p")),
        None => "Screenshot".to_string(),
    }
}

/// Note content embedding the captured image
pub fn screenshot_content(data_url: &str) -> String {
    format!("<img src=\"{data_url}\" alt=\"Screen Capture\"/>")
}

/// Decode the bytes of a base64 `data:` URL
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidImage("not a data URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidImage("missing payload".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(Error::InvalidImage(format!("unsupported encoding: {meta}")));
    }
    BASE64
        .decode(payload.trim())
        .map_err(|e| Error::InvalidImage(e.to_string()))
}

async fn copy_to_clipboard(clipboard: &dyn ClipboardWriter, data_url: &str) -> Result<()> {
    let png = decode_data_url(data_url)?;
    clipboard.write_png(png).await
}

impl Session {
    /// Capture, store as a new selected note (leaving the bin if shown), then copy to the clipboard.
    /// Clipboard failures are logged only.
    pub async fn capture_screenshot(
        &mut self,
        capture: &dyn ScreenCapture,
        clipboard: &dyn ClipboardWriter,
    ) -> Notice {
        let data_url = match capture.capture().await {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "screenshot capture failed");
                return Notice::error("Failed to capture screen. Try again.");
            }
        };

        let title = screenshot_title(self.clock.now());
        let (note, _) = self.view.insert_note(&mut self.store, title, screenshot_content(&data_url));
        debug!(id = note.id, "saved screenshot note");

        if let Err(e) = copy_to_clipboard(clipboard, &data_url).await {
            warn!(error = %e, "failed to copy image to clipboard");
        }
        Notice::success("Screenshot saved & copied!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        assert_eq!(decode_data_url("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert!(decode_data_url("http://x/y.png").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_content_embeds_image() {
        assert_eq!(
            screenshot_content("data:image/png;base64,AA=="),
            "<img src=\"data:image/png;base64,AA==\" alt=\"Screen Capture\"/>"
        );
        assert!(screenshot_title(0).starts_with("Screenshot - "));
    }
}
