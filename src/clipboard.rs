//! System clipboard access via arboard.

use gridcalc_core::ClipboardProvider;

/// The desktop clipboard.
pub struct SystemClipboard;

impl ClipboardProvider for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        let mut cb = match arboard::Clipboard::new() {
            Ok(cb) => cb,
            Err(err) => {
                log::warn!("system clipboard unavailable: {}", err);
                return None;
            }
        };
        cb.get_text().ok()
    }

    fn set_text(&mut self, text: String) -> bool {
        let mut cb = match arboard::Clipboard::new() {
            Ok(cb) => cb,
            Err(err) => {
                log::warn!("system clipboard unavailable: {}", err);
                return false;
            }
        };
        cb.set_text(text).is_ok()
    }
}
