use std::sync::{Arc, Mutex};

use zeroize::Zeroize;

use super::Clipboard;
use crate::error::{PassError, Result};

/// Process-local clipboard. Clones share the same buffer, which lets tests
/// play the part of another application writing to the clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.contents
            .lock()
            .map_err(|_| PassError::Clipboard("clipboard buffer poisoned".into()))
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut contents = self.lock()?;
        if let Some(old) = contents.as_mut() {
            old.zeroize();
        }
        *contents = Some(text.to_string());
        Ok(())
    }

    fn get_text(&mut self) -> Result<Option<String>> {
        Ok(self.lock()?.clone().filter(|text| !text.is_empty()))
    }

    fn clear(&mut self) -> Result<()> {
        let mut contents = self.lock()?;
        if let Some(old) = contents.as_mut() {
            old.zeroize();
        }
        *contents = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_shares_buffer_between_clones() {
        let mut a = MemoryClipboard::new();
        let mut b = a.clone();
        a.set_text("value").unwrap();
        assert_eq!(b.get_text().unwrap().as_deref(), Some("value"));
        b.clear().unwrap();
        assert_eq!(a.get_text().unwrap(), None);
    }

    #[test]
    fn test_memory_clipboard_empty_text_reads_as_none() {
        let mut clip = MemoryClipboard::new();
        clip.set_text("").unwrap();
        assert_eq!(clip.get_text().unwrap(), None);
    }
}
