#[cfg(test)]
mod memory;
mod system;

#[cfg(test)]
pub use memory::MemoryClipboard;
pub use system::SystemClipboard;

use crate::error::Result;

/// The shared, system-wide clipboard. Commands and the secret lifecycle only
/// talk to this trait.
pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> Result<()>;
    /// Current text, `None` when the clipboard is empty or holds non-text data.
    fn get_text(&mut self) -> Result<Option<String>>;
    fn clear(&mut self) -> Result<()>;
}
