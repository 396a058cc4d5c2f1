use std::sync::mpsc::{self, Sender};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::clipboard::Clipboard;
use crate::error::{PassError, Result};

type Reply<T> = Sender<std::result::Result<T, String>>;

enum Request {
    Set(Zeroizing<String>, Reply<()>),
    Get(Reply<Option<String>>),
    Clear(Reply<()>),
}

/// The desktop clipboard, via `arboard`.
///
/// The `arboard::Clipboard` lives on a dedicated thread for the life of the
/// process: on X11 the selection is only served while it exists, and it is not
/// `Send` on every platform.
pub struct SystemClipboard {
    requests: Sender<Request>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let (requests, inbox) = mpsc::channel::<Request>();
        let (ready_tx, ready_rx) = mpsc::channel();

        std::thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || {
                let mut clipboard = match arboard::Clipboard::new() {
                    Ok(clipboard) => {
                        let _ = ready_tx.send(Ok(()));
                        clipboard
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                for request in inbox {
                    match request {
                        Request::Set(text, reply) => {
                            let result = clipboard.set_text(text.as_str()).map_err(|e| e.to_string());
                            let _ = reply.send(result);
                        }
                        Request::Get(reply) => {
                            let result = match clipboard.get_text() {
                                Ok(text) if text.is_empty() => Ok(None),
                                Ok(text) => Ok(Some(text)),
                                Err(arboard::Error::ContentNotAvailable) => Ok(None),
                                Err(e) => Err(e.to_string()),
                            };
                            let _ = reply.send(result);
                        }
                        Request::Clear(reply) => {
                            let result = clipboard.clear().map_err(|e| e.to_string());
                            let _ = reply.send(result);
                        }
                    }
                }
                debug!("clipboard worker stopped");
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { requests }),
            Ok(Err(e)) => Err(PassError::Clipboard(e)),
            Err(_) => Err(PassError::Clipboard("clipboard worker exited".into())),
        }
    }

    fn call<T>(&self, build: impl FnOnce(Reply<T>) -> Request) -> Result<T> {
        let (reply, response) = mpsc::channel();
        self.requests
            .send(build(reply))
            .map_err(|_| PassError::Clipboard("clipboard worker is gone".into()))?;
        match response.recv() {
            Ok(result) => result.map_err(|e| {
                warn!("clipboard request failed: {}", e);
                PassError::Clipboard(e)
            }),
            Err(_) => Err(PassError::Clipboard("clipboard worker is gone".into())),
        }
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let text = Zeroizing::new(text.to_string());
        self.call(|reply| Request::Set(text, reply))
    }

    fn get_text(&mut self) -> Result<Option<String>> {
        self.call(Request::Get)
    }

    fn clear(&mut self) -> Result<()> {
        self.call(Request::Clear)
    }
}
