use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

use crate::pass::PassClient;
use crate::process::ProcessInvoker;

const FAKE_PASS: &str = r#"#!/bin/sh
dir=$(dirname "$0")
case "$1" in
  show)
    case "$2" in
      site) printf 'hunter2\nusername: alice\nurl: https://example.com/login\n' ;;
      other) printf 'correcthorse\n' ;;
      *) echo "Error: $2 is not in the password store." >&2; exit 1 ;;
    esac ;;
  insert) { echo "$*"; cat; } > "$dir/last-insert" ;;
  remove)
    case "$3" in
      locked) echo "Error: cannot remove $3" >&2; exit 1 ;;
    esac
    echo "$*" ;;
  *) echo "$*" ;;
esac
"#;

/// Write an executable script. The write happens in a child process so no
/// writable descriptor to the script leaks into children forked by other
/// test threads (which would make exec fail with ETXTBSY).
pub fn fake_pass(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("pass");
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(r#"cat > "$1" && chmod 755 "$1""#)
        .arg("sh")
        .arg(&path)
        .stdin(Stdio::piped())
        .spawn()
        .expect("Failed to spawn sh");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(body.as_bytes())
        .expect("Failed to write script");
    assert!(child.wait().expect("sh did not run").success());
    path
}

/// A temporary directory holding a scripted stand-in for `pass`.
pub struct FakeStore {
    dir: TempDir,
    program: PathBuf,
}

impl FakeStore {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let program = fake_pass(dir.path(), FAKE_PASS);
        Self { dir, program }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn client(&self) -> PassClient {
        let invoker = ProcessInvoker::new(self.program.to_str().expect("utf-8 temp path"))
            .expect("fake pass should be executable");
        PassClient::new(invoker)
    }
}
