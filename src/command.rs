use std::path::{Path, PathBuf};

use crate::error::{PassError, Result};

/// One positional slot in an argument list. Absent slots are dropped when the
/// command line is built; they never turn into empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Present(String),
    Absent,
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Present(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Present(value)
    }
}

impl From<usize> for Arg {
    fn from(value: usize) -> Self {
        Arg::Present(value.to_string())
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Arg::Absent)
    }
}

/// An immutable, fully-assembled invocation of the external tool. Escaping
/// for the single-string shell form lives here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<Arg>,
    action: String,
    entry: String,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>, action: &str, entry: &str) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            action: action.to_string(),
            entry: entry.to_string(),
        }
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Push `name` only when `enabled` is set.
    pub fn flag(self, enabled: bool, name: &str) -> Self {
        self.arg(enabled.then_some(name))
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Subcommand name, used in diagnostics.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Entry the command operates on, used in diagnostics. May be empty.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Present arguments in order.
    pub fn argv(&self) -> Vec<String> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Present(value) => Some(value.clone()),
                Arg::Absent => None,
            })
            .collect()
    }

    /// The whole invocation as one shell-escaped string: program and every
    /// argument quoted individually, joined by single spaces.
    pub fn shell_line(&self) -> Result<String> {
        let program = self.program.to_string_lossy();
        let mut parts = vec![shell_escape(&program)?];
        for arg in self.argv() {
            parts.push(shell_escape(&arg)?);
        }
        Ok(parts.join(" "))
    }
}

/// POSIX single-quote escaping. Tokens made only of characters the shell
/// never interprets are left bare.
pub fn shell_escape(value: &str) -> Result<String> {
    if value.contains('\0') {
        return Err(PassError::UnsafeArgument(value.replace('\0', "\\0")));
    }
    if value.is_empty() {
        return Ok("''".to_string());
    }
    let is_plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if is_plain {
        return Ok(value.to_string());
    }

    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            escaped.push_str("'\\''");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    Ok(escaped)
}

/// Constructs the command lines for each `pass` subcommand this front end uses.
/// Arguments are emitted in exactly the order `pass` expects them.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: PathBuf,
}

impl CommandBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn base(&self, action: &str, entry: &str) -> CommandLine {
        CommandLine::new(&self.program, action, entry).arg(action)
    }

    pub fn show(&self, entry: &str) -> CommandLine {
        self.base("show", entry).arg(entry)
    }

    pub fn edit(&self, entry: &str) -> CommandLine {
        self.base("edit", entry).arg(entry)
    }

    pub fn insert(&self, entry: &str, force: bool) -> CommandLine {
        self.base("insert", entry)
            .arg("--multiline")
            .flag(force, "--force")
            .arg(entry)
    }

    pub fn generate(&self, entry: &str, length: usize, force: bool, no_symbols: bool) -> CommandLine {
        self.base("generate", entry)
            .flag(force, "--force")
            .flag(no_symbols, "--no-symbols")
            .arg(entry)
            .arg(length)
    }

    pub fn remove(&self, entry: &str, recursive: bool) -> CommandLine {
        self.base("remove", entry)
            .arg("--force")
            .flag(recursive, "--recursive")
            .arg(entry)
    }

    pub fn rename(&self, entry: &str, new_entry: &str, force: bool) -> CommandLine {
        self.base("rename", entry)
            .flag(force, "--force")
            .arg(entry)
            .arg(new_entry)
    }

    pub fn copy(&self, entry: &str, new_entry: &str, force: bool) -> CommandLine {
        self.base("copy", entry)
            .flag(force, "--force")
            .arg(entry)
            .arg(new_entry)
    }

    pub fn init(&self, path: Option<&str>, gpg_ids: &[String]) -> CommandLine {
        self.base("init", path.unwrap_or(""))
            .arg(path.map(|p| format!("--path={}", p)))
            .args(gpg_ids.iter().map(String::as_str))
    }

    pub fn git(&self, args: &[String]) -> CommandLine {
        self.base("git", "").args(args.iter().map(String::as_str))
    }

    pub fn version(&self) -> CommandLine {
        self.base("version", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CommandBuilder {
        CommandBuilder::new("pass")
    }

    #[test]
    fn test_generate_omits_nothing_when_all_flags_set() {
        let cmd = builder().generate("foo", 20, true, true);
        assert_eq!(
            cmd.argv(),
            vec!["generate", "--force", "--no-symbols", "foo", "20"]
        );
    }

    #[test]
    fn test_absent_flags_are_dropped_not_emptied() {
        let cmd = builder().generate("foo", 20, false, false);
        assert_eq!(cmd.argv(), vec!["generate", "foo", "20"]);
        assert!(cmd.argv().iter().all(|a| !a.is_empty()));
    }

    #[test]
    fn test_absent_slots_preserve_order_of_present_ones() {
        let cmd = CommandLine::new("pass", "x", "")
            .arg("a")
            .arg(Arg::Absent)
            .arg(None::<String>)
            .arg(Some("b"))
            .arg("c");
        assert_eq!(cmd.argv(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_present_empty_string_is_kept() {
        let cmd = CommandLine::new("pass", "x", "").arg("");
        assert_eq!(cmd.argv(), vec![""]);
        assert_eq!(cmd.shell_line().unwrap(), "pass ''");
    }

    #[test]
    fn test_subcommand_shapes() {
        let b = builder();
        assert_eq!(b.show("web/site").argv(), vec!["show", "web/site"]);
        assert_eq!(b.edit("site").argv(), vec!["edit", "site"]);
        assert_eq!(
            b.remove("dir", true).argv(),
            vec!["remove", "--force", "--recursive", "dir"]
        );
        assert_eq!(b.remove("x", false).argv(), vec!["remove", "--force", "x"]);
        assert_eq!(b.rename("a", "b", false).argv(), vec!["rename", "a", "b"]);
        assert_eq!(
            b.copy("a", "b", true).argv(),
            vec!["copy", "--force", "a", "b"]
        );
        assert_eq!(
            b.insert("a", false).argv(),
            vec!["insert", "--multiline", "a"]
        );
        assert_eq!(b.version().argv(), vec!["version"]);
    }

    #[test]
    fn test_init_with_and_without_path() {
        let ids = vec!["alice@example.com".to_string(), "ABCDEF12".to_string()];
        assert_eq!(
            builder().init(Some("work"), &ids).argv(),
            vec!["init", "--path=work", "alice@example.com", "ABCDEF12"]
        );
        assert_eq!(
            builder().init(None, &ids).argv(),
            vec!["init", "alice@example.com", "ABCDEF12"]
        );
    }

    #[test]
    fn test_git_passes_arguments_verbatim() {
        let args = vec!["log".to_string(), "--oneline".to_string()];
        assert_eq!(builder().git(&args).argv(), vec!["git", "log", "--oneline"]);
    }

    #[test]
    fn test_shell_escape_plain_tokens_left_bare() {
        assert_eq!(shell_escape("web/site-1.example").unwrap(), "web/site-1.example");
        assert_eq!(shell_escape("--path=dir").unwrap(), "--path=dir");
    }

    #[test]
    fn test_shell_escape_quotes_metacharacters() {
        assert_eq!(shell_escape("a b").unwrap(), "'a b'");
        assert_eq!(shell_escape("$(rm -rf ~)").unwrap(), "'$(rm -rf ~)'");
        assert_eq!(shell_escape("it's").unwrap(), "'it'\\''s'");
    }

    #[test]
    fn test_shell_escape_rejects_nul() {
        let err = shell_escape("a\0b").unwrap_err();
        assert!(matches!(err, PassError::UnsafeArgument(_)));
    }

    #[test]
    fn test_shell_line_escapes_program_and_args() {
        let cmd = CommandBuilder::new("/opt/my tools/pass").show("my site");
        assert_eq!(
            cmd.shell_line().unwrap(),
            "'/opt/my tools/pass' show 'my site'"
        );
    }

    #[test]
    fn test_shell_line_fails_closed() {
        let cmd = builder().show("bad\0entry");
        assert!(cmd.shell_line().is_err());
    }

    #[test]
    fn test_shell_line_round_trips_through_sh() {
        let cmd = CommandLine::new("printf", "printf", "")
            .arg("%s|")
            .arg("it's")
            .arg("a b")
            .arg("$HOME");
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(cmd.shell_line().unwrap())
            .output()
            .expect("Failed to run sh");
        assert_eq!(String::from_utf8_lossy(&output.stdout), "it's|a b|$HOME|");
    }
}
