use std::io::Write;

use anyhow::{Context as _, Result};
use secrecy::ExposeSecret;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::edit::edit_entry;
use crate::commands::Context;
use crate::lifecycle::SecretClipboard;
use crate::store::SECRET_FIELD;

const HELP: &str = "\
Commands:
  copy <entry> [field]      copy a field (default: secret) to the clipboard
  clear                     clear the copied secret now
  show <entry> [field]      print an entry or one field
  edit <entry>              edit an entry
  generate <entry> [len]    generate a new password
  list [folder]             list entries
  status                    show what is currently exposed
  help                      this text
  quit                      clear the clipboard and exit";

#[derive(Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Copy { entry: String, field: String },
    Clear,
    Show { entry: String, field: Option<String> },
    Edit { entry: String },
    Generate { entry: String, length: Option<usize> },
    List { subdir: Option<String> },
    Status,
    Help,
    Quit,
    Empty,
}

impl SessionCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Ok(SessionCommand::Empty);
        };

        let entry = |usage: &str| {
            args.first()
                .map(|e| e.to_string())
                .ok_or_else(|| format!("usage: {}", usage))
        };
        let too_many = |max: usize, usage: &str| {
            if args.len() > max {
                Err(format!("usage: {}", usage))
            } else {
                Ok(())
            }
        };

        match verb {
            "copy" | "c" => {
                too_many(2, "copy <entry> [field]")?;
                Ok(SessionCommand::Copy {
                    entry: entry("copy <entry> [field]")?,
                    field: args.get(1).unwrap_or(&SECRET_FIELD).to_string(),
                })
            }
            "clear" => {
                too_many(0, "clear")?;
                Ok(SessionCommand::Clear)
            }
            "show" => {
                too_many(2, "show <entry> [field]")?;
                Ok(SessionCommand::Show {
                    entry: entry("show <entry> [field]")?,
                    field: args.get(1).map(|f| f.to_string()),
                })
            }
            "edit" => {
                too_many(1, "edit <entry>")?;
                Ok(SessionCommand::Edit {
                    entry: entry("edit <entry>")?,
                })
            }
            "generate" => {
                too_many(2, "generate <entry> [length]")?;
                let length = match args.get(1) {
                    Some(raw) => Some(
                        raw.parse()
                            .ok()
                            .filter(|&n: &usize| n > 0)
                            .ok_or_else(|| format!("invalid length: {}", raw))?,
                    ),
                    None => None,
                };
                Ok(SessionCommand::Generate {
                    entry: entry("generate <entry> [length]")?,
                    length,
                })
            }
            "list" | "ls" => {
                too_many(1, "list [folder]")?;
                Ok(SessionCommand::List {
                    subdir: args.first().map(|s| s.to_string()),
                })
            }
            "status" => Ok(SessionCommand::Status),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            other => Err(format!("unknown command '{}'; type 'help'", other)),
        }
    }
}

/// Line-oriented interactive mode. Unlike the one-shot `copy` command, the
/// prompt stays available while a secret is exposed: copying again replaces
/// it and `clear` purges it.
pub async fn run(ctx: &Context) -> Result<()> {
    let secrets = ctx.secret_clipboard()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        print!("passclip> ");
        std::io::stdout().flush().context("Failed to write prompt")?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                println!();
                None
            }
        };
        let Some(line) = line else { break };

        let command = match SessionCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };
        if command == SessionCommand::Quit {
            break;
        }
        // Failures are reported and the prompt continues.
        if let Err(e) = dispatch(ctx, &secrets, command).await {
            eprintln!("Error: {:#}", e);
        }
    }

    secrets.purge().await?;
    Ok(())
}

async fn dispatch(ctx: &Context, secrets: &SecretClipboard, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Copy { entry, field } => {
            secrets
                .copy(&entry, &field)
                .await
                .with_context(|| format!("Failed to copy {} of '{}'", field, entry))?;
        }
        SessionCommand::Clear => {
            if secrets.purge().await?.is_none() {
                println!("Nothing to clear.");
            }
        }
        SessionCommand::Show { entry, field } => {
            let client = ctx.client.clone();
            let lookup = entry.clone();
            let text = tokio::task::spawn_blocking(move || match field {
                Some(field) => client.field(&lookup, &field),
                None => client.show(&lookup),
            })
            .await?
            .with_context(|| format!("Failed to show '{}'", entry))?;
            println!("{}", text.expose_secret().trim_end());
        }
        SessionCommand::Edit { entry } => {
            // The editor owns the terminal; the prompt resumes when it exits.
            edit_entry(&ctx.client, &entry).await?;
            println!("Finished editing '{}'.", entry);
        }
        SessionCommand::Generate { entry, length } => {
            let length = length.unwrap_or(ctx.settings.generated_length);
            let cmd = ctx.client.commands().generate(&entry, length, false, false);
            let handle = ctx
                .client
                .invoker()
                .run_async(&cmd, |output| print!("{}", output))
                .with_context(|| format!("Failed to generate a password for '{}'", entry))?;
            tokio::spawn(async move {
                match handle.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => eprintln!("Error: {}", e),
                    Err(e) => eprintln!("Generating '{}' was interrupted: {}", entry, e),
                }
            });
        }
        SessionCommand::List { subdir } => {
            for entry in ctx.entries.list(subdir.as_deref()) {
                println!("{}", entry);
            }
        }
        SessionCommand::Status => match secrets.exposed().await {
            Some((entry, field)) => println!(
                "{} of '{}' is on the clipboard (clears {} seconds after copying).",
                field,
                entry,
                secrets.timeout().as_secs()
            ),
            None => println!("Nothing is exposed."),
        },
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Quit | SessionCommand::Empty => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_copy_defaults_to_secret_field() {
        assert_eq!(
            SessionCommand::parse("copy web/site").unwrap(),
            SessionCommand::Copy {
                entry: "web/site".into(),
                field: "secret".into()
            }
        );
        assert_eq!(
            SessionCommand::parse("  c web/site username ").unwrap(),
            SessionCommand::Copy {
                entry: "web/site".into(),
                field: "username".into()
            }
        );
    }

    #[test]
    fn test_parse_requires_entry() {
        let err = SessionCommand::parse("copy").unwrap_err();
        assert_eq!(err, "usage: copy <entry> [field]");
        assert!(SessionCommand::parse("edit").is_err());
    }

    #[test]
    fn test_parse_rejects_extra_arguments() {
        assert!(SessionCommand::parse("clear now").is_err());
        assert!(SessionCommand::parse("edit a b").is_err());
    }

    #[test]
    fn test_parse_generate_length() {
        assert_eq!(
            SessionCommand::parse("generate foo 20").unwrap(),
            SessionCommand::Generate {
                entry: "foo".into(),
                length: Some(20)
            }
        );
        assert!(SessionCommand::parse("generate foo 0").is_err());
        assert!(SessionCommand::parse("generate foo many").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(SessionCommand::parse("").unwrap(), SessionCommand::Empty);
        assert_eq!(SessionCommand::parse("quit").unwrap(), SessionCommand::Quit);
        assert_eq!(SessionCommand::parse("clear").unwrap(), SessionCommand::Clear);
        assert_eq!(
            SessionCommand::parse("ls work").unwrap(),
            SessionCommand::List {
                subdir: Some("work".into())
            }
        );
        assert!(SessionCommand::parse("frobnicate").is_err());
    }
}
