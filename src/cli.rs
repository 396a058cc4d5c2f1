use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "passclip",
    about = "Show, copy and manage pass entries. Copied secrets are purged from the clipboard automatically.",
    version
)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an entry, or a single field of it.
    Show {
        entry: String,
        /// Field to print (`secret` is the first line).
        #[arg(long, short)]
        field: Option<String>,
    },

    /// Copy a field to the clipboard and clear it after the timeout.
    Copy {
        entry: String,
        #[arg(long, short, default_value = "secret")]
        field: String,
    },

    /// Print the URL field of an entry.
    Url { entry: String },

    /// List the field names of an entry (never values).
    Fields { entry: String },

    /// Edit an entry with $EDITOR through `pass edit`.
    Edit { entry: String },

    /// Add a new entry (password is prompted interactively).
    Insert {
        entry: String,
        /// Overwrite an existing entry.
        #[arg(long, short)]
        force: bool,
    },

    /// Generate a new password for an entry.
    Generate {
        entry: String,
        /// Password length (defaults to the configured length).
        length: Option<usize>,
        #[arg(long, short)]
        force: bool,
        #[arg(long, short)]
        no_symbols: bool,
        /// Copy the new password to the clipboard instead of printing it.
        #[arg(long, short)]
        clip: bool,
    },

    /// Remove an entry.
    Remove {
        entry: String,
        /// Remove a directory of entries.
        #[arg(long, short)]
        recursive: bool,
    },

    /// Rename or move an entry.
    Rename {
        entry: String,
        new_entry: String,
        #[arg(long, short)]
        force: bool,
    },

    /// Copy an entry to a new name.
    Duplicate {
        entry: String,
        new_entry: String,
        #[arg(long, short)]
        force: bool,
    },

    /// Initialize the store (or a subfolder) for the given GPG ids.
    Init {
        #[arg(required = true)]
        gpg_ids: Vec<String>,
        /// Subfolder to initialize.
        #[arg(long)]
        path: Option<String>,
    },

    /// Run a git command inside the store.
    Git {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },

    /// List entry names (never values).
    List {
        /// Only list entries under this folder.
        subdir: Option<String>,
    },

    /// Print the version of the external pass tool.
    Version,

    /// Interactive mode: copy, clear and edit without leaving the prompt.
    Session,
}
