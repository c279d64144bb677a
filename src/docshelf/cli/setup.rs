use clap::{CommandFactory, Parser, Subcommand};
use docshelf::convert::Quality;
use std::path::PathBuf;

/// Returns the version string, with the git hash for builds from a checkout.
/// Format: "0.3.2", "0.3.2 (abc1234)" or "0.3.2 (abc1234, modified)"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("DOCSHELF_GIT_HASH");
    const GIT_DIRTY: &str = env!("DOCSHELF_GIT_DIRTY");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| match (GIT_HASH.is_empty(), GIT_DIRTY == "true") {
        (true, _) => VERSION.to_string(),
        (false, false) => format!("{} ({})", VERSION, GIT_HASH),
        (false, true) => format!("{} ({}, modified)", VERSION, GIT_HASH),
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "docshelf",
    bin_name = "docshelf",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Store, search and convert documents to PDF", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $DOCSHELF_DATA or the platform data dir)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Command groups for the top-level help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Library,
    Document,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Library => "Library Commands:",
            CommandGroup::Document => "Per-Document Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "add" | "list" | "search" => Some(CommandGroup::Library),
            "view" | "convert" | "export" | "delete" => Some(CommandGroup::Document),
            "config" | "paths" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Library,
            CommandGroup::Document,
            CommandGroup::Misc,
        ]
    }
}

pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("docshelf {version}\n"));
    output.push_str("Store, search and convert documents to PDF\n");
    output.push('\n');
    output.push_str("Usage: docshelf [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();
    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", sc.get_name(), about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("      --data <DIR>  Data directory\n");
    output.push_str("  -v, --verbose     Verbose output\n");
    output.push_str("  -h, --help        Print help\n");
    output.push_str("  -V, --version     Print version\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints clap's help for one subcommand, or the grouped help without one.
pub fn print_subcommand_help(command: &Option<Commands>) {
    let name = match command {
        Some(command) => command.name(),
        None => {
            print_grouped_help();
            return;
        }
    };

    let mut cmd = Cli::command();
    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name {
            print!("{}", subcmd.render_help());
            return;
        }
    }
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a file to the shelf
    #[command(alias = "a", display_order = 1)]
    Add {
        /// Path of the file to add
        file: PathBuf,

        /// Document name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List documents
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Only show documents whose name contains this term
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Search documents by name
    #[command(display_order = 3)]
    Search { term: String },

    /// Show one or more documents
    #[command(alias = "v", display_order = 10)]
    View {
        /// Indexes or ids of the documents (e.g. 1 3)
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Also save the original files
        #[arg(long)]
        save: bool,

        /// Directory for saved files
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Convert a Word or text document to PDF
    #[command(alias = "c", display_order = 11)]
    Convert {
        /// Index or id of the document
        selector: String,

        /// basic or advanced (defaults to the configured quality)
        #[arg(short, long)]
        quality: Option<Quality>,

        /// Directory for the PDF
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Save the original files of one or more documents
    #[command(display_order = 12)]
    Export {
        /// Indexes or ids of the documents (e.g. 1 3)
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Directory for saved files
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Delete one or more documents
    #[command(alias = "rm", display_order = 13)]
    Delete {
        /// Indexes or ids of the documents (e.g. 1 3)
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Get or set configuration
    #[command(display_order = 20)]
    Config {
        /// Configuration key (e.g., default-quality)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print the data directory and files in use
    #[command(display_order = 21)]
    Paths,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Search { .. } => "search",
            Commands::View { .. } => "view",
            Commands::Convert { .. } => "convert",
            Commands::Export { .. } => "export",
            Commands::Delete { .. } => "delete",
            Commands::Config { .. } => "config",
            Commands::Paths => "paths",
        }
    }
}
