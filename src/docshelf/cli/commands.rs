use super::render::{
    print_config, print_documents, print_full_documents, print_messages, print_paths, print_saved,
};
use super::setup::{print_grouped_help, print_subcommand_help, Cli, Commands};
use clap::Parser;
use docshelf::api::{CmdResult, ConfigAction, DocshelfApi};
use docshelf::convert::Quality;
use docshelf::download;
use docshelf::error::{DocshelfError, Result};
use docshelf::index::DocSelector;
use docshelf::init::initialize;
use docshelf::input::LocalFile;
use docshelf::store::fs::FileStore;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: DocshelfApi<FileStore>,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.help {
        if cli.command.is_none() {
            print_grouped_help();
        } else {
            print_subcommand_help(&cli.command);
        }
        return Ok(());
    }

    init_tracing(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Add {
            file,
            name,
            description,
        }) => handle_add(&mut ctx, file, name, description),
        Some(Commands::List { search }) => handle_list(&ctx, search),
        Some(Commands::Search { term }) => handle_list(&ctx, Some(term)),
        Some(Commands::View {
            selectors,
            save,
            out,
        }) => handle_view(&ctx, selectors, save, out),
        Some(Commands::Convert {
            selector,
            quality,
            out,
        }) => handle_convert(&ctx, selector, quality, out).await,
        Some(Commands::Export { selectors, out }) => handle_export(&ctx, selectors, out),
        Some(Commands::Delete { selectors, yes }) => handle_delete(&mut ctx, selectors, yes),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        Some(Commands::Paths) => handle_paths(&ctx),
        None => handle_list(&ctx, None),
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` for the docshelf crate with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warn,docshelf=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let ctx = initialize(cli.data.clone())?;
    debug!(data_dir = %ctx.api.paths().data_dir.display(), "context ready");
    Ok(AppContext { api: ctx.api })
}

fn handle_add(
    ctx: &mut AppContext,
    file: PathBuf,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if !file.is_file() {
        return Err(DocshelfError::Validation(format!(
            "No such file: {}",
            file.display()
        )));
    }
    let input = LocalFile::new(&file)?;
    let result = ctx.api.add_document(name, description, Some(&input))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext, search: Option<String>) -> Result<()> {
    let result = ctx.api.list_documents(search.as_deref())?;
    print_documents(&result.listed_documents);
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(
    ctx: &AppContext,
    selectors: Vec<String>,
    save: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let result = ctx.api.view_documents(&selectors)?;
    print_full_documents(&result.listed_documents);

    if save {
        println!();
        let exported = ctx.api.export_documents(&selectors)?;
        save_artifacts(&exported, out)?;
    }
    Ok(())
}

async fn handle_convert(
    ctx: &AppContext,
    selector: String,
    quality: Option<Quality>,
    out: Option<PathBuf>,
) -> Result<()> {
    let result = ctx.api.convert_document(&selector, quality).await?;
    print_messages(&result.messages);
    save_artifacts(&result, out)
}

fn handle_export(ctx: &AppContext, selectors: Vec<String>, out: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.export_documents(&selectors)?;
    print_messages(&result.messages);
    save_artifacts(&result, out)
}

fn handle_delete(ctx: &mut AppContext, selectors: Vec<String>, yes: bool) -> Result<()> {
    if !yes {
        // Only ask about documents that exist; the rest are reported by delete
        let matching = ctx
            .api
            .list_documents(None)?
            .listed_documents
            .into_iter()
            .filter(|doc| {
                selectors
                    .iter()
                    .filter_map(|s| s.parse::<DocSelector>().ok())
                    .any(|sel| sel.matches(doc))
            })
            .collect::<Vec<_>>();

        if !matching.is_empty() {
            for doc in &matching {
                println!("  {}. {}", doc.index, doc.record.name);
            }
            if !confirm(&format!("Delete {} document(s)?", matching.len()))? {
                println!("Aborted.");
                return Ok(());
            }
        }
    }

    let result = ctx.api.delete_documents(&selectors)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(action)?;
    match &result.config {
        Some(config) if show_all => print_config(config),
        _ => print_messages(&result.messages),
    }
    Ok(())
}

fn handle_paths(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.data_paths()?;
    print_paths(&result.paths);
    Ok(())
}

fn save_artifacts(result: &CmdResult, out: Option<PathBuf>) -> Result<()> {
    let dir = match out {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    for artifact in &result.artifacts {
        let path = download::save(&dir, &artifact.filename, &artifact.bytes)?;
        print_saved(&path);
    }
    Ok(())
}

/// Reads a yes/no answer from stdin. Anything but `y`/`yes` (including EOF) is no.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n\n"));
        assert!(!is_yes("yep"));
    }
}
