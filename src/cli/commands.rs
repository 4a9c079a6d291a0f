//! Command dispatch: wires parsed arguments to services.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::LoadedUrls;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{expand_chain, PathKey};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;
use crate::util::path::expand_path;

/// Options of the `tree` command.
#[derive(Debug)]
struct TreeOptions<'a> {
    file: &'a Path,
    filter: Option<&'a str>,
    reveal: &'a [String],
    all: bool,
    state: Option<&'a Path>,
    json: bool,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree {
            file,
            filter,
            reveal,
            all,
            state,
            json,
        }) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            cmd_tree(
                &container,
                TreeOptions {
                    file,
                    filter: filter.as_deref(),
                    reveal,
                    all: *all,
                    state: state.as_deref(),
                    json: *json,
                },
            )
        }
        Some(Commands::Chain { url }) => cmd_chain(url),
        Some(Commands::Stats { file }) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            cmd_stats(&container, file)
        }
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `sitetree --help`".to_string(),
        )),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(expand_path(dir)),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    let settings = Settings::load(Some(dir.as_path()))?;
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn load_urls(container: &ServiceContainer, file: &Path) -> CliResult<LoadedUrls> {
    let loaded = container.loader().load(&expand_path(file))?;
    if loaded.truncated > 0 {
        output::warning(&format!(
            "{} URLs beyond max_urls = {} ignored",
            loaded.truncated, container.settings.max_urls
        ));
    }
    Ok(loaded)
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(container: &ServiceContainer, opts: TreeOptions<'_>) -> CliResult<()> {
    let invalid = opts
        .reveal
        .iter()
        .filter_map(|url| PathKey::parse(url).err())
        .map(|e| e.to_string())
        .join("; ");
    if !invalid.is_empty() {
        return Err(CliError::InvalidArgs(invalid));
    }

    let loaded = load_urls(container, opts.file)?;
    let mut service = container.index_service();
    let stats = service.replace_urls(loaded.urls);
    if stats.dropped > 0 {
        output::warning(&format!("{} malformed URLs skipped", stats.dropped));
    }

    if let Some(query) = opts.filter {
        service.set_filter(query);
    }

    let store = container.expansion_store();
    let state_path = opts.state.map(expand_path);
    if let Some(path) = &state_path {
        if let Some(snapshot) = store.load(path)? {
            service.restore_expansion(snapshot);
        }
    }

    for url in opts.reveal {
        service.reveal(url);
    }
    if opts.all {
        service.expand_all();
    }

    if opts.json {
        let json = serde_json::to_string_pretty(service.active_tree()).map_err(|e| {
            InfraError::Json {
                context: "serialize tree".to_string(),
                source: e,
            }
        })?;
        output::info(&json);
    } else {
        let policy = service.policy();
        let rendered = service
            .active_tree()
            .to_tree_string(service.active_expansion(), &policy);
        output::info(&rendered);
    }

    if let Some(path) = &state_path {
        store.save(path, &service.expansion_snapshot())?;
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_chain(url: &str) -> CliResult<()> {
    if let Err(e) = PathKey::parse(url) {
        output::warning(&e);
    }
    output::info(&expand_chain(url).iter().join("\n"));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_stats(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let loaded = load_urls(container, file)?;
    let format = loaded.format;
    let read = loaded.urls.len();
    let mut service = container.index_service();
    let stats = service.replace_urls(loaded.urls);
    let tree = service.canonical_tree();

    output::header(&file.display());
    output::field("format", &format!("{format:?}"));
    output::field("read", &read);
    output::field("truncated", &loaded.truncated);
    output::field("accepted", &stats.accepted);
    output::field("dropped", &stats.dropped);
    output::field("hosts", &tree.root_node().children.len());
    output::field("nodes", &tree.len());
    output::field("leaves", &tree.leaf_count());
    output::field("depth", &tree.depth());
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let dir = config_dir(cli)?;
            output::header(&"Config files");
            match global_config_path() {
                Some(path) => output::field("global", &annotate(&path)),
                None => output::field("global", &"(no home directory)"),
            }
            output::field("local", &annotate(&local_config_path(&dir)));
            output::detail(&"environment: SITETREE_* overrides both");
        }
    }
    Ok(())
}

fn annotate(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
