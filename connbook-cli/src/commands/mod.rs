//! Command handler modules for the CLI.

mod add;
mod check;
mod delete;
mod duplicate;
mod export_import;
mod folder;
mod history;
mod list;
mod paths;
mod show;
mod update;

use crate::cli::Commands;
use crate::error::CliError;
use crate::util::Context;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(context: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List {
            format,
            folder,
            protocol,
        } => list::cmd_list(context, format, folder.as_deref(), protocol.as_deref()),
        Commands::Show { name } => show::cmd_show(context, &name),
        Commands::Add {
            name,
            host,
            port,
            protocol,
            folder,
            fields,
        } => add::cmd_add(
            context,
            add::AddParams {
                name: &name,
                host: &host,
                port,
                protocol: &protocol,
                folder: folder.as_deref(),
                fields: &fields,
            },
        ),
        Commands::Update {
            name,
            new_name,
            host,
            port,
            protocol,
            fields,
        } => update::cmd_update(
            context,
            update::UpdateParams {
                name: &name,
                new_name: new_name.as_deref(),
                host: host.as_deref(),
                port,
                protocol: protocol.as_deref(),
                fields: &fields,
            },
        ),
        Commands::Duplicate { name, new_name } => {
            duplicate::cmd_duplicate(context, &name, new_name.as_deref())
        }
        Commands::Delete { target, folder } => delete::cmd_delete(context, &target, folder),
        Commands::Mkdir { path } => folder::cmd_mkdir(context, &path),
        Commands::RenameFolder { path, name } => folder::cmd_rename(context, &path, &name),
        Commands::Move { target, to, folder } => folder::cmd_move(context, &target, &to, folder),
        Commands::Sort { path, recursive } => {
            folder::cmd_sort(context, path.as_deref().unwrap_or(""), recursive)
        }
        Commands::Check => check::cmd_check(context),
        Commands::Resolve { path } => paths::cmd_resolve(context, &path),
        Commands::Path { target, folder } => paths::cmd_path(context, &target, folder),
        Commands::History { name, directory } => {
            history::cmd_history(context, &name, directory.as_deref())
        }
        Commands::ImportSsh { file, folder } => {
            export_import::cmd_import_ssh(context, file.as_deref(), &folder)
        }
        Commands::ExportSsh { output } => export_import::cmd_export_ssh(context, &output),
        Commands::Merge { file, folder } => {
            export_import::cmd_merge(context, &file, folder.as_deref())
        }
    }
}
