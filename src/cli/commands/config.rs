use crate::cli::parser::Commands;
use crate::config::{Config, Settings};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &mut Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
        set,
    } = cmd
    {
        if let Some(assignment) = set {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                AppError::Config(format!("expected KEY=VALUE, got '{assignment}'"))
            })?;
            cfg.write(key.trim(), value.trim())?;
            success(format!("{} = {}", key.trim(), value.trim()));
        }

        if *print_config {
            println!("📄 Current configuration:\n");
            println!("{}", cfg.to_yaml()?);
        }

        if *edit_config {
            edit_file(editor.clone())?;
        }
    }

    Ok(())
}

fn edit_file(requested: Option<String>) -> AppResult<()> {
    let path = Config::config_file();
    if !path.exists() {
        return Err(AppError::Config(format!(
            "{} does not exist, run `rschedule init` first",
            path.display()
        )));
    }

    let default_editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });
    let editor = requested.unwrap_or_else(|| default_editor.clone());

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {
            success(format!("Configuration file edited using '{editor}'"));
            return Ok(());
        }
        _ => warning(format!(
            "Editor '{editor}' not available, falling back to '{default_editor}'"
        )),
    }

    match Command::new(&default_editor).arg(&path).status() {
        Ok(s) if s.success() => {
            success(format!("Configuration file edited using '{default_editor}'"));
        }
        _ => error(format!(
            "Failed to edit configuration file using '{default_editor}'"
        )),
    }
    Ok(())
}
