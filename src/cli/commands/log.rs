use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::load_log;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::colors::{GREEN, MAGENTA, RED, YELLOW, paint};

fn color_for_operation(op: &str) -> &'static str {
    match op {
        "add" | "material" | "init" => GREEN,
        "finish_work_order" => RED,
        "update_work_order" | "modify_work_order" | "status" => YELLOW,
        "migration_applied" => MAGENTA,
        _ => "",
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if !matches!(cmd, Commands::Log { print: true }) {
        return Ok(());
    }

    let store = super::open_store(cfg)?;
    let entries = load_log(&store.conn)?;
    if entries.is_empty() {
        info("The internal log is empty.");
        return Ok(());
    }

    let id_w = entries
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(1);

    println!("📜 Internal log:\n");
    for e in entries {
        let date = chrono::DateTime::parse_from_rfc3339(&e.date)
            .map(|dt| dt.format("%F %T").to_string())
            .unwrap_or(e.date);
        let op = paint(&e.operation, color_for_operation(&e.operation));
        let target = if e.target.is_empty() {
            String::new()
        } else {
            format!(" ({})", e.target)
        };
        println!("{:>id_w$}: {date:<19} | {op}{target} => {}", e.id, e.message);
    }

    Ok(())
}
