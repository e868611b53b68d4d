use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::queries::{NewWorkOrder, insert_material, insert_report_line, insert_work_order};
use crate::errors::{AppError, AppResult};
use crate::schedule::edit::MAX_PRIORITY;
use crate::ui::messages::{success, warning};

/// One `--line` value: `part;description;qty;material`.
#[derive(Debug, PartialEq, Eq)]
struct LineSpec {
    part: String,
    description: String,
    quantity: i64,
    material: String,
}

fn parse_line(raw: &str) -> AppResult<LineSpec> {
    let parts: Vec<&str> = raw.split(';').map(str::trim).collect();
    let [part, description, qty, material] = parts.as_slice() else {
        return Err(AppError::Other(format!(
            "line '{raw}' must be PART;DESCRIPTION;QTY;MATERIAL"
        )));
    };
    let quantity = qty
        .parse()
        .map_err(|_| AppError::Other(format!("line '{raw}': quantity '{qty}' is not a number")))?;
    Ok(LineSpec {
        part: part.to_string(),
        description: description.to_string(),
        quantity,
        material: material.to_string(),
    })
}

/// Handle `add` and `material`: scheduler-side data entry.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Add {
            job,
            job_ref,
            queue,
            priority,
            description,
            material,
            qty,
            notes,
            customer,
            due,
            lines,
        } => {
            if !(1..=MAX_PRIORITY).contains(priority) {
                return Err(AppError::InvalidPriority {
                    job: job.clone(),
                    value: priority.to_string(),
                });
            }
            let lines = lines
                .iter()
                .map(|l| parse_line(l))
                .collect::<AppResult<Vec<_>>>()?;

            let order = NewWorkOrder {
                job_ref: job_ref.clone(),
                job_number: job.clone(),
                queue: super::queue_or_default(queue, cfg),
                priority: *priority,
                description: description.clone(),
                material: material.clone(),
                material_qty: qty.clone(),
                notes: notes.clone(),
                customer: customer.clone(),
                due_date: due.clone(),
            };

            let mut store = super::open_store(cfg)?;
            let tx = store.conn.transaction()?;
            insert_work_order(&tx, &order)?;
            for (i, line) in lines.iter().enumerate() {
                insert_report_line(
                    &tx,
                    job_ref,
                    i as i64 + 1,
                    &line.part,
                    &line.description,
                    line.quantity,
                    &line.material,
                )?;
            }
            tx.commit()?;

            if let Err(e) = ttlog(
                &store.conn,
                "add",
                job,
                &format!("Scheduled on '{}' with priority {:03}", order.queue, priority),
            ) {
                warning(format!("Failed to write internal log: {e}"));
            }
            success(format!(
                "Job {job} scheduled on '{}' ({} report line(s))",
                order.queue,
                lines.len()
            ));
        }
        Commands::Material { name } => {
            let store = super::open_store(cfg)?;
            insert_material(&store.conn, name)?;
            if let Err(e) = ttlog(&store.conn, "material", name, "Material registered") {
                warning(format!("Failed to write internal log: {e}"));
            }
            success(format!("Material '{name}' registered"));
        }
        _ => {}
    }
    Ok(())
}
