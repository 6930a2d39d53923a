use crate::actor;
use crate::output::{print_json, print_table};
use std::path::Path;
use trak_core::access;
use trak_core::project::Project;
use trak_core::ticket::{self, Ticket};

/// `trak board [--project <id>]` — visible tickets grouped by status.
pub fn run(root: &Path, project: Option<u32>, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;

    let projects = Project::list(root)?;
    let index = access::ProjectIndex::new(&projects);

    let tickets = match project {
        Some(id) => {
            // 404s before any visibility filtering, same as the API.
            Project::load(root, id)?;
            Ticket::list_by_project(root, id)?
        }
        None => Ticket::list(root)?,
    };
    let visible = access::visible_tickets(&tickets, &index, &actor);
    let columns = ticket::board(visible);

    if json {
        let mut map = serde_json::Map::new();
        for (status, column) in &columns {
            map.insert(status.as_str().to_string(), serde_json::to_value(column)?);
        }
        print_json(&serde_json::Value::Object(map))?;
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (status, column) in &columns {
        for t in column {
            rows.push(vec![
                status.to_string(),
                t.id.to_string(),
                t.title.clone(),
                t.assignee.clone(),
            ]);
        }
    }
    if rows.is_empty() {
        println!("No visible tickets.");
        return Ok(());
    }
    print_table(&["COLUMN", "ID", "TITLE", "ASSIGNEE"], rows);
    Ok(())
}
