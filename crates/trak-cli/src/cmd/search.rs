use crate::actor;
use crate::output::{print_json, print_table};
use std::path::Path;

/// `trak search <query>` — cross-entity search scoped to the actor.
pub fn run(root: &Path, query: &str, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let results = trak_core::search::search(root, query, &actor)?;

    if json {
        print_json(&results)?;
        return Ok(());
    }

    let total =
        results.tickets.len() + results.projects.len() + results.users.len() + results.teams.len();
    if total == 0 {
        println!("No results for '{query}'.");
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for t in &results.tickets {
        rows.push(vec!["ticket".into(), t.id.to_string(), t.title.clone()]);
    }
    for p in &results.projects {
        rows.push(vec!["project".into(), p.id.to_string(), p.name.clone()]);
    }
    for u in &results.users {
        rows.push(vec!["user".into(), u.id.to_string(), format!("{} <{}>", u.name, u.email)]);
    }
    for t in &results.teams {
        rows.push(vec!["team".into(), t.id.to_string(), t.name.clone()]);
    }
    print_table(&["TYPE", "ID", "MATCH"], rows);
    Ok(())
}
