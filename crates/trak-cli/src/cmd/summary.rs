use crate::actor;
use crate::output::print_json;
use std::path::Path;

/// `trak summary` — counts over the actor's visible tickets.
pub fn run(root: &Path, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let summary = trak_core::summary::summarize(root, &actor)?;

    if json {
        print_json(&summary)?;
        return Ok(());
    }

    println!(
        "{}/{} tickets completed",
        summary.completed_tickets, summary.total_tickets
    );
    for (label, count) in &summary.by_status {
        println!("  {label}: {count}");
    }
    if let Some(team_stats) = &summary.team_stats {
        println!("\nPer team:");
        for (name, stats) in team_stats {
            println!("  {name}: {}/{} completed", stats.completed, stats.total);
        }
    }
    Ok(())
}
