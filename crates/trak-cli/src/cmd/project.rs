use crate::actor;
use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::Path;
use trak_core::access;
use trak_core::project::{self, NewProject, Project, ProjectFilter};

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Create a project (admins and managers)
    Create {
        name: String,
        #[arg(long)]
        team: u32,
        /// Project lead (a manager's user id)
        #[arg(long)]
        lead: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List visible projects
    List {
        #[arg(long)]
        lead: Option<u32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        team: Option<u32>,
        /// Substring match on name/description
        #[arg(long)]
        search: Option<String>,
    },
}

pub fn run(
    root: &Path,
    subcmd: ProjectSubcommand,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Create {
            name,
            team,
            lead,
            description,
            status,
            start,
            deadline,
        } => create(
            root, &name, team, lead, description, status, start, deadline, json, acting,
        ),
        ProjectSubcommand::List {
            lead,
            status,
            team,
            search,
        } => list(root, lead, status, team, search, json, acting),
    }
}

fn parse_date(value: Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
        })
        .transpose()
}

#[allow(clippy::too_many_arguments)]
fn create(
    root: &Path,
    name: &str,
    team: u32,
    lead: u32,
    description: Option<String>,
    status: Option<String>,
    start: Option<String>,
    deadline: Option<String>,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    if !access::can_create_project(&actor) {
        bail!("permission denied: only admins and managers may create projects");
    }

    let project = Project::create(
        root,
        NewProject {
            name: name.to_string(),
            description,
            team_id: team,
            team_lead_id: lead,
            status,
            start_date: parse_date(start)?,
            deadline: parse_date(deadline)?,
        },
    )?;

    if json {
        print_json(&project)?;
    } else {
        println!("Created project '{}' [{}]", project.name, project.id);
    }
    Ok(())
}

fn list(
    root: &Path,
    lead: Option<u32>,
    status: Option<String>,
    team: Option<u32>,
    search: Option<String>,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let projects = Project::list(root)?;
    let visible = access::visible_projects(&projects, &actor);
    let filtered = project::apply_filter(
        visible,
        &ProjectFilter {
            team_lead_id: lead,
            status,
            team_id: team,
            search,
        },
    );

    if json {
        print_json(&filtered)?;
        return Ok(());
    }

    if filtered.is_empty() {
        println!("No visible projects.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = filtered
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.status.clone(),
                p.team_id.to_string(),
                p.team_lead_id.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "STATUS", "TEAM", "LEAD"], rows);
    Ok(())
}
