use crate::actor;
use crate::output::{print_json, print_table};
use anyhow::bail;
use clap::Subcommand;
use std::path::Path;
use trak_core::access;
use trak_core::notify::Notification;
use trak_core::team::{self, Team};
use trak_core::user::User;

#[derive(Subcommand)]
pub enum TeamSubcommand {
    /// Create a team (admin only)
    Create {
        name: String,
        /// Manager for the new team
        #[arg(long)]
        manager: u32,
        /// Users to move into the team
        #[arg(long = "member")]
        members: Vec<u32>,
    },
    /// List visible teams
    List,
    /// List a team's approved members (admin only)
    Members { team_id: u32 },
    /// Hand a team to a new manager (admin only)
    SetManager { team_id: u32, user_id: u32 },
}

pub fn run(root: &Path, subcmd: TeamSubcommand, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    match subcmd {
        TeamSubcommand::Create {
            name,
            manager,
            members,
        } => create(root, &name, manager, &members, json, acting),
        TeamSubcommand::List => list(root, json, acting),
        TeamSubcommand::Members { team_id } => members(root, team_id, json, acting),
        TeamSubcommand::SetManager { team_id, user_id } => {
            set_manager(root, team_id, user_id, json, acting)
        }
    }
}

fn create(
    root: &Path,
    name: &str,
    manager: u32,
    members: &[u32],
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    if !access::can_create_team(&actor) {
        bail!("permission denied: only admins may create teams");
    }

    let created = Team::create(root, name, manager)?;
    team::add_members(root, created.id, members)?;

    if json {
        print_json(&serde_json::json!({
            "id": created.id,
            "name": created.name,
            "manager_id": created.manager_id,
        }))?;
    } else {
        println!("Created team '{}' [{}]", created.name, created.id);
    }
    Ok(())
}

fn list(root: &Path, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let teams = Team::list(root)?;
    let visible = access::visible_teams(&teams, &actor);

    if json {
        let items: Vec<serde_json::Value> = visible
            .iter()
            .map(|t| serde_json::json!({ "id": t.id, "name": t.name, "manager_id": t.manager_id }))
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if visible.is_empty() {
        println!("No visible teams.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = visible
        .iter()
        .map(|t| vec![t.id.to_string(), t.name.clone(), t.manager_id.to_string()])
        .collect();
    print_table(&["ID", "NAME", "MANAGER"], rows);
    Ok(())
}

fn members(root: &Path, team_id: u32, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let team = Team::load(root, team_id)?;
    if !access::can_manage_team(&team, &actor) {
        bail!("permission denied: you do not manage team {team_id}");
    }
    let members = User::members_of(root, team_id)?;

    if json {
        let items: Vec<serde_json::Value> = members
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "role": m.role,
                    "is_manager": m.id == team.manager_id,
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = members
        .iter()
        .map(|m| {
            vec![
                m.id.to_string(),
                m.name.clone(),
                m.role.to_string(),
                if m.id == team.manager_id { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "ROLE", "MANAGER"], rows);
    Ok(())
}

fn set_manager(
    root: &Path,
    team_id: u32,
    user_id: u32,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let current = Team::load(root, team_id)?;
    if !access::can_manage_team(&current, &actor) {
        bail!("permission denied: you do not manage team {team_id}");
    }

    let (team, lead, others) = team::assign_manager(root, team_id, user_id)?;

    Notification::create(
        root,
        lead.id,
        format!("You have been assigned as Team Lead for {}", team.name),
        Some("/teams".to_string()),
    )?;
    for member in &others {
        Notification::create(
            root,
            member.id,
            format!("{} is now the Team Lead for {}", lead.name, team.name),
            Some("/teams".to_string()),
        )?;
    }

    if json {
        print_json(&serde_json::json!({ "id": team.id, "manager_id": team.manager_id }))?;
    } else {
        println!("{} is now the Team Lead for {}", lead.name, team.name);
    }
    Ok(())
}
