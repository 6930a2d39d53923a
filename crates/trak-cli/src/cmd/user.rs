use crate::actor;
use crate::output::{print_json, print_table};
use anyhow::bail;
use clap::Subcommand;
use std::path::Path;
use trak_core::access;
use trak_core::notify::Notification;
use trak_core::team::Team;
use trak_core::types::Role;
use trak_core::user::User;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Register a new account (pending approval)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// admin accounts cannot self-register
        #[arg(long)]
        role: String,
        /// Team to register into
        #[arg(long)]
        team: Option<u32>,
    },
    /// List registrations pending approval for a team
    Pending { team_id: u32 },
    /// Approve a pending registration
    Approve { team_id: u32, user_id: u32 },
    /// Reject and delete a pending registration
    Disapprove { team_id: u32, user_id: u32 },
    /// List all accounts (admin only)
    List,
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::Register {
            name,
            email,
            password,
            role,
            team,
        } => register(root, &name, &email, &password, &role, team, json),
        UserSubcommand::Pending { team_id } => pending(root, team_id, json, acting),
        UserSubcommand::Approve { team_id, user_id } => approve(root, team_id, user_id, json, acting),
        UserSubcommand::Disapprove { team_id, user_id } => {
            disapprove(root, team_id, user_id, json, acting)
        }
        UserSubcommand::List => list(root, json, acting),
    }
}

fn register(
    root: &Path,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
    team: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let role: Role = role.parse()?;
    if role == Role::Admin {
        bail!("admin accounts cannot self-register; seed one with 'trak init'");
    }
    let user = User::register(root, name, email, password, role, team)?;

    if json {
        print_json(&serde_json::json!({
            "id": user.id,
            "email": user.email,
            "approved": user.approved,
        }))?;
    } else {
        println!("Registered {} [{}]; waiting for approval", user.email, user.id);
    }
    Ok(())
}

fn pending(root: &Path, team_id: u32, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let team = Team::load(root, team_id).ok();
    if !access::can_approve_user(team.as_ref(), &actor) {
        bail!("permission denied: you cannot approve users for team {team_id}");
    }

    let mut pending = User::pending_for_team(root, team_id)?;
    // Managers only handle developer registrations; the rest is admin work.
    if actor.role == Role::Manager {
        pending.retain(|u| u.role == Role::Developer);
    }

    if json {
        let items: Vec<serde_json::Value> = pending
            .iter()
            .map(|u| serde_json::json!({ "id": u.id, "name": u.name, "email": u.email, "role": u.role }))
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if pending.is_empty() {
        println!("No pending registrations for team {team_id}.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = pending
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.name.clone(),
                u.email.clone(),
                u.role.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "EMAIL", "ROLE"], rows);
    Ok(())
}

fn approve(
    root: &Path,
    team_id: u32,
    user_id: u32,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let team = Team::load(root, team_id).ok();
    if !access::can_approve_user(team.as_ref(), &actor) {
        bail!("permission denied: you cannot approve users for team {team_id}");
    }
    let candidate = User::load(root, user_id)?;
    if candidate.team_id != Some(team_id) {
        bail!("user {user_id} is not registered for team {team_id}");
    }

    let user = User::approve(root, user_id)?;
    let team_name = team.map(|t| t.name).unwrap_or_else(|| format!("team {team_id}"));
    Notification::create(
        root,
        user.id,
        format!("Your account has been approved for team {team_name}"),
        Some("/board".to_string()),
    )?;

    if json {
        print_json(&serde_json::json!({ "id": user.id, "approved": true }))?;
    } else {
        println!("Approved {} for team {team_name}", user.name);
    }
    Ok(())
}

fn disapprove(
    root: &Path,
    team_id: u32,
    user_id: u32,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let team = Team::load(root, team_id).ok();
    if !access::can_approve_user(team.as_ref(), &actor) {
        bail!("permission denied: you cannot approve users for team {team_id}");
    }
    let candidate = User::load(root, user_id)?;
    if candidate.team_id != Some(team_id) {
        bail!("user {user_id} is not registered for team {team_id}");
    }

    let removed = User::disapprove(root, user_id)?;

    if json {
        print_json(&serde_json::json!({ "id": removed.id, "removed": true }))?;
    } else {
        println!("Disapproved and removed registration for {}", removed.name);
    }
    Ok(())
}

fn list(root: &Path, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    if !access::can_list_users(&actor) {
        bail!("permission denied: only admins may list all accounts");
    }

    let users = User::list(root)?;
    if json {
        let items: Vec<serde_json::Value> = users
            .iter()
            .map(|u| {
                serde_json::json!({
                    "id": u.id,
                    "name": u.name,
                    "email": u.email,
                    "role": u.role,
                    "team_id": u.team_id,
                    "approved": u.approved,
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.name.clone(),
                u.email.clone(),
                u.role.to_string(),
                u.team_id.map(|t| t.to_string()).unwrap_or_default(),
                if u.approved { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "EMAIL", "ROLE", "TEAM", "APPROVED"], rows);
    Ok(())
}
