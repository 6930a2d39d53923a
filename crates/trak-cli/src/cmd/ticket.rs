use crate::actor;
use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::Path;
use trak_core::access;
use trak_core::notify::Notification;
use trak_core::project::Project;
use trak_core::ticket::{NewTicket, Ticket};
use trak_core::types::{Priority, TicketKind, TicketStatus};
use trak_core::user::User;

#[derive(Subcommand)]
pub enum TicketSubcommand {
    /// File a new ticket (lands on To Do)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "task")]
        kind: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Assignee user id (must be in your assignable pool)
        #[arg(long)]
        assignee: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        project: Option<u32>,
        #[arg(long)]
        parent: Option<u32>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
    /// Move a ticket to another column
    Status { ticket_id: u32, status: String },
    /// Hand a ticket to another user
    Reassign { ticket_id: u32, user_id: u32 },
    /// Show one ticket
    Show { ticket_id: u32 },
    /// List a ticket's children
    Children { ticket_id: u32 },
}

pub fn run(
    root: &Path,
    subcmd: TicketSubcommand,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    match subcmd {
        TicketSubcommand::Create {
            title,
            kind,
            priority,
            assignee,
            description,
            public,
            project,
            parent,
            start,
            end,
        } => create(
            root,
            CreateArgs {
                title,
                kind,
                priority,
                assignee,
                description,
                public,
                project,
                parent,
                start,
                end,
            },
            json,
            acting,
        ),
        TicketSubcommand::Status { ticket_id, status } => {
            set_status(root, ticket_id, &status, json, acting)
        }
        TicketSubcommand::Reassign { ticket_id, user_id } => {
            reassign(root, ticket_id, user_id, json, acting)
        }
        TicketSubcommand::Show { ticket_id } => show(root, ticket_id, json, acting),
        TicketSubcommand::Children { ticket_id } => children(root, ticket_id, json, acting),
    }
}

struct CreateArgs {
    title: String,
    kind: String,
    priority: String,
    assignee: u32,
    description: Option<String>,
    public: bool,
    project: Option<u32>,
    parent: Option<u32>,
    start: Option<String>,
    end: Option<String>,
}

fn parse_date(value: Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
        })
        .transpose()
}

fn create(root: &Path, args: CreateArgs, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    if !access::can_create_ticket(&actor) {
        bail!("permission denied: your role cannot create tickets (developers need a team)");
    }
    let kind: TicketKind = args.kind.parse()?;
    let priority: Priority = args.priority.parse()?;

    let users = User::list(root)?;
    let assignee = access::assignable_users(&users, &actor)
        .into_iter()
        .find(|u| u.id == args.assignee)
        .with_context(|| format!("user {} is not in your assignable pool", args.assignee))?;

    let ticket = Ticket::create(
        root,
        NewTicket {
            title: args.title,
            description: args.description,
            kind,
            priority,
            assignee: assignee.name.clone(),
            public: args.public,
            project_id: args.project,
            parent_id: args.parent,
            start_date: parse_date(args.start)?,
            end_date: parse_date(args.end)?,
        },
    )?;

    if json {
        print_json(&ticket)?;
    } else {
        println!("Created ticket [{}]: {}", ticket.id, ticket.title);
    }
    Ok(())
}

/// Load a ticket together with its owning project snapshot.
fn load_with_project(root: &Path, ticket_id: u32) -> anyhow::Result<(Ticket, Option<Project>)> {
    let ticket = Ticket::load(root, ticket_id)?;
    let project = match ticket.project_id {
        Some(id) => Project::load(root, id).ok(),
        None => None,
    };
    Ok((ticket, project))
}

fn set_status(
    root: &Path,
    ticket_id: u32,
    status: &str,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let new_status: TicketStatus = status.parse()?;
    let (mut ticket, project) = load_with_project(root, ticket_id)?;
    if !access::can_edit(&ticket, project.as_ref(), &actor) {
        bail!("permission denied: you cannot edit ticket {ticket_id}");
    }

    let old_status = ticket.status;
    ticket.set_status(new_status);
    ticket.save(root)?;

    if let Some(assignee) = User::list(root)?.into_iter().find(|u| u.name == ticket.assignee) {
        Notification::create(
            root,
            assignee.id,
            format!(
                "Ticket \"{}\" status changed from {} to {}",
                ticket.title, old_status, new_status
            ),
            Some("/board".to_string()),
        )?;
    }

    if json {
        print_json(&serde_json::json!({ "id": ticket.id, "status": ticket.status }))?;
    } else {
        println!("Ticket [{}] moved to {}", ticket.id, new_status);
    }
    Ok(())
}

fn reassign(
    root: &Path,
    ticket_id: u32,
    user_id: u32,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let (mut ticket, project) = load_with_project(root, ticket_id)?;
    if !access::can_reassign(&ticket, project.as_ref(), &actor) {
        bail!("permission denied: you cannot reassign ticket {ticket_id}");
    }

    let new_assignee = User::load(root, user_id)?;
    ticket.reassign(new_assignee.name.clone());
    ticket.save(root)?;

    Notification::create(
        root,
        new_assignee.id,
        format!("You have been assigned ticket: {}", ticket.title),
        Some("/board".to_string()),
    )?;

    if json {
        print_json(&serde_json::json!({ "id": ticket.id, "assignee": ticket.assignee }))?;
    } else {
        println!("Ticket [{}] reassigned to {}", ticket.id, new_assignee.name);
    }
    Ok(())
}

fn show(root: &Path, ticket_id: u32, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let (ticket, project) = load_with_project(root, ticket_id)?;
    if !access::can_view(&ticket, project.as_ref(), &actor) {
        bail!("permission denied: you cannot view ticket {ticket_id}");
    }

    if json {
        print_json(&ticket)?;
        return Ok(());
    }

    println!("Ticket [{}]: {}", ticket.id, ticket.title);
    println!("Status:   {}", ticket.status);
    println!("Kind:     {}", ticket.kind);
    println!("Priority: {}", ticket.priority);
    println!("Assignee: {}", ticket.assignee);
    println!("Public:   {}", if ticket.public { "yes" } else { "no" });
    if let Some(p) = &project {
        println!("Project:  {} [{}]", p.name, p.id);
    }
    if let Some(desc) = &ticket.description {
        println!("\n{desc}");
    }
    Ok(())
}

fn children(root: &Path, ticket_id: u32, json: bool, acting: Option<&str>) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    let (parent, project) = load_with_project(root, ticket_id)?;
    if !access::can_view(&parent, project.as_ref(), &actor) {
        bail!("permission denied: you cannot view ticket {ticket_id}");
    }

    let projects = Project::list(root)?;
    let index = access::ProjectIndex::new(&projects);
    let tickets = Ticket::list(root)?;
    let children: Vec<&Ticket> = trak_core::ticket::children(&tickets, ticket_id)
        .into_iter()
        .filter(|c| access::can_view(c, index.project_of(c), &actor))
        .collect();

    if json {
        print_json(&children)?;
        return Ok(());
    }

    if children.is_empty() {
        println!("No children for ticket [{ticket_id}].");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = children
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.kind.to_string(),
                t.status.to_string(),
                t.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "KIND", "STATUS", "TITLE"], rows);
    Ok(())
}
