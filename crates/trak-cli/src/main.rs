mod actor;
mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    notifications::NotificationSubcommand, project::ProjectSubcommand, team::TeamSubcommand,
    ticket::TicketSubcommand, user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "trak",
    about = "Team issue tracker — users, teams, projects, and a ticket board with role-based access",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .trak/ or .git/)
    #[arg(long, global = true, env = "TRAK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Acting user's email for permission-gated commands
    #[arg(long = "as", global = true, value_name = "EMAIL", env = "TRAK_AS")]
    acting: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a workspace and seed the admin account
    Init {
        /// Workspace name (default: directory name)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "Admin")]
        admin_name: String,
        #[arg(long, default_value = "admin@example.com")]
        admin_email: String,
        #[arg(long, default_value = "adminpassword")]
        admin_password: String,
    },

    /// Manage accounts and approvals
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Manage teams
    Team {
        #[command(subcommand)]
        subcommand: TeamSubcommand,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Manage tickets
    Ticket {
        #[command(subcommand)]
        subcommand: TicketSubcommand,
    },

    /// Show the ticket board
    Board {
        /// Restrict to one project
        #[arg(long)]
        project: Option<u32>,
    },

    /// Search tickets, projects, users, and teams
    Search { query: String },

    /// Ticket counts over your visible tickets
    Summary,

    /// Your notifications
    Notifications {
        #[command(subcommand)]
        subcommand: NotificationSubcommand,
    },

    /// Run the JSON API server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3500")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);
    let acting = cli.acting.as_deref();

    let result = match cli.command {
        Commands::Init {
            name,
            admin_name,
            admin_email,
            admin_password,
        } => cmd::init::run(
            &root,
            name.as_deref(),
            &admin_name,
            &admin_email,
            &admin_password,
            cli.json,
        ),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json, acting),
        Commands::Team { subcommand } => cmd::team::run(&root, subcommand, cli.json, acting),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json, acting),
        Commands::Ticket { subcommand } => cmd::ticket::run(&root, subcommand, cli.json, acting),
        Commands::Board { project } => cmd::board::run(&root, project, cli.json, acting),
        Commands::Search { query } => cmd::search::run(&root, &query, cli.json, acting),
        Commands::Summary => cmd::summary::run(&root, cli.json, acting),
        Commands::Notifications { subcommand } => {
            cmd::notifications::run(&root, subcommand, cli.json, acting)
        }
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
