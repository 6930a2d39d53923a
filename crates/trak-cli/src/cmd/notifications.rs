use crate::actor;
use crate::output::{print_json, print_table};
use anyhow::bail;
use clap::Subcommand;
use std::path::Path;
use trak_core::notify::Notification;

#[derive(Subcommand)]
pub enum NotificationSubcommand {
    /// List your notifications, newest first
    List,
    /// Mark one notification as read
    Read { notification_id: u32 },
    /// Mark everything as read
    ReadAll,
}

pub fn run(
    root: &Path,
    subcmd: NotificationSubcommand,
    json: bool,
    acting: Option<&str>,
) -> anyhow::Result<()> {
    let actor = actor::resolve(root, acting)?;
    match subcmd {
        NotificationSubcommand::List => {
            let notifications = Notification::list_for_user(root, actor.id)?;
            if json {
                print_json(&notifications)?;
                return Ok(());
            }
            if notifications.is_empty() {
                println!("No notifications.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = notifications
                .iter()
                .map(|n| {
                    vec![
                        n.id.to_string(),
                        if n.read { "" } else { "*" }.to_string(),
                        n.message.clone(),
                    ]
                })
                .collect();
            print_table(&["ID", "NEW", "MESSAGE"], rows);
            Ok(())
        }
        NotificationSubcommand::Read { notification_id } => {
            let mut notification = Notification::load(root, notification_id)?;
            if notification.user_id != actor.id {
                bail!("permission denied: that notification belongs to someone else");
            }
            notification.mark_read(root)?;
            if json {
                print_json(&serde_json::json!({ "id": notification_id, "read": true }))?;
            } else {
                println!("Marked notification [{notification_id}] read");
            }
            Ok(())
        }
        NotificationSubcommand::ReadAll => {
            let changed = Notification::mark_all_read(root, actor.id)?;
            if json {
                print_json(&serde_json::json!({ "marked": changed }))?;
            } else {
                println!("Marked {changed} notifications read");
            }
            Ok(())
        }
    }
}
