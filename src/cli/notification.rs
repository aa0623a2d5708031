use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::ui::status;
use super::{find_by_record_id, print_list, ListArgs};
use crate::config::HrConfig;
use crate::models::Notification;
use crate::remote::{RemoteClient, RemoteCollection, NOTIFICATIONS};
use crate::source::RecordSource;

/// Notifications live only on the API; there is no local fallback.
#[derive(Subcommand)]
pub enum NotificationCommand {
    /// List notifications
    List(NotificationListArgs),
    /// Broadcast a notification
    Send {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
    },
    /// Mark a notification as read
    Read { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct NotificationListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    #[arg(long)]
    pub unread: bool,
}

pub fn run(command: NotificationCommand, config: &HrConfig) -> Result<()> {
    let client = RemoteClient::from_config(config)?;
    let notifications = RemoteCollection::<Notification>::new(&client, NOTIFICATIONS);
    match command {
        NotificationCommand::List(args) => {
            let items = notifications.list()?;
            let mut list = args.list.controller::<Notification>(config)?;
            if args.unread {
                list.set_filter("unread", |n: &Notification| !n.read);
            }
            print_list(&mut list, &args.list, &items, &["id", "", "title", "message", "sent"], |n| {
                vec![
                    n.id.to_string(),
                    if n.read { String::new() } else { "*".to_string() },
                    n.title.clone(),
                    n.message.clone(),
                    n.created_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
                ]
            });
            Ok(())
        }
        NotificationCommand::Send { title, message } => {
            let sent = send(&notifications, &title, &message)?;
            status(&format!("Sent ({})", sent.id));
            Ok(())
        }
        NotificationCommand::Read { id } => {
            let mut n = find_by_record_id(notifications.list()?, &id, "notification")?;
            if n.read {
                status("Already read.");
                return Ok(());
            }
            n.read = true;
            notifications.update(n)?;
            status("Marked as read.");
            Ok(())
        }
    }
}

pub fn send(source: &dyn RecordSource<Notification>, title: &str, message: &str) -> Result<Notification> {
    if title.trim().is_empty() {
        return Err(anyhow!("A notification needs a title"));
    }
    source.create(Notification::new(title.trim(), message.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use crate::remote::test_server::serve_once;

    #[test]
    fn test_send() {
        let (url, server) = serve_once("201 Created", r#"{"id":"n-7","title":"Office closed","message":"Friday"}"#);
        let client = RemoteClient::new(&url, None).unwrap();
        let notifications = RemoteCollection::<Notification>::new(&client, NOTIFICATIONS);

        let sent = send(&notifications, " Office closed ", "Friday").unwrap();
        assert_eq!(sent.id, RecordId::Text("n-7".to_string()));
        assert!(!sent.read);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /notifications "));
        assert!(request.contains(r#""title":"Office closed""#));
    }

    #[test]
    fn test_send_requires_title() {
        let client = RemoteClient::new("http://127.0.0.1:9", None).unwrap();
        let notifications = RemoteCollection::<Notification>::new(&client, NOTIFICATIONS);
        assert!(send(&notifications, "  ", "body").is_err());
    }

    #[test]
    fn test_remote_only() {
        let err = run(
            NotificationCommand::Send {
                title: "x".to_string(),
                message: String::new(),
            },
            &HrConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no API URL configured"));
    }
}
