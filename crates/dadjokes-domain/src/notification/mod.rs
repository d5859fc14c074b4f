mod scheduler;
mod sender;

pub use scheduler::{NotificationKind, NotificationScheduler, ScheduledNotification};
pub use sender::{NotificationMessage, NotificationSender};
