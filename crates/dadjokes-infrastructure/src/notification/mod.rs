mod log_sender;
mod scheduler;

pub use log_sender::LogNotificationSender;
pub use scheduler::TokioNotificationScheduler;
