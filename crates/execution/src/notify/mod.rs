//! Operation notifications and their sinks.

mod events;
mod notifiers;

pub use events::{Notification, Operation, Outcome};
pub use notifiers::{ChannelNotifier, MultiNotifier, Notifier, RecordingNotifier, TracingNotifier};
