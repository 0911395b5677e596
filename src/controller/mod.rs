pub mod notify;
pub mod page;
pub mod prompt;

pub use notify::{NoticeKind, Notification, Notifications};
pub use page::{AuthForm, EditModal, PageController, Screen};
pub use prompt::{AssumeYes, ChannelConfirm, Confirm, StdinConfirm};
