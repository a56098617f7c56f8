#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
    Error,
}

/// One conversation turn. `id` is set only on transient placeholder
/// messages so they can be removed when the pending answer settles;
/// every other message is appended once and never touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub id: Option<u64>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            id: None,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            id: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Error,
            id: None,
        }
    }

    pub fn placeholder(text: impl Into<String>, id: u64) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            id: Some(id),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_some()
    }
}

pub fn remove_by_id(messages: &mut Vec<Message>, id: u64) {
    messages.retain(|message| message.id != Some(id));
}
