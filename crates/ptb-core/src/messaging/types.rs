/// Quick-reply keyboard attached to an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyKeyboard {
    /// Leave whatever the client shows untouched.
    Keep,
    /// One row of buttons whose labels are sent back as text when pressed.
    Buttons(Vec<String>),
    /// Hide whatever keyboard the client is showing.
    Remove,
}

impl ReplyKeyboard {
    /// Trigger buttons: speak for everyone, remember for the admin.
    pub fn triggers(speak_phrase: &str, remember_phrase: &str, is_admin: bool) -> Self {
        let mut buttons = vec![speak_phrase.to_string()];
        if is_admin {
            buttons.push(remember_phrase.to_string());
        }
        Self::Buttons(buttons)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: ReplyKeyboard,
}

impl Reply {
    pub fn new(text: impl Into<String>, keyboard: ReplyKeyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }
}
