use chrono::Utc;
use uuid::Uuid;

pub use crate::types::Conversation;
use crate::types::{ChatMessage, ConversationItem, FunctionItem};

impl Conversation {
    pub fn new(title: Option<&str>, model: Option<&str>) -> Conversation {
        Conversation {
            id: Uuid::new_v4().to_string(),
            items: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            title: title.map(|s| s.to_string()),
            model: model.map(|s| s.to_string()),
        }
    }

    pub fn replace_items(&mut self, items: Vec<ConversationItem>) {
        self.items = items;
        self.updated_at = Utc::now();
    }

    pub fn add_item(&mut self, item: impl Into<ConversationItem>) {
        self.items.push(item.into());
        self.updated_at = Utc::now();
    }

    pub fn add_user(&mut self, content: &str) {
        self.add_item(ChatMessage::user(content));
    }

    pub fn add_assistant(&mut self, content: &str) {
        self.add_item(ChatMessage::assistant(content));
    }

    pub fn clear(&mut self) {
        self.replace_items(Vec::new());
    }

    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = title.map(|s| s.to_string());
        self.updated_at = Utc::now();
    }

    pub fn set_model(&mut self, model: Option<&str>) {
        self.model = model.map(|s| s.to_string());
        self.updated_at = Utc::now();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_assistant_text(&self) -> Option<&str> {
        self.items
            .iter()
            .rev()
            .filter_map(ConversationItem::as_message)
            .find(|m| m.is_assistant())
            .and_then(|m| m.content.as_deref())
    }

    /// Keeps roughly the last `keep_last` items. The cut moves back one item
    /// when it would separate a function call from its result. Returns how
    /// many items were dropped.
    pub fn compact(&mut self, keep_last: usize) -> usize {
        if self.items.len() <= keep_last {
            return 0;
        }
        let mut cut = self.items.len() - keep_last;
        if matches!(
            self.items.get(cut),
            Some(ConversationItem::Function(FunctionItem::FunctionCallResult { .. }))
        ) {
            cut -= 1;
        }
        self.items.drain(..cut);
        self.updated_at = Utc::now();
        cut
    }
}
