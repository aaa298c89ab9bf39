//! Topic handlers for verified messages.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::error::{NotifyError, NotifyResult};
use crate::types::{AccountDeletionData, Message, TOPIC_MARKETPLACE_ACCOUNT_DELETION};

/// Handles verified messages of one topic.
pub trait MessageHandler: Send + Sync {
    fn process(&self, message: &Message) -> NotifyResult<()>;
}

/// Handler for `MARKETPLACE_ACCOUNT_DELETION` notifications.
///
/// Only records the request; data removal is left to the embedding
/// application, which can register its own handler for the topic.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccountDeletionHandler;

impl MessageHandler for AccountDeletionHandler {
    fn process(&self, message: &Message) -> NotifyResult<()> {
        let data: AccountDeletionData = serde_json::from_value(message.notification.data.clone())
            .map_err(|e| NotifyError::Handler {
                topic: message.topic().to_string(),
                message: format!("invalid account deletion payload: {}", e),
            })?;

        info!(
            notification_id = %message.notification.notification_id,
            user_id = %data.user_id,
            username = %data.username,
            "account deletion requested"
        );

        Ok(())
    }
}

/// Topic to handler mapping.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    /// Registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the built-in handlers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(TOPIC_MARKETPLACE_ACCOUNT_DELETION, AccountDeletionHandler);
        registry
    }

    /// Register `handler` for `topic`, replacing any previous handler.
    pub fn register(&mut self, topic: impl Into<String>, handler: impl MessageHandler + 'static) {
        self.handlers.insert(topic.into(), Arc::new(handler));
    }

    pub fn with_handler(
        mut self,
        topic: impl Into<String>,
        handler: impl MessageHandler + 'static,
    ) -> Self {
        self.register(topic, handler);
        self
    }

    /// Handler for `topic`. Topics are matched exactly.
    pub fn get(&self, topic: &str) -> NotifyResult<Arc<dyn MessageHandler>> {
        self.handlers
            .get(topic)
            .cloned()
            .ok_or_else(|| NotifyError::UnsupportedTopic {
                topic: topic.to_string(),
            })
    }

    /// Dispatch `message` to the handler of its topic.
    pub fn dispatch(&self, message: &Message) -> NotifyResult<()> {
        self.get(message.topic())?.process(message)
    }

    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        topics.sort_unstable();
        topics
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("topics", &self.topics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metadata, Notification};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message(topic: &str, data: serde_json::Value) -> Message {
        Message {
            metadata: Metadata {
                topic: topic.to_string(),
                schema_version: "1.0".to_string(),
                deprecated: false,
            },
            notification: Notification {
                notification_id: "n-1".to_string(),
                data,
                ..Notification::default()
            },
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl MessageHandler for Counting {
        fn process(&self, _message: &Message) -> NotifyResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_account_deletion_handler_accepts_payload() {
        let msg = message(
            TOPIC_MARKETPLACE_ACCOUNT_DELETION,
            serde_json::json!({"username": "test_user", "userId": "ma8vp1jySJC", "eiasToken": "t"}),
        );
        AccountDeletionHandler.process(&msg).unwrap();
    }

    #[test]
    fn test_account_deletion_handler_rejects_bad_payload() {
        let msg = message(
            TOPIC_MARKETPLACE_ACCOUNT_DELETION,
            serde_json::json!({"username": 42}),
        );
        let result = AccountDeletionHandler.process(&msg);
        assert!(matches!(result, Err(NotifyError::Handler { topic, .. }) if topic == TOPIC_MARKETPLACE_ACCOUNT_DELETION));
    }

    #[test]
    fn test_default_registry_has_account_deletion() {
        let registry = HandlerRegistry::default();
        assert_eq!(registry.topics(), vec![TOPIC_MARKETPLACE_ACCOUNT_DELETION]);
        assert!(registry.get(TOPIC_MARKETPLACE_ACCOUNT_DELETION).is_ok());
    }

    #[test]
    fn test_unknown_topic_is_unsupported() {
        let registry = HandlerRegistry::new();
        let result = registry.dispatch(&message("ITEM_SOLD", serde_json::Value::Null));
        assert!(matches!(result, Err(NotifyError::UnsupportedTopic { topic }) if topic == "ITEM_SOLD"));

        // Exact match only.
        assert!(registry.get("marketplace_account_deletion").is_err());
    }

    #[test]
    fn test_register_replaces_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = HandlerRegistry::new()
            .with_handler(TOPIC_MARKETPLACE_ACCOUNT_DELETION, Counting(calls.clone()));

        registry
            .dispatch(&message(
                TOPIC_MARKETPLACE_ACCOUNT_DELETION,
                serde_json::Value::Null,
            ))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_registry() {
        let registry = HandlerRegistry::empty();
        assert!(registry.topics().is_empty());
        assert!(registry.get(TOPIC_MARKETPLACE_ACCOUNT_DELETION).is_err());
    }
}
