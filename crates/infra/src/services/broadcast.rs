use std::sync::Arc;

use tracing::{info, instrument};

use classroll_broadcast::{Message, NewMessage};
use classroll_core::Clock;

use super::ServiceError;
use crate::store::MessageStore;

/// Result of an active-message query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveMessages {
    /// Nothing is being broadcast right now.
    Empty,
    /// Active messages, newest start first.
    Messages(Vec<Message>),
}

impl From<Vec<Message>> for ActiveMessages {
    fn from(messages: Vec<Message>) -> Self {
        if messages.is_empty() {
            ActiveMessages::Empty
        } else {
            ActiveMessages::Messages(messages)
        }
    }
}

pub struct BroadcastService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for BroadcastService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> BroadcastService<S>
where
    S: MessageStore + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Persist a message that starts broadcasting now.
    #[instrument(skip(self, new_message), fields(teacher_id = %new_message.teacher_id), err)]
    pub async fn create_message(&self, new_message: NewMessage) -> Result<Message, ServiceError> {
        let message = new_message.start_at(self.clock.now());
        let message = self.store.insert_message(message).await?;
        info!(
            message_id = %message.id,
            duration_minutes = message.duration_minutes,
            "message created"
        );
        Ok(message)
    }

    #[instrument(skip(self), err)]
    pub async fn list_active_messages(&self) -> Result<ActiveMessages, ServiceError> {
        let now = self.clock.now();
        Ok(self.store.list_active_messages(now).await?.into())
    }
}
