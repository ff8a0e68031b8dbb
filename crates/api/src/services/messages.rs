//! Message catalog administration.
//!
//! Every successful mutation reloads the in-process cache so the rendered
//! envelopes pick up the change on the next request.

use std::sync::Arc;

use flighthours_core::error::{CoreError, Entity};
use flighthours_core::messages::{MessageCatalog, MessageSource, MessageType};
use flighthours_core::scope::RequestScope;
use flighthours_core::tx::{self, TransactionManager};
use flighthours_core::types::{new_id, DbId};
use flighthours_db::models::message::{Message, MessageFields, MessageFilter, SaveMessage};
use flighthours_db::repositories::MessageRepository;

pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    source: Arc<dyn MessageSource>,
    catalog: Arc<MessageCatalog>,
    tx: Arc<dyn TransactionManager>,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        source: Arc<dyn MessageSource>,
        catalog: Arc<MessageCatalog>,
        tx: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            messages,
            source,
            catalog,
            tx,
        }
    }

    pub async fn list(
        &self,
        scope: &RequestScope,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, CoreError> {
        scope.db(self.messages.list(filter)).await
    }

    pub async fn get(&self, scope: &RequestScope, id: DbId) -> Result<Message, CoreError> {
        scope
            .db(self.messages.find_by_id(id))
            .await?
            .ok_or(CoreError::NotFound(Entity::Message))
    }

    pub async fn create(
        &self,
        scope: &RequestScope,
        input: SaveMessage,
    ) -> Result<Message, CoreError> {
        let fields = validate(input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = scope.db(self.messages.insert(tx.as_mut(), new_id(), &fields)).await;
        let message = tx::finish(tx, outcome).await?;

        tracing::info!(trace_id = %scope.trace_id, code = %message.code, "Message created");
        self.refresh(scope).await;
        Ok(message)
    }

    pub async fn update(
        &self,
        scope: &RequestScope,
        id: DbId,
        input: SaveMessage,
    ) -> Result<Message, CoreError> {
        let fields = validate(input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = match scope.db(self.messages.update(tx.as_mut(), id, &fields)).await {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(CoreError::NotFound(Entity::Message)),
            Err(err) => Err(err),
        };
        let message = tx::finish(tx, outcome).await?;

        self.refresh(scope).await;
        Ok(message)
    }

    pub async fn delete(&self, scope: &RequestScope, id: DbId) -> Result<(), CoreError> {
        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = match scope.db(self.messages.delete(tx.as_mut(), id)).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CoreError::NotFound(Entity::Message)),
            Err(err) => Err(err),
        };
        tx::finish(tx, outcome).await?;

        self.refresh(scope).await;
        Ok(())
    }

    /// Rebuild the cache from the store. Returns the number of messages now
    /// cached. On failure the previous content stays in place.
    pub async fn reload(&self, scope: &RequestScope) -> Result<usize, CoreError> {
        let count = scope.db(self.catalog.reload(&*self.source)).await?;
        tracing::info!(
            trace_id = %scope.trace_id,
            count,
            generation = self.catalog.generation(),
            "Message catalog reloaded"
        );
        Ok(count)
    }

    /// Reload after a write. The write already committed, so a failed
    /// reload is only logged.
    async fn refresh(&self, scope: &RequestScope) {
        if let Err(err) = self.reload(scope).await {
            tracing::warn!(
                trace_id = %scope.trace_id,
                error = %err,
                "Message catalog reload after write failed"
            );
        }
    }
}

fn validate(input: SaveMessage) -> Result<MessageFields, CoreError> {
    let code = input.code.trim().to_string();
    if code.is_empty() {
        return Err(CoreError::MessageCodeRequired);
    }
    let message_type: MessageType = input.message_type.parse()?;
    if input.content.trim().is_empty() {
        return Err(CoreError::InvalidRequest("content is required".into()));
    }

    Ok(MessageFields {
        code,
        message_type: message_type.as_str().to_string(),
        category: input.category,
        module: input.module,
        title: input.title,
        content: input.content,
        active: input.active.unwrap_or(true),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input(code: &str, message_type: &str) -> SaveMessage {
        SaveMessage {
            code: code.into(),
            message_type: message_type.into(),
            category: None,
            module: Some("logbook".into()),
            title: None,
            content: "Segment saved.".into(),
            active: None,
        }
    }

    #[test]
    fn type_is_normalized_to_its_stored_form() {
        let fields = validate(input(" SegmentSaved ", "success")).unwrap();
        assert_eq!(fields.code, "SegmentSaved");
        assert_eq!(fields.message_type, "SUCCESS");
        assert!(fields.active);
    }

    #[test]
    fn code_is_required() {
        assert_matches!(validate(input("  ", "ERROR")), Err(CoreError::MessageCodeRequired));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert_matches!(
            validate(input("Anything", "UNKNOWN")),
            Err(CoreError::InvalidMessageType(_))
        );
    }
}
