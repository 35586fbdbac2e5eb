//! Chat Store

use std::sync::Arc;

use sharedcart::{
    chat::{ChatLog, MessageUuid, ReactionToggle},
    members::Member,
};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::Clock;

/// Owns the group chat log.
#[derive(Debug)]
pub struct ChatStore {
    log: watch::Sender<Arc<ChatLog>>,
    clock: Arc<dyn Clock>,
}

impl ChatStore {
    /// Wrap `log`, stamping new messages with times from `clock`.
    pub fn new(log: ChatLog, clock: Arc<dyn Clock>) -> Self {
        let (log, _rx) = watch::channel(Arc::new(log));

        Self { log, clock }
    }

    /// The current log.
    pub fn snapshot(&self) -> Arc<ChatLog> {
        Arc::clone(&self.log.borrow())
    }

    /// Receive every published log.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ChatLog>> {
        self.log.subscribe()
    }

    /// Post a message as `author`. Surrounding whitespace is trimmed; blank
    /// messages are dropped and `None` is returned.
    #[tracing::instrument(
        name = "chat.store.send_message",
        skip_all,
        fields(author = %author.uuid())
    )]
    pub fn send_message(&self, author: &Member, text: &str) -> Option<MessageUuid> {
        let text = text.trim();

        if text.is_empty() {
            debug!("ignored blank message");

            return None;
        }

        let sent_at = self.clock.now();
        let uuid = self.apply(|log| Some(log.push(author, text, sent_at)))?;

        info!(message = %uuid, "sent message");

        Some(uuid)
    }

    /// Toggle `member`'s `emoji` reaction on a message. Returns `None` if the
    /// message does not exist.
    #[tracing::instrument(
        name = "chat.store.toggle_reaction",
        skip(self, member),
        fields(member = %member.uuid())
    )]
    pub fn toggle_reaction(
        &self,
        message: MessageUuid,
        emoji: &str,
        member: &Member,
    ) -> Option<ReactionToggle> {
        self.apply(|log| log.toggle_reaction(message, emoji, member.uuid()))
    }

    /// Runs `operation` against a copy of the current log and publishes the
    /// copy when it returns `Some`. Reruns on a copy of any log another writer
    /// published in the meantime.
    fn apply<T>(&self, mut operation: impl FnMut(&mut ChatLog) -> Option<T>) -> Option<T> {
        loop {
            let base = self.snapshot();
            let mut next = ChatLog::clone(&base);
            let outcome = operation(&mut next)?;

            let published = self.log.send_if_modified(|current| {
                if !Arc::ptr_eq(current, &base) {
                    return false;
                }

                *current = Arc::new(next);

                true
            });

            if published {
                return Some(outcome);
            }

            debug!("chat log replaced by a concurrent writer, retrying");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use jiff::Timestamp;
    use testresult::TestResult;

    use super::*;
    use crate::clock::FixedClock;

    fn store() -> (ChatStore, Member, Member) {
        let jane = Member::new("Jane Smith", "jane@example.com", "");
        let mike = Member::new("Mike Johnson", "mike@example.com", "");

        let store = ChatStore::new(
            ChatLog::new(),
            Arc::new(FixedClock(Timestamp::UNIX_EPOCH)),
        );

        (store, jane, mike)
    }

    #[test]
    fn blank_messages_are_ignored() -> TestResult {
        let (store, jane, _) = store();
        let mut rx = store.subscribe();

        assert_eq!(store.send_message(&jane, "   \n"), None);
        assert!(store.snapshot().is_empty());
        assert!(!rx.has_changed()?);

        Ok(())
    }

    #[test]
    fn messages_are_trimmed_and_stamped() -> TestResult {
        let (store, jane, _) = store();

        let uuid = store
            .send_message(&jane, "  Great! Should we also get some cereal?  ")
            .ok_or("message not sent")?;

        let log = store.snapshot();
        let message = log.message(uuid).ok_or("message missing")?;

        assert_eq!(message.text(), "Great! Should we also get some cereal?");
        assert_eq!(message.sent_at(), Timestamp::UNIX_EPOCH);
        assert_eq!(message.author_uuid(), jane.uuid());

        Ok(())
    }

    #[test]
    fn reactions_toggle_through_the_store() -> TestResult {
        let (store, jane, mike) = store();

        let uuid = store.send_message(&jane, "milk?").ok_or("message not sent")?;
        let before = store.snapshot();

        assert_eq!(
            store.toggle_reaction(uuid, "👍", &mike),
            Some(ReactionToggle::Added)
        );
        assert_eq!(
            store.toggle_reaction(uuid, "👍", &mike),
            Some(ReactionToggle::Removed)
        );

        assert_eq!(*store.snapshot(), *before);
        assert_eq!(store.toggle_reaction(MessageUuid::new(), "👍", &mike), None);

        Ok(())
    }

    #[test]
    fn concurrent_messages_are_all_kept() {
        let (store, jane, mike) = store();

        thread::scope(|scope| {
            for author in [&jane, &mike, &jane, &mike] {
                let store = &store;

                scope.spawn(move || {
                    for _ in 0..100 {
                        store.send_message(author, "on my way");
                    }
                });
            }
        });

        let log = store.snapshot();

        assert_eq!(log.len(), 400);
        assert_eq!(
            log.messages()
                .iter()
                .filter(|message| message.author_uuid() == mike.uuid())
                .count(),
            200
        );
    }
}
