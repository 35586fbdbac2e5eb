//! Group chat log with emoji reactions

use jiff::Timestamp;
use smallvec::SmallVec;

use crate::{
    members::{Member, MemberUuid},
    uuids::TypedUuid,
};

/// Message UUID
pub type MessageUuid = TypedUuid<ChatMessage>;

/// An emoji and the members who reacted with it. Never empty.
///
/// Reactions behave as sets: they are kept sorted by emoji, and members by
/// id, so toggling the same reaction twice leaves a message exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    emoji: String,
    members: SmallVec<[MemberUuid; 4]>,
}

impl Reaction {
    /// The emoji
    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// Members who applied it, ordered by id
    pub fn members(&self) -> &[MemberUuid] {
        &self.members
    }

    /// Number of members who applied it
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// What [`ChatLog::toggle_reaction`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionToggle {
    /// The member's reaction was recorded.
    Added,

    /// The member's existing reaction was withdrawn.
    Removed,
}

/// A chat message. Messages are never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    uuid: MessageUuid,
    author: Member,
    text: String,
    sent_at: Timestamp,
    reactions: Vec<Reaction>,
}

impl ChatMessage {
    /// Message id
    pub fn uuid(&self) -> MessageUuid {
        self.uuid
    }

    /// Author id
    pub fn author_uuid(&self) -> MemberUuid {
        self.author.uuid()
    }

    /// The author as they were when the message was sent
    pub fn author(&self) -> &Member {
        &self.author
    }

    /// Message body
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Send time
    pub fn sent_at(&self) -> Timestamp {
        self.sent_at
    }

    /// Reactions, ordered by emoji
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// How many members reacted with `emoji`.
    pub fn reaction_count(&self, emoji: &str) -> usize {
        self.reactions
            .iter()
            .find(|reaction| reaction.emoji == emoji)
            .map_or(0, Reaction::count)
    }

    fn toggle(&mut self, emoji: &str, member: MemberUuid) -> ReactionToggle {
        let position = match self
            .reactions
            .binary_search_by(|reaction| reaction.emoji.as_str().cmp(emoji))
        {
            Ok(position) => position,
            Err(insert_at) => {
                self.reactions.insert(
                    insert_at,
                    Reaction {
                        emoji: emoji.to_string(),
                        members: SmallVec::from_elem(member, 1),
                    },
                );

                return ReactionToggle::Added;
            }
        };

        let Some(reaction) = self.reactions.get_mut(position) else {
            return ReactionToggle::Added;
        };

        match reaction.members.binary_search(&member) {
            Ok(index) => {
                reaction.members.remove(index);

                if reaction.members.is_empty() {
                    self.reactions.remove(position);
                }

                ReactionToggle::Removed
            }
            Err(insert_at) => {
                reaction.members.insert(insert_at, member);

                ReactionToggle::Added
            }
        }
    }
}

/// Append-only message log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id.
    ///
    /// The text is stored as given; rejecting blank messages is up to the caller.
    pub fn push(
        &mut self,
        author: &Member,
        text: impl Into<String>,
        sent_at: Timestamp,
    ) -> MessageUuid {
        let uuid = MessageUuid::new();

        self.messages.push(ChatMessage {
            uuid,
            author: author.clone(),
            text: text.into(),
            sent_at,
            reactions: Vec::new(),
        });

        uuid
    }

    /// Toggle `member`'s `emoji` reaction on a message.
    ///
    /// Returns `None` if there is no such message.
    pub fn toggle_reaction(
        &mut self,
        message: MessageUuid,
        emoji: &str,
        member: MemberUuid,
    ) -> Option<ReactionToggle> {
        self.messages
            .iter_mut()
            .find(|candidate| candidate.uuid == message)
            .map(|message| message.toggle(emoji, member))
    }

    /// Messages in send order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Look up a message.
    pub fn message(&self, uuid: MessageUuid) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| message.uuid == uuid)
    }

    /// Get the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
