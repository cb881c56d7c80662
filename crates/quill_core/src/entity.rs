//! Annotated entities: the closed set of records a prover emits.
//!
//! Every variant has a fixed, ordered list of named fields and a short wire
//! alias used as its discriminant in serialized form. The field order is part
//! of the cache format; changing it requires bumping the cache version.

use serde::Serialize;

use crate::value::Value;

/// Discriminant of an [`Entity`], with its wire alias and field layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Whitespace or comments between sentences.
    Text,
    /// A hypothesis in a goal's context.
    Hypothesis,
    /// A proof goal.
    Goal,
    /// A message printed by the prover.
    Message,
    /// One sentence of code with its messages and goals.
    Sentence,
    /// A group of goals.
    Goals,
    /// A group of messages.
    Messages,
    /// A sentence decorated with rendering annotations.
    RichSentence,
}

impl EntityKind {
    /// All variants, in registry order.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Text,
        EntityKind::Hypothesis,
        EntityKind::Goal,
        EntityKind::Message,
        EntityKind::Sentence,
        EntityKind::Goals,
        EntityKind::Messages,
        EntityKind::RichSentence,
    ];

    /// The short tag identifying this variant on the wire.
    pub fn alias(self) -> &'static str {
        match self {
            EntityKind::Text => "text",
            EntityKind::Hypothesis => "hypothesis",
            EntityKind::Goal => "goal",
            EntityKind::Message => "message",
            EntityKind::Sentence => "sentence",
            EntityKind::Goals => "goals",
            EntityKind::Messages => "messages",
            EntityKind::RichSentence => "rich_sentence",
        }
    }

    /// Looks up a variant by its wire alias.
    pub fn from_alias(alias: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.alias() == alias)
    }

    /// The structural (type) name of this variant.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Text => "Text",
            EntityKind::Hypothesis => "Hypothesis",
            EntityKind::Goal => "Goal",
            EntityKind::Message => "Message",
            EntityKind::Sentence => "Sentence",
            EntityKind::Goals => "Goals",
            EntityKind::Messages => "Messages",
            EntityKind::RichSentence => "RichSentence",
        }
    }

    /// Field names in declared order.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            EntityKind::Text => &["contents"],
            EntityKind::Hypothesis => &["names", "body", "type"],
            EntityKind::Goal => &["name", "conclusion", "hypotheses"],
            EntityKind::Message => &["contents"],
            EntityKind::Sentence => &["contents", "messages", "goals"],
            EntityKind::Goals => &["goals"],
            EntityKind::Messages => &["messages"],
            EntityKind::RichSentence => &["contents", "outputs", "annots", "prefixes", "suffixes"],
        }
    }
}

/// Whitespace or comments between sentences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    /// The raw text.
    pub contents: Value,
}

/// A hypothesis: one or more names bound to an optional body and a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hypothesis {
    /// Names bound by this hypothesis.
    pub names: Value,
    /// Definition body, absent for plain assumptions.
    pub body: Value,
    /// The hypothesis type (`type` on the wire).
    pub ty: Value,
}

/// A proof goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    /// Optional goal name.
    pub name: Value,
    /// The goal's conclusion.
    pub conclusion: Value,
    /// Hypotheses in scope.
    pub hypotheses: Value,
}

/// A message printed by the prover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Message text.
    pub contents: Value,
}

/// A sentence of code with the prover's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    /// Source text of the sentence.
    pub contents: Value,
    /// Messages emitted while processing the sentence.
    pub messages: Value,
    /// Goals remaining after the sentence.
    pub goals: Value,
}

/// A group of goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goals {
    /// The grouped goals.
    pub goals: Value,
}

/// A group of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Messages {
    /// The grouped messages.
    pub messages: Value,
}

/// A sentence decorated with annotations for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichSentence {
    /// Source text of the sentence.
    pub contents: Value,
    /// Output groups (goals and messages).
    pub outputs: Value,
    /// Rendering annotations.
    pub annots: Value,
    /// Text preceding the sentence.
    pub prefixes: Value,
    /// Text following the sentence.
    pub suffixes: Value,
}

impl Text {
    /// Creates a text fragment.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: Value::Str(contents.into()),
        }
    }
}

impl Hypothesis {
    /// Creates a hypothesis binding `names` to type `ty`, with an optional body.
    pub fn new(names: &[&str], body: Option<&str>, ty: &str) -> Self {
        Self {
            names: Value::list(names.iter().map(|n| Value::from(*n))),
            body: Value::from(body),
            ty: Value::from(ty),
        }
    }
}

impl Goal {
    /// Creates a goal.
    pub fn new(name: Option<&str>, conclusion: &str, hypotheses: Vec<Hypothesis>) -> Self {
        Self {
            name: Value::from(name),
            conclusion: Value::from(conclusion),
            hypotheses: Value::list(hypotheses.into_iter().map(Value::from)),
        }
    }
}

impl Message {
    /// Creates a message.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: Value::Str(contents.into()),
        }
    }
}

impl Sentence {
    /// Creates a sentence with its messages and goals.
    pub fn new(contents: &str, messages: Vec<Message>, goals: Vec<Goal>) -> Self {
        Self {
            contents: Value::from(contents),
            messages: Value::list(messages.into_iter().map(Value::from)),
            goals: Value::list(goals.into_iter().map(Value::from)),
        }
    }
}

/// An annotated entity: one record of prover output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Entity {
    /// See [`Text`].
    Text(Text),
    /// See [`Hypothesis`].
    Hypothesis(Hypothesis),
    /// See [`Goal`].
    Goal(Goal),
    /// See [`Message`].
    Message(Message),
    /// See [`Sentence`].
    Sentence(Sentence),
    /// See [`Goals`].
    Goals(Goals),
    /// See [`Messages`].
    Messages(Messages),
    /// See [`RichSentence`].
    RichSentence(RichSentence),
}

impl Entity {
    /// Returns the variant discriminant.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Text(_) => EntityKind::Text,
            Entity::Hypothesis(_) => EntityKind::Hypothesis,
            Entity::Goal(_) => EntityKind::Goal,
            Entity::Message(_) => EntityKind::Message,
            Entity::Sentence(_) => EntityKind::Sentence,
            Entity::Goals(_) => EntityKind::Goals,
            Entity::Messages(_) => EntityKind::Messages,
            Entity::RichSentence(_) => EntityKind::RichSentence,
        }
    }

    /// Returns field values in declared order (parallel to
    /// [`EntityKind::field_names`]).
    pub fn fields(&self) -> Vec<&Value> {
        match self {
            Entity::Text(t) => vec![&t.contents],
            Entity::Hypothesis(h) => vec![&h.names, &h.body, &h.ty],
            Entity::Goal(g) => vec![&g.name, &g.conclusion, &g.hypotheses],
            Entity::Message(m) => vec![&m.contents],
            Entity::Sentence(s) => vec![&s.contents, &s.messages, &s.goals],
            Entity::Goals(g) => vec![&g.goals],
            Entity::Messages(m) => vec![&m.messages],
            Entity::RichSentence(r) => {
                vec![&r.contents, &r.outputs, &r.annots, &r.prefixes, &r.suffixes]
            }
        }
    }

    /// Rebuilds an entity of `kind` from positional field values.
    ///
    /// Returns `None` if the number of values does not match the variant's
    /// field count.
    pub fn from_fields(kind: EntityKind, fields: Vec<Value>) -> Option<Self> {
        if fields.len() != kind.field_names().len() {
            return None;
        }
        let mut it = fields.into_iter();
        let mut next = || it.next().unwrap_or(Value::Null);
        let entity = match kind {
            EntityKind::Text => Entity::Text(Text { contents: next() }),
            EntityKind::Hypothesis => Entity::Hypothesis(Hypothesis {
                names: next(),
                body: next(),
                ty: next(),
            }),
            EntityKind::Goal => Entity::Goal(Goal {
                name: next(),
                conclusion: next(),
                hypotheses: next(),
            }),
            EntityKind::Message => Entity::Message(Message { contents: next() }),
            EntityKind::Sentence => Entity::Sentence(Sentence {
                contents: next(),
                messages: next(),
                goals: next(),
            }),
            EntityKind::Goals => Entity::Goals(Goals { goals: next() }),
            EntityKind::Messages => Entity::Messages(Messages { messages: next() }),
            EntityKind::RichSentence => Entity::RichSentence(RichSentence {
                contents: next(),
                outputs: next(),
                annots: next(),
                prefixes: next(),
                suffixes: next(),
            }),
        };
        Some(entity)
    }

    /// Returns a structurally equal entity sharing no storage with `self`.
    pub fn deep_copy(&self) -> Entity {
        let fields = self.fields().into_iter().map(Value::deep_copy).collect();
        // Arity always matches: the fields come from an entity of the same kind.
        Entity::from_fields(self.kind(), fields).unwrap_or_else(|| self.clone())
    }
}

macro_rules! entity_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Entity {
                fn from(v: $variant) -> Self {
                    Entity::$variant(v)
                }
            }

            impl From<$variant> for Value {
                fn from(v: $variant) -> Self {
                    Value::from(Entity::$variant(v))
                }
            }
        )*
    };
}

entity_from!(Text, Hypothesis, Goal, Message, Sentence, Goals, Messages, RichSentence);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_registry_is_bijective() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_alias(kind.alias()), Some(kind));
        }
        let mut aliases: Vec<_> = EntityKind::ALL.iter().map(|k| k.alias()).collect();
        aliases.sort_unstable();
        aliases.dedup();
        assert_eq!(aliases.len(), EntityKind::ALL.len());
    }

    #[test]
    fn alias_differs_from_structural_name() {
        assert_eq!(EntityKind::RichSentence.alias(), "rich_sentence");
        assert_eq!(EntityKind::RichSentence.name(), "RichSentence");
        assert_eq!(EntityKind::from_alias("RichSentence"), None);
    }

    #[test]
    fn fields_follow_declared_order() {
        let h = Entity::from(Hypothesis::new(&["H"], None, "True"));
        let fields = h.fields();
        assert_eq!(fields.len(), EntityKind::Hypothesis.field_names().len());
        assert!(fields[1].is_null());
        assert_eq!(fields[2].as_str(), Some("True"));
    }

    #[test]
    fn from_fields_rebuilds_entity() {
        let goal = Entity::from(Goal::new(Some("g"), "True", vec![]));
        let fields = goal.fields().into_iter().cloned().collect();
        assert_eq!(Entity::from_fields(EntityKind::Goal, fields), Some(goal));
    }

    #[test]
    fn from_fields_rejects_wrong_arity() {
        assert!(Entity::from_fields(EntityKind::Text, vec![]).is_none());
        assert!(Entity::from_fields(EntityKind::Text, vec![Value::Null, Value::Null]).is_none());
    }

    #[test]
    fn every_kind_has_fields() {
        for kind in EntityKind::ALL {
            assert!(!kind.field_names().is_empty(), "{} has no fields", kind.name());
        }
    }
}
