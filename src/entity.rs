//! `entity` contains the block entity extensions some block kinds carry, currently only signs.

use crate::config::Edition;
use simdnbt::owned::{NbtCompound, NbtList, NbtTag};

/// Closed set of block kinds that come with extra block entity behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Plain,
    Sign,
}

impl BlockKind {
    /// Resolves the kind from a block name, anything with `sign` in it is a [`BlockKind::Sign`]
    pub fn from_name(name: &str) -> Self {
        if name.contains("sign") {
            BlockKind::Sign
        } else {
            BlockKind::Plain
        }
    }

    pub fn extension(self) -> Option<&'static dyn EntityExtension> {
        match self {
            BlockKind::Sign => Some(&SIGN),
            BlockKind::Plain => None,
        }
    }
}

/// Plain text of both sides of a sign, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignText {
    pub front: Vec<String>,
    pub back: Vec<String>,
}

/// Text helpers a block kind can attach to its block entity payload.
pub trait EntityExtension: Send + Sync {
    /// Reads the text out of a payload, `None` if the payload carries none
    fn text(&self, entity: &NbtCompound, edition: Edition) -> Option<SignText>;

    /// Writes `text` into the payload, keeping whichever layout it already uses
    fn set_text(&self, entity: &mut NbtCompound, edition: Edition, text: &SignText);
}

struct SignExtension;

static SIGN: SignExtension = SignExtension;

const PC_LINES: usize = 4;
const OLD_PC_KEYS: [&str; PC_LINES] = ["Text1", "Text2", "Text3", "Text4"];

impl EntityExtension for SignExtension {
    fn text(&self, entity: &NbtCompound, edition: Edition) -> Option<SignText> {
        match edition {
            Edition::Pc => {
                if let Some(front) = entity.compound("front_text") {
                    return Some(SignText {
                        front: messages(front),
                        back: entity.compound("back_text").map(messages).unwrap_or_default(),
                    });
                }

                let front: Vec<String> = OLD_PC_KEYS
                    .iter()
                    .filter_map(|key| entity.string(key))
                    .map(|line| plain_text(&line.to_str()))
                    .collect();
                (!front.is_empty()).then(|| SignText {
                    front,
                    back: Vec::new(),
                })
            }
            Edition::Bedrock => {
                if let Some(front) = entity.compound("FrontText") {
                    return Some(SignText {
                        front: bedrock_lines(front),
                        back: entity.compound("BackText").map(bedrock_lines).unwrap_or_default(),
                    });
                }

                entity.string("Text").map(|text| SignText {
                    front: text.to_str().split('\n').map(str::to_owned).collect(),
                    back: Vec::new(),
                })
            }
        }
    }

    fn set_text(&self, entity: &mut NbtCompound, edition: Edition, text: &SignText) {
        match edition {
            Edition::Pc if entity.contains("Text1") => {
                for (i, key) in OLD_PC_KEYS.iter().enumerate() {
                    let line = text.front.get(i).map(String::as_str).unwrap_or_default();
                    set_tag(entity, key, NbtTag::String(json_text(line).as_str().into()));
                }
            }
            Edition::Pc => {
                set_messages(entity, "front_text", &text.front);
                set_messages(entity, "back_text", &text.back);
            }
            Edition::Bedrock if entity.contains("Text") && !entity.contains("FrontText") => {
                set_tag(entity, "Text", NbtTag::String(text.front.join("\n").as_str().into()));
            }
            Edition::Bedrock => {
                set_bedrock_text(entity, "FrontText", &text.front);
                set_bedrock_text(entity, "BackText", &text.back);
            }
        }
    }
}

/// Replaces `name` in place, inserting it when missing
fn set_tag(compound: &mut NbtCompound, name: &str, tag: NbtTag) {
    match compound.get_mut(name) {
        Some(existing) => *existing = tag,
        None => {
            compound.insert(name, tag);
        }
    }
}

fn messages(side: &NbtCompound) -> Vec<String> {
    match side.list("messages") {
        Some(NbtList::String(lines)) => lines
            .iter()
            .map(|line| plain_text(&line.as_str().to_str()))
            .collect(),
        _ => Vec::new(),
    }
}

fn set_messages(entity: &mut NbtCompound, side: &str, lines: &[String]) {
    let messages: Vec<String> = (0..PC_LINES)
        .map(|i| json_text(lines.get(i).map(String::as_str).unwrap_or_default()))
        .collect();
    let list = NbtTag::List(NbtList::String(
        messages.iter().map(|m| m.as_str().into()).collect(),
    ));

    match entity.compound_mut(side) {
        Some(compound) => set_tag(compound, "messages", list),
        None => {
            let compound = NbtCompound::from_values(vec![
                ("messages".into(), list),
                ("color".into(), NbtTag::String("black".into())),
                ("has_glowing_text".into(), NbtTag::Byte(0)),
            ]);
            entity.insert(side, compound);
        }
    }
}

fn bedrock_lines(side: &NbtCompound) -> Vec<String> {
    side.string("Text")
        .map(|text| text.to_str().split('\n').map(str::to_owned).collect())
        .unwrap_or_default()
}

fn set_bedrock_text(entity: &mut NbtCompound, side: &str, lines: &[String]) {
    let text = NbtTag::String(lines.join("\n").as_str().into());
    match entity.compound_mut(side) {
        Some(compound) => set_tag(compound, "Text", text),
        None => {
            entity.insert(side, NbtCompound::from_values(vec![("Text".into(), text)]));
        }
    }
}

/// Flattens a json text component into its plain text, raw strings are returned as is
fn plain_text(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(component) => component_text(&component),
        Err(_) => raw.to_owned(),
    }
}

fn component_text(component: &serde_json::Value) -> String {
    use serde_json::Value;

    match component {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts.iter().map(component_text).collect(),
        Value::Object(object) => {
            let mut text = object
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            if let Some(Value::Array(extra)) = object.get("extra") {
                text.extend(extra.iter().map(component_text));
            }
            text
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_text(line: &str) -> String {
    serde_json::Value::from(line).to_string()
}
