// Field label resolution from channel metadata
use super::channel::{ChannelMetadata, Slot, SLOT_COUNT};

/// Display names for all eight slots of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLabels([String; SLOT_COUNT]);

impl FieldLabels {
    pub fn get(&self, slot: Slot) -> &str {
        &self.0[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> {
        Slot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

/// Channel identity plus its resolved field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLabels {
    pub channel_id: Option<u64>,
    pub name: Option<String>,
    pub fields: FieldLabels,
}

impl ChannelLabels {
    pub fn from_metadata(metadata: &ChannelMetadata) -> Self {
        Self {
            channel_id: metadata.id,
            name: metadata.name.clone(),
            fields: resolve_labels(metadata),
        }
    }
}

/// Resolve a display name per slot: the metadata label with whitespace
/// collapsed, or the slot identifier when the label is blank or absent.
pub fn resolve_labels(metadata: &ChannelMetadata) -> FieldLabels {
    FieldLabels(Slot::ALL.map(|slot| {
        let cleaned = metadata.label(slot).map(clean_label).unwrap_or_default();
        if cleaned.is_empty() {
            slot.ident().to_string()
        } else {
            cleaned
        }
    }))
}

fn clean_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}
