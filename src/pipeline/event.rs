use sha2::{Digest, Sha256};

use crate::prune::{Event, FieldValue};

#[derive(Debug, Clone)]
pub struct PipelineEvent {
    pub id: String,
    /// Path of the webhook the event arrived on.
    pub source: String,
    pub fields: Event,
}

impl PipelineEvent {
    pub fn new(fields: Event, source: String) -> Self {
        let id = Self::generate_id(&fields);

        Self { id, source, fields }
    }

    fn generate_id(fields: &Event) -> String {
        let mut hasher = Sha256::new();

        for field in fields.iter() {
            match &field.name {
                Some(name) => {
                    hasher.update([b'n']);
                    update_len_prefixed(&mut hasher, name);
                }
                None => hasher.update([b'u']),
            }

            match &field.value {
                FieldValue::Scalar(s) => {
                    hasher.update([b's']);
                    update_len_prefixed(&mut hasher, s);
                }
                FieldValue::Sequence(items) => {
                    hasher.update([b'q']);
                    hasher.update((items.len() as u64).to_be_bytes());
                    for item in items {
                        update_len_prefixed(&mut hasher, item);
                    }
                }
            }
        }

        let result = hasher.finalize();
        hex::encode(result)
    }
}

fn update_len_prefixed(hasher: &mut Sha256, text: &str) {
    hasher.update((text.len() as u64).to_be_bytes());
    hasher.update(text.as_bytes());
}
