//! AniList metadata enrichment for poll options.
//!
//! Options reference external records by `(anilist_id, kind)`. This service
//! fetches the referenced characters and media in two batched lookups and
//! overlays them onto the stored option list with a pure merge function. A
//! failed lookup degrades the affected options to missing enrichment instead
//! of failing the whole read.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::clients::anilist::{AnilistClient, Character, Media};
use crate::models::PollOption;

/// A poll option overlaid with whatever metadata the lookup produced.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedOption {
    #[serde(flatten)]
    pub option: PollOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
}

/// Pure mapping of option records onto metadata lookup tables.
#[must_use]
pub fn merge_options(
    options: &[PollOption],
    characters: &HashMap<i32, Character>,
    medias: &HashMap<i32, Media>,
) -> Vec<EnrichedOption> {
    options
        .iter()
        .map(|option| {
            let (character, media) = if option.kind.is_media() {
                (None, medias.get(&option.anilist_id).cloned())
            } else {
                (characters.get(&option.anilist_id).cloned(), None)
            };

            EnrichedOption {
                option: option.clone(),
                character,
                media,
            }
        })
        .collect()
}

pub struct MetadataService {
    anilist: Arc<AnilistClient>,
}

impl MetadataService {
    #[must_use]
    pub const fn new(anilist: Arc<AnilistClient>) -> Self {
        Self { anilist }
    }

    /// Enrich an option list, tolerating lookup failures.
    pub async fn enrich_options(&self, options: &[PollOption]) -> Vec<EnrichedOption> {
        let character_ids: Vec<i32> = options
            .iter()
            .filter(|o| !o.kind.is_media())
            .map(|o| o.anilist_id)
            .collect();
        let media_ids: Vec<i32> = options
            .iter()
            .filter(|o| o.kind.is_media())
            .map(|o| o.anilist_id)
            .collect();

        let (characters, medias) = tokio::join!(
            self.anilist.get_characters_by_ids(&character_ids),
            self.anilist.get_medias_by_ids(&media_ids),
        );

        let characters: HashMap<i32, Character> = match characters {
            Ok(list) => list.into_iter().map(|c| (c.id, c)).collect(),
            Err(e) => {
                warn!("Character lookup failed, serving bare options: {e}");
                HashMap::new()
            }
        };

        let medias: HashMap<i32, Media> = match medias {
            Ok(list) => list.into_iter().map(|m| (m.id, m)).collect(),
            Err(e) => {
                warn!("Media lookup failed, serving bare options: {e}");
                HashMap::new()
            }
        };

        merge_options(options, &characters, &medias)
    }
}
