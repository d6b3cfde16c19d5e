use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ANILIST_API: &str = "https://graphql.anilist.co";

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: IdsVariables<'a>,
}

#[derive(Serialize)]
struct IdsVariables<'a> {
    ids: &'a [i32],
}

#[derive(Deserialize)]
struct CharactersResponse {
    data: Option<CharactersData>,
}

#[derive(Deserialize)]
struct CharactersData {
    #[serde(rename = "Page")]
    page: CharactersPage,
}

#[derive(Deserialize)]
struct CharactersPage {
    characters: Vec<Character>,
}

#[derive(Deserialize)]
struct MediasResponse {
    data: Option<MediasData>,
}

#[derive(Deserialize)]
struct MediasData {
    #[serde(rename = "Page")]
    page: MediasPage,
}

#[derive(Deserialize)]
struct MediasPage {
    media: Vec<Media>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: i32,
    pub name: CharacterName,
    pub image: Option<CharacterImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterName {
    pub full: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: i32,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub title: MediaTitle,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<MediaCoverImage>,
    pub episodes: Option<i32>,
    pub status: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCoverImage {
    #[serde(rename = "extraLarge")]
    pub extra_large: Option<String>,
}

#[derive(Clone)]
pub struct AnilistClient {
    client: Client,
}

impl Default for AnilistClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnilistClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("Anipool/1.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Reuse a shared HTTP client for connection pooling.
    pub const fn with_shared_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch character records for the given AniList ids.
    pub async fn get_characters_by_ids(&self, ids: &[i32]) -> Result<Vec<Character>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let gql_query = r#"
            query ($ids: [Int]) {
                Page(page: 1, perPage: 50) {
                    characters(id_in: $ids) {
                        id
                        name { full native }
                        image { large medium }
                    }
                }
            }
        "#;

        let request_body = GraphQLRequest {
            query: gql_query,
            variables: IdsVariables { ids },
        };

        let response: CharactersResponse = self
            .client
            .post(ANILIST_API)
            .json(&request_body)
            .send()
            .await?
            .json()
            .await?;

        Ok(response
            .data
            .map(|d| d.page.characters)
            .unwrap_or_default())
    }

    /// Fetch anime/manga records for the given AniList ids.
    pub async fn get_medias_by_ids(&self, ids: &[i32]) -> Result<Vec<Media>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let gql_query = r#"
            query ($ids: [Int]) {
                Page(page: 1, perPage: 50) {
                    media(id_in: $ids) {
                        id
                        type
                        title { romaji english native }
                        coverImage { extraLarge }
                        episodes
                        status
                        format
                    }
                }
            }
        "#;

        let request_body = GraphQLRequest {
            query: gql_query,
            variables: IdsVariables { ids },
        };

        let response: MediasResponse = self
            .client
            .post(ANILIST_API)
            .json(&request_body)
            .send()
            .await?
            .json()
            .await?;

        Ok(response.data.map(|d| d.page.media).unwrap_or_default())
    }
}
