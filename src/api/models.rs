use crate::api::ApiError;
use crate::domain::listing::ListingId;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

// page
//  ├── content[]
//  │    ├── id
//  │    ├── type          (tipo)
//  │    ├── description   (descricao)
//  │    ├── price         (preco | valor)
//  │    ├── address       (endereco)
//  │    │    ├── street        (rua)
//  │    │    ├── neighborhood  (bairro)
//  │    │    ├── city          (cidade)
//  │    │    └── state         (estado)
//  │    └── photos[]      (fotos)
//  │         └── url
//  └── last

#[derive(Debug, Deserialize)]
pub struct ListingDto {
    pub id: Option<i64>,
    #[serde(rename = "type", alias = "tipo")]
    pub kind: Option<String>,
    #[serde(alias = "descricao")]
    pub description: Option<String>,
    #[serde(alias = "preco", alias = "valor")]
    pub price: Option<f64>,
    #[serde(alias = "endereco")]
    pub address: Option<AddressDto>,
    #[serde(default, alias = "fotos", deserialize_with = "lenient_photo_urls")]
    pub photos: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressDto {
    #[serde(alias = "rua")]
    pub street: Option<String>,
    #[serde(alias = "bairro")]
    pub neighborhood: Option<String>,
    #[serde(alias = "cidade")]
    pub city: Option<String>,
    #[serde(alias = "estado")]
    pub state: Option<String>,
}

#[derive(Debug)]
pub struct PageEnvelope {
    pub content: Vec<ListingDto>,
    /// Length of the raw `content` array, malformed entries included.
    pub received: usize,
    /// `None` when the API omitted the flag.
    pub last: Option<bool>,
}

/// Photos arrive as `[{url}]`, sometimes as bare strings, sometimes as junk.
/// Keep only the entries that carry a string url.
fn lenient_photo_urls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(entries) = value.as_array() else {
        return Ok(Vec::new());
    };

    Ok(entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(url) => Some(url.clone()),
            Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .filter(|url| !url.trim().is_empty())
        .collect())
}

pub fn parse_page_envelope(body: &str) -> Result<PageEnvelope, ApiError> {
    let data: Value =
        serde_json::from_str(body).map_err(|e| ApiError::DataShape(e.to_string()))?;

    let obj = data
        .as_object()
        .ok_or_else(|| ApiError::DataShape("page envelope is not an object".to_string()))?;

    let raw = obj.get("content").and_then(Value::as_array);
    let received = raw.map_or(0, Vec::len);

    let content = match raw {
        Some(arr) => arr
            .iter()
            .filter_map(|v| match serde_json::from_value::<ListingDto>(v.clone()) {
                Ok(dto) => Some(dto),
                Err(e) => {
                    warn!(error = %e, "skipping malformed listing entry");
                    None
                }
            })
            .collect(),
        None => {
            warn!("page envelope has no content array, treating as empty");
            Vec::new()
        }
    };

    Ok(PageEnvelope {
        content,
        received,
        last: obj.get("last").and_then(Value::as_bool),
    })
}

/// Accepts `[1, 2]`, `[{ "id": 1 }]`, `[{ "imovelId": 1 }]`, `[{ "imovel": { "id": 1 } }]`
/// and the same wrapped in a `content` envelope.
pub fn parse_favorite_ids(body: &str) -> Result<HashSet<ListingId>, ApiError> {
    let data: Value =
        serde_json::from_str(body).map_err(|e| ApiError::DataShape(e.to_string()))?;

    let entries = match &data {
        Value::Array(arr) => arr.as_slice(),
        Value::Object(obj) => obj
            .get("content")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => {
            return Err(ApiError::DataShape(
                "favorites payload is neither a list nor an envelope".to_string(),
            ))
        }
    };

    Ok(entries.iter().filter_map(favorite_entry_id).collect())
}

fn favorite_entry_id(entry: &Value) -> Option<ListingId> {
    let raw = match entry {
        Value::Number(n) => n.as_i64(),
        Value::Object(map) => map
            .get("imovelId")
            .and_then(Value::as_i64)
            .or_else(|| {
                map.get("imovel")
                    .and_then(|i| i.get("id"))
                    .and_then(Value::as_i64)
            })
            .or_else(|| map.get("id").and_then(Value::as_i64)),
        _ => None,
    };
    raw.map(ListingId)
}
