//! Normalization of raw platform records into [`VideoDescriptor`]s.
//!
//! [`project`] is a pure function of the raw record and the `minimal` flag.
//! It reads fields only through the record's [`FieldLayout`] and never
//! branches on the platform.
//!
//! # Projections
//!
//! - **full**: every field the layout can locate
//! - **minimal**: `id`, `platform`, `title`, `play_url`, and `cover_url` only;
//!   every other field is `None`
//!
//! Counters are passed through as reported; nothing is recomputed.

mod descriptor;
mod layout;

pub use descriptor::{AuthorInfo, ContentType, MusicInfo, PlayUrl, Statistics, VideoDescriptor};
pub use layout::{
    AWEME_LAYOUT, AuthorLayout, FieldLayout, MediaListLayout, MusicLayout, StatisticsLayout,
    VariantLayout,
};

use serde_json::{Map, Value};
use tracing::debug;

use crate::adapter::RawPlatformData;
use crate::error::GatewayError;

/// Quality label given to the default play address.
const DEFAULT_QUALITY: &str = "default";

/// Projects a raw record into a descriptor.
///
/// # Errors
///
/// Returns [`GatewayError::MalformedUpstreamData`] when the record is not a
/// JSON object, has no usable id, or is a video without any play URL.
pub fn project(raw: &RawPlatformData, minimal: bool) -> Result<VideoDescriptor, GatewayError> {
    let layout = raw.layout;
    let record = &raw.payload;
    if !record.is_object() {
        return Err(GatewayError::malformed(
            raw.platform,
            "content record is not a JSON object",
        ));
    }

    let id = lookup(record, layout.id).and_then(as_text).ok_or_else(|| {
        GatewayError::malformed(raw.platform, &format!("missing content id at '{}'", layout.id))
    })?;
    let title = lookup(record, layout.title)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let image_urls = image_urls(record, layout);
    let content_type = if image_urls.is_some() {
        ContentType::ImagePost
    } else {
        ContentType::Video
    };

    let play_urls = play_urls(record, layout);
    if play_urls.is_empty() && content_type == ContentType::Video {
        return Err(GatewayError::malformed(
            raw.platform,
            &format!("video '{id}' has no play URL"),
        ));
    }

    let cover_url = first_url_of(record, layout.cover).or_else(|| {
        image_urls
            .as_ref()
            .and_then(|urls| urls.first().cloned())
    });
    let play_url = play_urls.first().map(|play| play.url.clone());

    debug!(
        platform = %raw.platform,
        layout = layout.name,
        id = %id,
        minimal,
        variants = play_urls.len(),
        "Projecting raw record"
    );

    if minimal {
        return Ok(VideoDescriptor {
            id,
            platform: raw.platform,
            title,
            cover_url,
            play_url,
            play_urls: None,
            author: None,
            statistics: None,
            content_type: None,
            image_urls: None,
            hashtags: None,
            created_at: None,
            music: None,
            is_minimal: true,
            raw: None,
        });
    }

    Ok(VideoDescriptor {
        id,
        platform: raw.platform,
        title,
        cover_url,
        play_url,
        play_urls: (!play_urls.is_empty()).then_some(play_urls),
        author: author(record, &layout.author),
        statistics: statistics(record, &layout.statistics),
        content_type: Some(content_type),
        image_urls,
        hashtags: hashtags(record, layout.hashtags),
        created_at: lookup(record, layout.created_at).and_then(as_timestamp),
        music: music(record, &layout.music),
        is_minimal: false,
        raw: pass_through(record, layout.raw_keys),
    })
}

fn lookup<'a>(value: &'a Value, pointer: &str) -> Option<&'a Value> {
    value.pointer(pointer).filter(|found| !found.is_null())
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// First non-empty string in the URL list at `pointer`.
fn first_url(value: &Value, pointer: &str) -> Option<String> {
    lookup(value, pointer)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

fn first_url_of(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|pointer| first_url(value, pointer))
}

fn first_text_of(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|pointer| lookup(value, pointer).and_then(as_text))
}

/// Bit-rate variants best first, deduplicated, default address last.
fn play_urls(record: &Value, layout: &FieldLayout) -> Vec<PlayUrl> {
    let variants = &layout.variants;
    let mut candidates: Vec<PlayUrl> = lookup(record, variants.array)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    Some(PlayUrl {
                        url: first_url(entry, variants.url_list)?,
                        quality: lookup(entry, variants.gear_name).and_then(as_text),
                        bitrate: lookup(entry, variants.bit_rate).and_then(as_count),
                        height: lookup(entry, variants.height).and_then(as_count),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    // stable: equal bitrates keep upstream order, unknown bitrates sort last
    candidates.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

    let mut ordered: Vec<PlayUrl> = Vec::with_capacity(candidates.len() + 1);
    for candidate in candidates {
        if !ordered.iter().any(|seen| seen.url == candidate.url) {
            ordered.push(candidate);
        }
    }

    let default_url = first_url(record, layout.play_addr)
        .filter(|url| !ordered.iter().any(|seen| seen.url == *url));
    if let Some(default_url) = default_url {
        ordered.push(PlayUrl {
            url: default_url,
            quality: Some(DEFAULT_QUALITY.to_string()),
            bitrate: None,
            height: None,
        });
    }

    ordered
}

/// Gallery URLs of an image post, from the first layout that yields any.
fn image_urls(record: &Value, layout: &FieldLayout) -> Option<Vec<String>> {
    layout.images.iter().find_map(|gallery| {
        let urls: Vec<String> = lookup(record, gallery.array)?
            .as_array()?
            .iter()
            .filter_map(|image| first_url(image, gallery.url_list))
            .collect();
        (!urls.is_empty()).then_some(urls)
    })
}

fn author(record: &Value, layout: &AuthorLayout) -> Option<AuthorInfo> {
    let root = lookup(record, layout.root).filter(|value| value.is_object())?;
    Some(AuthorInfo {
        id: first_text_of(root, layout.id),
        handle: first_text_of(root, layout.handle),
        nickname: first_text_of(root, layout.nickname),
        avatar_url: first_url_of(root, layout.avatar),
    })
}

fn statistics(record: &Value, layout: &StatisticsLayout) -> Option<Statistics> {
    let root = lookup(record, layout.root).filter(|value| value.is_object())?;
    let count = |pointer: &str| lookup(root, pointer).and_then(as_count);
    Some(Statistics {
        likes: count(layout.likes),
        comments: count(layout.comments),
        shares: count(layout.shares),
        plays: count(layout.plays),
        collects: count(layout.collects),
    })
}

fn hashtags(record: &Value, (array, name): (&str, &str)) -> Option<Vec<String>> {
    let entries = lookup(record, array)?.as_array()?;
    let mut tags: Vec<String> = Vec::new();
    for tag in entries.iter().filter_map(|entry| lookup(entry, name).and_then(as_text)) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Some(tags)
}

fn music(record: &Value, layout: &MusicLayout) -> Option<MusicInfo> {
    let root = lookup(record, layout.root).filter(|value| value.is_object())?;
    Some(MusicInfo {
        title: lookup(root, layout.title).and_then(as_text),
        author: lookup(root, layout.author).and_then(as_text),
        play_url: first_url(root, layout.play_url),
    })
}

fn pass_through(record: &Value, keys: &[(&str, &str)]) -> Option<Map<String, Value>> {
    let selected: Map<String, Value> = keys
        .iter()
        .filter_map(|(key, pointer)| lookup(record, pointer).map(|v| ((*key).to_string(), v.clone())))
        .collect();
    (!selected.is_empty()).then_some(selected)
}
