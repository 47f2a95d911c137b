//! Field layouts: where each descriptor field lives inside a raw record.
//!
//! A layout is a static table of JSON pointers (RFC 6901). Adapters tag
//! their payload with the layout it follows; the normalizer only walks
//! pointers, so a new record shape is a new table, not new code.
//!
//! Fields with several candidate pointers are tried in order and the first
//! usable value wins.

/// Pointers for one array of media URLs inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaListLayout {
    /// Pointer to the array of entries, from the record root
    pub array: &'static str,
    /// Pointer to the URL list inside one entry
    pub url_list: &'static str,
}

/// Pointers into one bit-rate variant entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantLayout {
    /// Pointer to the variant array, from the record root
    pub array: &'static str,
    /// Quality label (e.g. `normal_1080_0`)
    pub gear_name: &'static str,
    /// Bitrate in bits per second
    pub bit_rate: &'static str,
    /// Candidate URL lists for the variant
    pub url_list: &'static str,
    /// Frame height in pixels
    pub height: &'static str,
}

/// Pointers into the author object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorLayout {
    /// Pointer to the author object, from the record root
    pub root: &'static str,
    pub id: &'static [&'static str],
    pub handle: &'static [&'static str],
    pub nickname: &'static [&'static str],
    /// URL lists; the first entry of the first non-empty list is used
    pub avatar: &'static [&'static str],
}

/// Pointers into the statistics object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsLayout {
    /// Pointer to the statistics object, from the record root
    pub root: &'static str,
    pub likes: &'static str,
    pub comments: &'static str,
    pub shares: &'static str,
    pub plays: &'static str,
    pub collects: &'static str,
}

/// Pointers into the background-music object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicLayout {
    /// Pointer to the music object, from the record root
    pub root: &'static str,
    pub title: &'static str,
    pub author: &'static str,
    pub play_url: &'static str,
}

/// Complete field layout for one record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    /// Layout name for logging
    pub name: &'static str,
    /// Content id (string or number)
    pub id: &'static str,
    pub title: &'static str,
    /// Creation time in unix seconds
    pub created_at: &'static str,
    /// Cover URL lists, in preference order
    pub cover: &'static [&'static str],
    /// URL list of the default play address
    pub play_addr: &'static str,
    pub variants: VariantLayout,
    /// Image-post galleries, in preference order
    pub images: &'static [MediaListLayout],
    pub author: AuthorLayout,
    pub statistics: StatisticsLayout,
    /// Hashtag entry array and the name pointer inside one entry
    pub hashtags: (&'static str, &'static str),
    pub music: MusicLayout,
    /// Raw keys passed through verbatim, as (output key, pointer)
    pub raw_keys: &'static [(&'static str, &'static str)],
}

/// Layout of an "aweme" record, shared by Douyin and `TikTok`.
pub static AWEME_LAYOUT: FieldLayout = FieldLayout {
    name: "aweme",
    id: "/aweme_id",
    title: "/desc",
    created_at: "/create_time",
    cover: &[
        "/video/cover/url_list",
        "/video/origin_cover/url_list",
        "/video/dynamic_cover/url_list",
    ],
    play_addr: "/video/play_addr/url_list",
    variants: VariantLayout {
        array: "/video/bit_rate",
        gear_name: "/gear_name",
        bit_rate: "/bit_rate",
        url_list: "/play_addr/url_list",
        height: "/play_addr/height",
    },
    images: &[
        MediaListLayout {
            array: "/images",
            url_list: "/url_list",
        },
        MediaListLayout {
            array: "/image_post_info/images",
            url_list: "/display_image/url_list",
        },
    ],
    author: AuthorLayout {
        root: "/author",
        id: &["/uid", "/sec_uid"],
        handle: &["/unique_id", "/short_id"],
        nickname: &["/nickname"],
        avatar: &["/avatar_larger/url_list", "/avatar_thumb/url_list"],
    },
    statistics: StatisticsLayout {
        root: "/statistics",
        likes: "/digg_count",
        comments: "/comment_count",
        shares: "/share_count",
        plays: "/play_count",
        collects: "/collect_count",
    },
    hashtags: ("/text_extra", "/hashtag_name"),
    music: MusicLayout {
        root: "/music",
        title: "/title",
        author: "/author",
        play_url: "/play_url/url_list",
    },
    raw_keys: &[
        ("aweme_type", "/aweme_type"),
        ("duration_ms", "/video/duration"),
        ("region", "/region"),
        ("share_url", "/share_url"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn all_pointers(layout: &FieldLayout) -> Vec<&'static str> {
        let mut pointers = vec![
            layout.id,
            layout.title,
            layout.created_at,
            layout.play_addr,
            layout.variants.array,
            layout.variants.gear_name,
            layout.variants.bit_rate,
            layout.variants.url_list,
            layout.variants.height,
            layout.author.root,
            layout.statistics.root,
            layout.statistics.likes,
            layout.hashtags.0,
            layout.hashtags.1,
            layout.music.root,
            layout.music.play_url,
        ];
        pointers.extend(layout.cover);
        pointers.extend(layout.author.id);
        pointers.extend(layout.author.avatar);
        pointers.extend(layout.images.iter().flat_map(|m| [m.array, m.url_list]));
        pointers.extend(layout.raw_keys.iter().map(|(_, p)| *p));
        pointers
    }

    #[test]
    fn test_aweme_layout_pointers_are_rooted() {
        for pointer in all_pointers(&AWEME_LAYOUT) {
            assert!(pointer.starts_with('/'), "pointer must start with '/': {pointer}");
        }
    }

    #[test]
    fn test_raw_keys_are_unique() {
        let mut keys: Vec<&str> = AWEME_LAYOUT.raw_keys.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), AWEME_LAYOUT.raw_keys.len());
    }
}
