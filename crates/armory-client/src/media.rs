//! Static media URLs for icons and character thumbnails.

use armory_core::Region;

use crate::game::IconSize;

/// URL of an item, spell or achievement icon.
pub fn icon_url(region: Region, size: IconSize, icon: &str) -> String {
    format!(
        "https://{region}.media.blizzard.com/wow/icons/{}/{icon}.jpg",
        size.pixels()
    )
}

/// URL of a character's rendered portrait from its `thumbnail` path.
pub fn thumbnail_url(region: Region, thumbnail: &str) -> String {
    format!(
        "https://{region}.battle.net/static-render/{region}/{}",
        thumbnail.trim_start_matches('/')
    )
}
