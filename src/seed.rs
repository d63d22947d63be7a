//! Fallback platform dataset and essential-platform backfill
//!
//! Both operations draw from one closed table of known platforms. Neither
//! ever overwrites stored platforms: seeding only fills an empty catalog,
//! and backfill only appends known platforms that are missing.

use chrono::{DateTime, Utc};

use crate::catalog::CatalogRepository;
use crate::error::StoreResult;
use crate::model::{Platform, PlatformType};

/// Fixed definition of a platform the storefront knows how to present
#[derive(Debug, Clone, Copy)]
pub struct KnownPlatform {
    pub slug: &'static str,
    pub name: &'static str,
    pub kind: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub website: &'static str,
    pub description: &'static str,
}

pub const KNOWN_PLATFORMS: [KnownPlatform; 9] = [
    KnownPlatform {
        slug: "instagram",
        name: "Instagram",
        kind: "social",
        color: "#E4405F",
        icon: "fab fa-instagram",
        website: "https://instagram.com",
        description: "Photo and video sharing network",
    },
    KnownPlatform {
        slug: "facebook",
        name: "Facebook",
        kind: "social",
        color: "#1877F2",
        icon: "fab fa-facebook",
        website: "https://facebook.com",
        description: "Social network for friends, pages and groups",
    },
    KnownPlatform {
        slug: "tiktok",
        name: "TikTok",
        kind: "video",
        color: "#000000",
        icon: "fab fa-tiktok",
        website: "https://tiktok.com",
        description: "Short-form video platform",
    },
    KnownPlatform {
        slug: "youtube",
        name: "YouTube",
        kind: "video",
        color: "#FF0000",
        icon: "fab fa-youtube",
        website: "https://youtube.com",
        description: "Video hosting and streaming",
    },
    KnownPlatform {
        slug: "twitter",
        name: "Twitter",
        kind: "social",
        color: "#1DA1F2",
        icon: "fab fa-twitter",
        website: "https://twitter.com",
        description: "Microblogging network",
    },
    KnownPlatform {
        slug: "linkedin",
        name: "LinkedIn",
        kind: "social",
        color: "#0A66C2",
        icon: "fab fa-linkedin",
        website: "https://linkedin.com",
        description: "Professional network",
    },
    KnownPlatform {
        slug: "pinterest",
        name: "Pinterest",
        kind: "social",
        color: "#E60023",
        icon: "fab fa-pinterest",
        website: "https://pinterest.com",
        description: "Visual discovery and bookmarking",
    },
    KnownPlatform {
        slug: "snapchat",
        name: "Snapchat",
        kind: "messaging",
        color: "#FFFC00",
        icon: "fab fa-snapchat",
        website: "https://snapchat.com",
        description: "Ephemeral photo messaging",
    },
    KnownPlatform {
        slug: "telegram",
        name: "Telegram",
        kind: "messaging",
        color: "#26A5E4",
        icon: "fab fa-telegram",
        website: "https://telegram.org",
        description: "Cloud-based messaging with channels",
    },
];

/// Looks up the fixed definition for an already normalized slug
pub fn known_platform(slug: &str) -> Option<&'static KnownPlatform> {
    KNOWN_PLATFORMS.iter().find(|known| known.slug == slug)
}

impl KnownPlatform {
    /// Builds the platform record, id `<slug>-default`
    pub fn to_platform(&self, created_at: DateTime<Utc>) -> Platform {
        Platform {
            id: format!("{}-default", self.slug),
            slug: self.slug.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            website: self.website.to_string(),
            color: self.color.to_string(),
            icon: self.icon.to_string(),
            kind: PlatformType::from(self.kind.to_string()),
            active: true,
            created_at,
        }
    }
}

/// Writes the full known-platform list if the catalog has no platforms
///
/// A stored list that only holds unreadable records is not empty and is
/// left alone. A value that is not JSON at all is treated as empty.
///
/// # Returns
///
/// * `Ok(true)` - all [`KNOWN_PLATFORMS`] were written
/// * `Ok(false)` - platforms were already stored
pub fn seed_if_empty(catalog: &CatalogRepository) -> StoreResult<bool> {
    let now = Utc::now();
    let platforms = KNOWN_PLATFORMS
        .iter()
        .map(|known| known.to_platform(now))
        .collect();

    let seeded = catalog.replace_if_empty(platforms)?;
    if seeded {
        tracing::info!(count = KNOWN_PLATFORMS.len(), "Seeded default platforms");
    }
    Ok(seeded)
}

/// Adds whichever of `required_slugs` are missing and have a known definition
///
/// 1. Normalizes each slug and skips ones already present or repeated
/// 2. Skips, with a warning, slugs that have no known definition
/// 3. Appends the rest with id `<slug>-default`
///
/// # Arguments
///
/// * `catalog` - repository to backfill
/// * `required_slugs` - slugs the storefront cannot work without
///
/// # Returns
///
/// The platforms actually added, in `required_slugs` order.
pub fn ensure_essentials<S: AsRef<str>>(
    catalog: &CatalogRepository,
    required_slugs: &[S],
) -> StoreResult<Vec<Platform>> {
    let present = catalog.get_platforms()?;
    let now = Utc::now();
    let mut added: Vec<Platform> = Vec::new();

    for slug in required_slugs {
        let slug = slug.as_ref().trim().to_lowercase();
        if present.iter().any(|p| p.slug == slug) || added.iter().any(|p| p.slug == slug) {
            continue;
        }

        let Some(known) = known_platform(&slug) else {
            tracing::warn!(%slug, "No known definition for essential platform, skipping");
            continue;
        };

        let platform = known.to_platform(now);
        if catalog.add_platform(platform.clone())? {
            added.push(platform);
        }
    }

    if !added.is_empty() {
        tracing::info!(count = added.len(), "Backfilled essential platforms");
    }
    Ok(added)
}
