//! Visibility

use crate::{
    buyers::{BuyerCategory, Viewer},
    listings::Listing,
};

/// Whether `viewer` may see `listing`.
///
/// Staff see everything and an unrestricted listing is visible to everyone. Otherwise the
/// viewer's buyer category must be on the listing's list, so callers without a category are
/// denied restricted listings.
pub fn is_visible(listing: &Listing, viewer: Viewer) -> bool {
    match viewer {
        Viewer::Staff => true,
        _ if listing.visibility.is_empty() => true,
        Viewer::Buyer(category) => is_visible_to_category(listing, category),
        Viewer::Anonymous => false,
    }
}

/// Whether a buyer of `category` may see `listing`.
pub fn is_visible_to_category(listing: &Listing, category: BuyerCategory) -> bool {
    listing.visibility.is_empty() || listing.visibility.contains(&category)
}
