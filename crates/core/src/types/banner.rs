//! Site-wide promotional banner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::BannerId;

/// A row of `promotional_banner`. At most one row is expected to be active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionalBanner {
    pub id: BannerId,
    pub text: String,
    /// CSS color for the text.
    pub text_color: String,
    /// CSS color for the banner background.
    pub background_color: String,
    pub is_active: bool,
    /// Marquee speed in seconds per loop.
    pub animation_speed: f64,
    pub updated_at: DateTime<Utc>,
}
