//! Eligibility policy
//!
//! Only accounts created strictly before 2024-08-01 00:00 in Seoul
//! may reach the ballot. The cutoff is a fixed policy, not configuration.

use chrono::{DateTime, FixedOffset, TimeZone};
use lazy_static::lazy_static;

use crate::auth::Profile;

lazy_static! {
    /// Asia/Seoul has been a constant UTC+09:00 since 1988
    static ref SEOUL: FixedOffset =
        FixedOffset::east_opt(9 * 3600).expect("UTC+09:00 is a valid offset");

    /// First instant at which a newly created account is no longer eligible
    pub static ref ELIGIBILITY_CUTOFF: DateTime<FixedOffset> = SEOUL
        .with_ymd_and_hms(2024, 8, 1, 0, 0, 0)
        .single()
        .expect("cutoff is an unambiguous local time");
}

/// Returns true iff the profile's account predates the cutoff
pub fn is_eligible(profile: &Profile) -> bool {
    created_before_cutoff(profile.created_utc)
}

fn created_before_cutoff(created_utc: i64) -> bool {
    match DateTime::from_timestamp(created_utc, 0) {
        Some(created) => created.with_timezone(&*SEOUL) < *ELIGIBILITY_CUTOFF,
        None => false,
    }
}
