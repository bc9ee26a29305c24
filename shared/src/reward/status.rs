//! Reward status mapping
//!
//! Clients only ever see three states ([`RewardStatus`]). Rows persist the
//! legacy triple `is_deleted` / `is_active` / `reward_status`. The mapping is
//! lossy in both directions:
//!
//! | status    | is_deleted | is_active | reward_status |
//! |-----------|------------|-----------|---------------|
//! | active    | 0          | 1         | active        |
//! | inactive  | (unset)    | 0         | inactive      |
//! | suspended | (unset)    | 0         | suspended     |
//!
//! Unset fields are absent from the patch so the prior persisted value survives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, ErrorCode};

/// User-facing reward status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardStatus {
    Active,
    Inactive,
    Suspended,
}

impl RewardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for RewardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `reward_status` column.
///
/// `Archived` is only ever assigned directly; the three-state mapper never
/// produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistedStatus {
    Active,
    Inactive,
    Suspended,
    Archived,
}

impl PersistedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for PersistedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reward_status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for PersistedStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            "archived" => Ok(Self::Archived),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl From<RewardStatus> for PersistedStatus {
    fn from(status: RewardStatus) -> Self {
        match status {
            RewardStatus::Active => Self::Active,
            RewardStatus::Inactive => Self::Inactive,
            RewardStatus::Suspended => Self::Suspended,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Cannot create a reward with status '{0}'")]
    NotAllowedOnCreate(RewardStatus),
}

impl From<StatusError> for AppError {
    fn from(err: StatusError) -> Self {
        let StatusError::NotAllowedOnCreate(status) = &err;
        AppError::with_message(ErrorCode::InvalidStatusTransition, err.to_string())
            .with_detail("status", status.as_str())
    }
}

/// Partial update of the legacy status columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_status: Option<PersistedStatus>,
}

/// Anything the status patch can be merged into.
pub trait StatusTarget {
    fn set_is_deleted(&mut self, value: i16);
    fn set_is_active(&mut self, value: i16);
    fn set_reward_status(&mut self, value: PersistedStatus);
}

impl StatusTarget for StatusPatch {
    fn set_is_deleted(&mut self, value: i16) {
        self.is_deleted = Some(value);
    }

    fn set_is_active(&mut self, value: i16) {
        self.is_active = Some(value);
    }

    fn set_reward_status(&mut self, value: PersistedStatus) {
        self.reward_status = Some(value);
    }
}

impl StatusPatch {
    /// Copy the defined fields onto `target`, leaving everything else alone.
    pub fn apply_to<T: StatusTarget + ?Sized>(&self, target: &mut T) {
        if let Some(v) = self.is_deleted {
            target.set_is_deleted(v);
        }
        if let Some(v) = self.is_active {
            target.set_is_active(v);
        }
        if let Some(v) = self.reward_status {
            target.set_reward_status(v);
        }
    }
}

/// Legacy column patch for a user-facing status.
pub fn to_db_fields(status: RewardStatus) -> StatusPatch {
    match status {
        RewardStatus::Active => StatusPatch {
            is_deleted: Some(0),
            is_active: Some(1),
            reward_status: Some(PersistedStatus::Active),
        },
        RewardStatus::Inactive => StatusPatch {
            is_deleted: None,
            is_active: Some(0),
            reward_status: Some(PersistedStatus::Inactive),
        },
        RewardStatus::Suspended => StatusPatch {
            is_deleted: None,
            is_active: Some(0),
            reward_status: Some(PersistedStatus::Suspended),
        },
    }
}

/// User-facing status of a persisted row.
///
/// `suspended` wins over `is_active`; `active` needs both the flag and the
/// column; everything else is `inactive`.
///
/// # Panics
///
/// When `is_deleted == 1`. Soft-deleted rows are filtered out by every query
/// that feeds this function, so reaching it with one is a bug upstream.
pub fn from_db_fields(
    is_active: i16,
    reward_status: Option<PersistedStatus>,
    is_deleted: i16,
) -> RewardStatus {
    assert!(
        is_deleted != 1,
        "soft-deleted reward row reached status mapping"
    );
    match reward_status {
        Some(PersistedStatus::Suspended) => RewardStatus::Suspended,
        Some(PersistedStatus::Active) if is_active == 1 => RewardStatus::Active,
        _ => RewardStatus::Inactive,
    }
}

/// Variant of [`from_db_fields`] for raw column text; unknown values fall back to `inactive`.
pub fn from_db_columns(is_active: i16, reward_status: Option<&str>, is_deleted: i16) -> RewardStatus {
    let parsed = reward_status.and_then(|s| s.parse::<PersistedStatus>().ok());
    from_db_fields(is_active, parsed, is_deleted)
}

/// `suspended` cannot be chosen when a reward is created; anything else goes.
pub fn validate_transition(new_status: RewardStatus, is_creation: bool) -> Result<(), StatusError> {
    if is_creation && new_status == RewardStatus::Suspended {
        return Err(StatusError::NotAllowedOnCreate(new_status));
    }
    Ok(())
}

/// Merge the patch for `status` into `target`.
pub fn apply_mapping<T: StatusTarget + ?Sized>(status: RewardStatus, target: &mut T) {
    to_db_fields(status).apply_to(target);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Persisted row state used to replay patches
    #[derive(Debug, Clone, Copy)]
    struct Row {
        is_deleted: i16,
        is_active: i16,
        reward_status: Option<PersistedStatus>,
        sort_order: i32,
    }

    impl StatusTarget for Row {
        fn set_is_deleted(&mut self, value: i16) {
            self.is_deleted = value;
        }
        fn set_is_active(&mut self, value: i16) {
            self.is_active = value;
        }
        fn set_reward_status(&mut self, value: PersistedStatus) {
            self.reward_status = Some(value);
        }
    }

    fn row(is_deleted: i16, is_active: i16, status: Option<PersistedStatus>) -> Row {
        Row {
            is_deleted,
            is_active,
            reward_status: status,
            sort_order: 7,
        }
    }

    #[test]
    fn test_to_db_fields_table() {
        assert_eq!(
            to_db_fields(RewardStatus::Active),
            StatusPatch {
                is_deleted: Some(0),
                is_active: Some(1),
                reward_status: Some(PersistedStatus::Active),
            }
        );
        assert_eq!(
            to_db_fields(RewardStatus::Inactive),
            StatusPatch {
                is_deleted: None,
                is_active: Some(0),
                reward_status: Some(PersistedStatus::Inactive),
            }
        );
        assert_eq!(
            to_db_fields(RewardStatus::Suspended),
            StatusPatch {
                is_deleted: None,
                is_active: Some(0),
                reward_status: Some(PersistedStatus::Suspended),
            }
        );
    }

    #[test]
    fn test_inactive_patch_omits_is_deleted_key() {
        let json = serde_json::to_value(to_db_fields(RewardStatus::Inactive)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("is_deleted"));
        assert_eq!(obj.get("is_active").unwrap(), 0);
        assert_eq!(obj.get("reward_status").unwrap(), "inactive");
    }

    #[test]
    fn test_active_round_trip_from_any_prior_state() {
        let priors = [
            row(0, 0, Some(PersistedStatus::Inactive)),
            row(0, 1, Some(PersistedStatus::Suspended)),
            row(0, 0, Some(PersistedStatus::Archived)),
            row(0, 0, None),
        ];
        for mut r in priors {
            apply_mapping(RewardStatus::Active, &mut r);
            assert_eq!(
                from_db_fields(r.is_active, r.reward_status, r.is_deleted),
                RewardStatus::Active
            );
        }
    }

    #[test]
    fn test_suspended_takes_priority_over_is_active() {
        assert_eq!(
            from_db_fields(1, Some(PersistedStatus::Suspended), 0),
            RewardStatus::Suspended
        );
        assert_eq!(
            from_db_fields(0, Some(PersistedStatus::Suspended), 0),
            RewardStatus::Suspended
        );
    }

    #[test]
    fn test_from_db_fields_fallbacks() {
        assert_eq!(
            from_db_fields(1, Some(PersistedStatus::Active), 0),
            RewardStatus::Active
        );
        // flag off wins over the column
        assert_eq!(
            from_db_fields(0, Some(PersistedStatus::Active), 0),
            RewardStatus::Inactive
        );
        assert_eq!(
            from_db_fields(1, Some(PersistedStatus::Archived), 0),
            RewardStatus::Inactive
        );
        assert_eq!(from_db_fields(1, None, 0), RewardStatus::Inactive);
        assert_eq!(
            from_db_columns(1, Some("legacy-flag"), 0),
            RewardStatus::Inactive
        );
        assert_eq!(from_db_columns(1, Some("active"), 0), RewardStatus::Active);
    }

    #[test]
    #[should_panic(expected = "soft-deleted")]
    fn test_from_db_fields_panics_on_deleted_row() {
        from_db_fields(0, Some(PersistedStatus::Inactive), 1);
    }

    #[test]
    fn test_validate_transition() {
        assert_eq!(
            validate_transition(RewardStatus::Suspended, true),
            Err(StatusError::NotAllowedOnCreate(RewardStatus::Suspended))
        );
        assert!(validate_transition(RewardStatus::Suspended, false).is_ok());
        assert!(validate_transition(RewardStatus::Active, true).is_ok());
        assert!(validate_transition(RewardStatus::Inactive, true).is_ok());
    }

    #[test]
    fn test_transition_error_message() {
        let err: AppError = validate_transition(RewardStatus::Suspended, true)
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(err.message, "Cannot create a reward with status 'suspended'");
    }

    #[test]
    fn test_apply_mapping_preserves_untouched_fields() {
        // soft-deleted row being marked inactive keeps its delete flag
        let mut r = row(1, 1, Some(PersistedStatus::Active));
        apply_mapping(RewardStatus::Inactive, &mut r);
        assert_eq!(r.is_deleted, 1);
        assert_eq!(r.is_active, 0);
        assert_eq!(r.reward_status, Some(PersistedStatus::Inactive));
        assert_eq!(r.sort_order, 7);

        let mut patch = StatusPatch {
            is_deleted: Some(1),
            ..Default::default()
        };
        apply_mapping(RewardStatus::Suspended, &mut patch);
        assert_eq!(patch.is_deleted, Some(1));
        assert_eq!(patch.reward_status, Some(PersistedStatus::Suspended));
    }

    #[test]
    fn test_inactive_reads_back_with_stale_flag() {
        // only the reward_status column written back: is_active still 1
        let mut r = row(0, 1, Some(PersistedStatus::Active));
        r.reward_status = to_db_fields(RewardStatus::Inactive).reward_status;
        assert_eq!(
            from_db_fields(r.is_active, r.reward_status, r.is_deleted),
            RewardStatus::Inactive
        );

        let mut r = row(0, 1, Some(PersistedStatus::Active));
        apply_mapping(RewardStatus::Inactive, &mut r);
        assert_eq!(r.is_active, 0);
    }

    #[test]
    fn test_persisted_status_parse() {
        assert_eq!(
            "archived".parse::<PersistedStatus>(),
            Ok(PersistedStatus::Archived)
        );
        assert_eq!(
            "gone".parse::<PersistedStatus>(),
            Err(UnknownStatus("gone".to_string()))
        );
        assert_eq!(PersistedStatus::from(RewardStatus::Suspended), PersistedStatus::Suspended);
    }

    #[test]
    fn test_status_serde() {
        let s: RewardStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(s, RewardStatus::Suspended);
        assert!(serde_json::from_str::<RewardStatus>("\"archived\"").is_err());
    }
}
