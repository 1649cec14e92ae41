//! Strongly-typed identifiers used across the deposit domain.
//!
//! Identifier values are immutable once constructed; entities hold them and
//! swap whole values, they never mutate one in place.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DepositError;

/// Repository-native identifier (`namespace ':' name`, e.g. `lat:foo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fid(String);

/// Persistent external identifier, handle-resolver based
/// (`hdl:...` or `http(s)://hdl.handle.net/...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pid(String);

/// Named datastream of a repository object (`OBJ`, `CMD`, `TN`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatastreamId(String);

macro_rules! impl_token_newtype {
    ($t:ty, $name:literal, $validate:path) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DepositError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl FromStr for $t {
            type Err = DepositError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $validate(s)
                    .map(|()| Self(s.to_string()))
                    .map_err(|e| DepositError::invalid_id(format!("{}: {}", $name, e)))
            }
        }
    };
}

impl_token_newtype!(Fid, "Fid", validate_fid);
impl_token_newtype!(Pid, "Pid", validate_pid);
impl_token_newtype!(DatastreamId, "DatastreamId", validate_dsid);

fn validate_fid(s: &str) -> Result<(), String> {
    let Some((ns, name)) = s.split_once(':') else {
        return Err(format!("'{s}' has no namespace prefix"));
    };
    if ns.is_empty() || !ns.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("'{s}' has an invalid namespace"));
    }
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(format!("'{s}' has an invalid object name"));
    }
    Ok(())
}

fn validate_pid(s: &str) -> Result<(), String> {
    let rest = s
        .strip_prefix("hdl:")
        .or_else(|| s.strip_prefix("http://hdl.handle.net/"))
        .or_else(|| s.strip_prefix("https://hdl.handle.net/"));
    match rest {
        Some(r) if !r.is_empty() => Ok(()),
        _ => Err(format!("'{s}' is not a handle identifier")),
    }
}

fn validate_dsid(s: &str) -> Result<(), String> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_uppercase() || c == '-') {
        return Err(format!("'{s}' is not an uppercase datastream id"));
    }
    Ok(())
}

impl Fid {
    /// Namespace prefix (the part before the first `:`).
    pub fn namespace(&self) -> &str {
        // Validated at construction: the separator is always present.
        self.0.split(':').next().unwrap_or("")
    }

    /// Object name (the part after the first `:`).
    pub fn name(&self) -> &str {
        self.0.split_once(':').map(|(_, n)| n).unwrap_or("")
    }

    /// Whether this FID belongs to the given reserved repository namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace() == namespace
    }
}

impl DatastreamId {
    pub fn obj() -> Self {
        Self("OBJ".to_string())
    }

    pub fn cmd() -> Self {
        Self("CMD".to_string())
    }

    /// Whether updates to this datastream define the object's identity.
    ///
    /// Only `CMD` and `OBJ` trigger identifier completion on the SIP model.
    pub fn is_identity_defining(&self) -> bool {
        self.0 == "CMD" || self.0 == "OBJ"
    }
}

/// Last-modified time of a datastream, used as an optimistic-concurrency
/// precondition: a staged update carries the as-of it was computed against
/// and the repository must reject the write if remote state has moved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AsOf(DateTime<Utc>);

impl AsOf {
    /// Construct from epoch milliseconds (the staged-filename encoding).
    pub fn from_epoch_millis(millis: i64) -> Result<Self, DepositError> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| DepositError::invalid_id(format!("AsOf: {millis} is out of range")))
    }

    /// Epoch milliseconds; round-trips exactly with `from_epoch_millis`.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for AsOf {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for AsOf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fid_parses_namespace_and_name() {
        let fid: Fid = "lat:foo_bar".parse().unwrap();
        assert_eq!(fid.namespace(), "lat");
        assert_eq!(fid.name(), "foo_bar");
        assert_eq!(fid.as_str(), "lat:foo_bar");
        assert!(fid.in_namespace("lat"));
        assert!(!fid.in_namespace("islandora"));
    }

    #[test]
    fn fid_rejects_malformed_tokens() {
        assert!("latfoo".parse::<Fid>().is_err());
        assert!(":foo".parse::<Fid>().is_err());
        assert!("lat:".parse::<Fid>().is_err());
        assert!("lat:with space".parse::<Fid>().is_err());
    }

    #[test]
    fn pid_accepts_handle_forms() {
        assert!("hdl:1839/00-0000-0000".parse::<Pid>().is_ok());
        assert!("https://hdl.handle.net/1839/00-0000-0000".parse::<Pid>().is_ok());
        assert!("http://hdl.handle.net/1839/x".parse::<Pid>().is_ok());
    }

    #[test]
    fn pid_rejects_non_handles() {
        assert!("lat:foo".parse::<Pid>().is_err());
        assert!("hdl:".parse::<Pid>().is_err());
        assert!("https://example.com/1839/x".parse::<Pid>().is_err());
    }

    #[test]
    fn dsid_validates_alphabet() {
        assert!("OBJ".parse::<DatastreamId>().is_ok());
        assert!("SOME-DS".parse::<DatastreamId>().is_ok());
        assert!("obj".parse::<DatastreamId>().is_err());
        assert!("".parse::<DatastreamId>().is_err());
    }

    #[test]
    fn only_cmd_and_obj_are_identity_defining() {
        assert!(DatastreamId::obj().is_identity_defining());
        assert!(DatastreamId::cmd().is_identity_defining());
        let tn: DatastreamId = "TN".parse().unwrap();
        assert!(!tn.is_identity_defining());
    }

    #[test]
    fn asof_round_trips_epoch_millis() {
        let asof = AsOf::from_epoch_millis(1_700_000_000_000).unwrap();
        assert_eq!(asof.epoch_millis(), 1_700_000_000_000);
    }

    #[test]
    fn identifiers_serialize_as_plain_strings() {
        let fid: Fid = "lat:foo".parse().unwrap();
        assert_eq!(serde_json::to_string(&fid).unwrap(), "\"lat:foo\"");
        let back: Fid = serde_json::from_str("\"lat:foo\"").unwrap();
        assert_eq!(back, fid);
        assert!(serde_json::from_str::<Fid>("\"nonsense\"").is_err());
    }

    proptest! {
        #[test]
        fn asof_epoch_millis_round_trip(millis in 0i64..4_102_444_800_000) {
            let asof = AsOf::from_epoch_millis(millis).unwrap();
            prop_assert_eq!(asof.epoch_millis(), millis);
        }
    }
}
