//! Staged file classification.
//!
//! A staging directory holds the deposit's pending repository writes, encoded
//! in filenames parameterized by a namespace prefix `pre`:
//!
//! - `pre[A-Za-z0-9_]+.xml` — an encoded object file; ingesting it creates
//!   one repository object. A trailing `_CMD` marks the metadata datastream.
//! - `pre[A-Za-z0-9_]+.<DSID>.<epoch-millis>.<ext>` — a datastream revision.
//!   `ext == "file"` means the single line of content is a location pointer;
//!   anything else means the raw bytes are the new content.
//!
//! Files matching neither grammar are ignored. All create operations are
//! emitted before any update operation: objects must exist before their
//! datastreams can be revised.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use arkdeposit_core::{AsOf, DatastreamId, DepositError, DepositResult, Fid};

/// One classified repository write, derived from a staged filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DepositOp {
    /// Ingest the file as a new repository object, then verify the named
    /// datastream to obtain the authoritative last-modified timestamp.
    CreateObject {
        fid: Fid,
        dsid: DatastreamId,
        path: PathBuf,
    },
    /// Revise an existing datastream, guarded by the as-of precondition.
    UpdateDatastream {
        fid: Fid,
        dsid: DatastreamId,
        as_of: AsOf,
        payload: UpdatePayload,
    },
}

/// What an update writes: raw file content, or an opaque location pointer
/// the repository should dereference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdatePayload {
    Content(PathBuf),
    Location(String),
}

/// Scan a staging directory into classified operations.
///
/// Output ordering contract: every `CreateObject` precedes every
/// `UpdateDatastream`; order within each group is unspecified.
pub fn scan_staging_dir(dir: &Path, namespace: &str) -> DepositResult<Vec<DepositOp>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        DepositError::classification(format!("cannot read staging dir {}: {e}", dir.display()))
    })?;

    let mut creates = Vec::new();
    let mut updates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            DepositError::classification(format!("cannot read staging dir entry: {e}"))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::debug!(file = %path.display(), "ignoring non-utf8 staged filename");
            continue;
        };

        if let Some((fid, dsid)) = parse_create_name(name, namespace)? {
            tracing::debug!(file = name, fid = %fid, dsid = %dsid, "staged object file");
            creates.push(DepositOp::CreateObject {
                fid,
                dsid,
                path: path.clone(),
            });
        } else if let Some((fid, dsid, as_of, ext)) = parse_update_name(name, namespace)? {
            tracing::debug!(
                file = name, fid = %fid, dsid = %dsid, as_of = %as_of,
                "staged datastream revision"
            );
            let payload = if ext == "file" {
                UpdatePayload::Location(read_location_pointer(&path)?)
            } else {
                UpdatePayload::Content(path.clone())
            };
            updates.push(DepositOp::UpdateDatastream {
                fid,
                dsid,
                as_of,
                payload,
            });
        } else {
            tracing::debug!(file = name, "ignoring unmatched staged file");
        }
    }

    creates.append(&mut updates);
    Ok(creates)
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Derive a FID from a filename base: first `pre_` becomes `pre:`, a trailing
/// `_CMD` marker is stripped.
fn normalize_fid(base: &str, pre: &str) -> DepositResult<Fid> {
    let underscored = format!("{pre}_");
    let prefixed = format!("{pre}:");
    let replaced = base.replacen(&underscored, &prefixed, 1);
    let trimmed = replaced.strip_suffix("_CMD").unwrap_or(&replaced);
    trimmed
        .parse()
        .map_err(|e| DepositError::classification(format!("file '{base}': {e}")))
}

fn parse_create_name(
    name: &str,
    pre: &str,
) -> DepositResult<Option<(Fid, DatastreamId)>> {
    let Some(stem) = name.strip_suffix(".xml") else {
        return Ok(None);
    };
    let Some(rest) = stem.strip_prefix(pre) else {
        return Ok(None);
    };
    if rest.is_empty() || !rest.chars().all(is_word) {
        return Ok(None);
    }
    let dsid = if name.ends_with("_CMD.xml") {
        DatastreamId::cmd()
    } else {
        DatastreamId::obj()
    };
    Ok(Some((normalize_fid(stem, pre)?, dsid)))
}

fn parse_update_name(
    name: &str,
    pre: &str,
) -> DepositResult<Option<(Fid, DatastreamId, AsOf, String)>> {
    let parts: Vec<&str> = name.split('.').collect();
    let [base, dsid, epoch, ext] = parts.as_slice() else {
        return Ok(None);
    };
    let Some(rest) = base.strip_prefix(pre) else {
        return Ok(None);
    };
    if rest.is_empty() || !rest.chars().all(is_word) {
        return Ok(None);
    }
    if dsid.is_empty() || !dsid.chars().all(|c| c.is_ascii_uppercase() || c == '-') {
        return Ok(None);
    }
    if epoch.is_empty() || !epoch.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None);
    }
    if ext.is_empty() || !ext.chars().all(is_word) {
        return Ok(None);
    }

    let fid = normalize_fid(base, pre)?;
    let dsid: DatastreamId = dsid
        .parse()
        .map_err(|e| DepositError::classification(format!("file '{name}': {e}")))?;
    let millis: i64 = epoch.parse().map_err(|_| {
        DepositError::classification(format!("file '{name}': epoch '{epoch}' out of range"))
    })?;
    let as_of = AsOf::from_epoch_millis(millis).map_err(|_| {
        DepositError::classification(format!("file '{name}': epoch '{epoch}' out of range"))
    })?;
    Ok(Some((fid, dsid, as_of, (*ext).to_string())))
}

/// A location-pointer file must hold exactly one line; that line, without its
/// trailing newline, is the location.
fn read_location_pointer(path: &Path) -> DepositResult<String> {
    let text = fs::read_to_string(path).map_err(|e| {
        DepositError::classification(format!("cannot read {}: {e}", path.display()))
    })?;
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return Err(DepositError::classification(format!(
            "location file {} should contain exactly one line, found none",
            path.display()
        )));
    };
    if lines.next().is_some() {
        return Err(DepositError::classification(format!(
            "location file {} should contain exactly one line, found more",
            path.display()
        )));
    }
    Ok(first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs::File;
    use std::io::Write;

    fn touch(dir: &Path, name: &str, content: &[u8]) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(content).unwrap();
    }

    #[test]
    fn object_file_yields_create_with_obj_datastream() {
        let (fid, dsid) = parse_create_name("lat_foo.xml", "lat").unwrap().unwrap();
        assert_eq!(fid.as_str(), "lat:foo");
        assert_eq!(dsid, DatastreamId::obj());
    }

    #[test]
    fn cmd_marker_selects_cmd_datastream_and_is_stripped_from_fid() {
        let (fid, dsid) = parse_create_name("lat_foo_CMD.xml", "lat").unwrap().unwrap();
        assert_eq!(fid.as_str(), "lat:foo");
        assert_eq!(dsid, DatastreamId::cmd());
    }

    #[test]
    fn only_first_prefix_underscore_is_replaced() {
        let (fid, _) = parse_create_name("lat_a_lat_b.xml", "lat").unwrap().unwrap();
        assert_eq!(fid.as_str(), "lat:a_lat_b");
    }

    #[test]
    fn update_name_derives_all_segments() {
        let (fid, dsid, as_of, ext) = parse_update_name("lat_foo.OBJ.1700000000000.file", "lat")
            .unwrap()
            .unwrap();
        assert_eq!(fid.as_str(), "lat:foo");
        assert_eq!(dsid, DatastreamId::obj());
        assert_eq!(as_of.epoch_millis(), 1_700_000_000_000);
        assert_eq!(ext, "file");
    }

    #[test]
    fn update_name_near_misses_are_ignored() {
        // wrong segment count
        assert!(parse_update_name("lat_foo.OBJ.170.x.y", "lat").unwrap().is_none());
        assert!(parse_update_name("lat_foo.OBJ.170", "lat").unwrap().is_none());
        // lowercase datastream id
        assert!(parse_update_name("lat_foo.obj.170.bin", "lat").unwrap().is_none());
        // non-digit epoch
        assert!(parse_update_name("lat_foo.OBJ.17x0.bin", "lat").unwrap().is_none());
        // foreign prefix
        assert!(parse_update_name("other_foo.OBJ.170.bin", "lat").unwrap().is_none());
    }

    #[test]
    fn create_name_near_misses_are_ignored() {
        assert!(parse_create_name("other_foo.xml", "lat").unwrap().is_none());
        assert!(parse_create_name("lat_foo.txt", "lat").unwrap().is_none());
        assert!(parse_create_name("lat.xml", "lat").unwrap().is_none());
        assert!(parse_create_name("lat_foo.bar.xml", "lat").unwrap().is_none());
    }

    #[test]
    fn scan_orders_creates_before_updates() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "lat_b.OBJ.1700000000000.bin", b"bytes");
        touch(dir.path(), "lat_a.xml", b"<foxml/>");
        touch(dir.path(), "notes.txt", b"ignored");

        let ops = scan_staging_dir(dir.path(), "lat").unwrap();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DepositOp::CreateObject { .. }));
        assert!(matches!(ops[1], DepositOp::UpdateDatastream { .. }));
    }

    #[test]
    fn location_pointer_file_with_one_line_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            "lat_foo.OBJ.1700000000000.file",
            b"file:///data/x.bin\n",
        );

        let ops = scan_staging_dir(dir.path(), "lat").unwrap();
        let DepositOp::UpdateDatastream { fid, dsid, as_of, payload } = &ops[0] else {
            panic!("expected an update op");
        };
        assert_eq!(fid.as_str(), "lat:foo");
        assert_eq!(*dsid, DatastreamId::obj());
        assert_eq!(as_of.epoch_millis(), 1_700_000_000_000);
        assert_eq!(
            *payload,
            UpdatePayload::Location("file:///data/x.bin".to_string())
        );
    }

    #[test]
    fn location_pointer_file_with_zero_lines_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "lat_foo.OBJ.1700000000000.file", b"");

        let err = scan_staging_dir(dir.path(), "lat").unwrap_err();
        assert!(matches!(err, DepositError::Classification(_)));
    }

    #[test]
    fn location_pointer_file_with_two_lines_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            "lat_foo.OBJ.1700000000000.file",
            b"file:///a\nfile:///b\n",
        );

        let err = scan_staging_dir(dir.path(), "lat").unwrap_err();
        assert!(matches!(err, DepositError::Classification(_)));
    }

    #[test]
    fn content_update_keeps_the_file_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "lat_foo.TN.1700000000000.jpg", b"jpegbytes");

        let ops = scan_staging_dir(dir.path(), "lat").unwrap();
        let DepositOp::UpdateDatastream { payload, .. } = &ops[0] else {
            panic!("expected an update op");
        };
        assert_eq!(
            *payload,
            UpdatePayload::Content(dir.path().join("lat_foo.TN.1700000000000.jpg"))
        );
    }

    proptest! {
        #[test]
        fn epoch_millis_survive_name_parsing(millis in 0i64..4_102_444_800_000) {
            let name = format!("lat_foo.OBJ.{millis}.bin");
            let (_, _, as_of, _) = parse_update_name(&name, "lat").unwrap().unwrap();
            prop_assert_eq!(as_of.epoch_millis(), millis);
        }

        #[test]
        fn word_stems_always_classify_as_creates(stem in "[A-Za-z0-9][A-Za-z0-9_]{0,11}") {
            let name = format!("lat_{stem}.xml");
            let parsed = parse_create_name(&name, "lat").unwrap();
            prop_assert!(parsed.is_some());
        }
    }
}
