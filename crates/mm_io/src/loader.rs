//! Loader: read local files as text and typed run parameters. No network I/O.

use std::fs;
use std::path::Path;

use mm_core::variables::{self, Params};

use crate::IoError;

/// Upper bound on any single input file; guards against pointing at the wrong file.
pub const MAX_INPUT_BYTES: u64 = 512 * 1024 * 1024;

/// Read a UTF-8 file, dropping a leading byte-order mark if present.
pub fn read_text(path: &Path) -> Result<String, IoError> {
    let meta = fs::metadata(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    if meta.len() > MAX_INPUT_BYTES {
        return Err(IoError::Invalid(format!(
            "{}: {} bytes exceeds limit of {MAX_INPUT_BYTES}",
            path.display(),
            meta.len()
        )));
    }
    let text = fs::read_to_string(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Load a params file (every field optional) and check its domains.
pub fn load_params(path: &Path) -> Result<Params, IoError> {
    let text = read_text(path)?;
    let params: Params = serde_json::from_str(&text).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })?;
    variables::validate_domains(&params)
        .map_err(|e| IoError::Invalid(format!("parameter domain error: {e}")))?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_core::variables::{MatchStrategy, Variant};
    use std::io::Write;

    fn file_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f
    }

    #[test]
    fn bom_is_stripped() {
        let f = file_with(b"\xEF\xBB\xBFhello");
        assert_eq!(read_text(f.path()).unwrap(), "hello");
    }

    #[test]
    fn params_override_only_named_fields() {
        let f = file_with(br#"{"variant":"top_up","matcher":"token_set","national_topup_seats":10}"#);
        let p = load_params(f.path()).unwrap();
        assert_eq!(p.variant, Variant::TopUp);
        assert_eq!(p.matcher, MatchStrategy::TokenSet);
        assert_eq!(p.national_topup_seats, 10);
        assert_eq!(p.geometry_id_properties, Params::default().geometry_id_properties);
    }

    #[test]
    fn bad_domain_is_invalid() {
        let f = file_with(br#"{"geometry_id_properties":[" "]}"#);
        assert!(matches!(load_params(f.path()), Err(IoError::Invalid(_))));
    }

    #[test]
    fn unknown_variant_is_json_error() {
        let f = file_with(br#"{"variant":"stv"}"#);
        assert!(matches!(load_params(f.path()), Err(IoError::Json { .. })));
    }
}
