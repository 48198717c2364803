use crate::error::{Error, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Find `name` inside `dir`, ignoring ASCII case.
///
/// The exact spelling is tried first; otherwise the directory is scanned. Returns
/// `None` if `dir` does not exist or holds no matching entry.
pub fn find_case_insensitive(dir: &Utf8Path, name: &str) -> Option<Utf8PathBuf> {
    let exact = dir.join(name);
    if exact.as_std_path().exists() {
        return Some(exact);
    }

    let entries = std::fs::read_dir(dir.as_std_path()).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .find(|entry_name| entry_name.eq_ignore_ascii_case(name))
        .map(|entry_name| dir.join(entry_name))
}

/// Join a validated relative path onto `root`, matching each existing component
/// case-insensitively. Components that do not exist yet keep their given spelling.
pub fn resolve_relative(root: &Utf8Path, relative: &Utf8Path) -> Utf8PathBuf {
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        if let Utf8Component::Normal(part) = component {
            resolved = find_case_insensitive(&resolved, part).unwrap_or_else(|| resolved.join(part));
        }
    }
    resolved
}

/// Normalize a config-supplied path (`modules\danm13.mod`, `Override`, `.`) and
/// reject anything that could escape the directory it is joined to.
pub fn validate_relative(path: &str) -> Result<Utf8PathBuf> {
    let normalized = path.trim().replace('\\', "/");
    let candidate = Utf8PathBuf::from(normalized.as_str());

    let mut clean = Utf8PathBuf::new();
    for component in candidate.components() {
        match component {
            Utf8Component::Normal(part) => clean.push(part),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                return Err(Error::InvalidTarget(path.to_string()));
            }
        }
    }
    Ok(clean)
}

/// Check that a config-supplied file name is a single path component.
pub fn validate_file_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(Error::InvalidTarget(name.to_string()));
    }
    Ok(trimmed)
}

/// Make `path` absolute without touching the filesystem.
pub fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let absolute = std::path::absolute(path.as_std_path())?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|p| Error::InvalidTarget(p.to_string_lossy().into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_relative() {
        assert_eq!(validate_relative("Override").unwrap(), "Override");
        assert_eq!(
            validate_relative("modules\\danm13.mod").unwrap(),
            "modules/danm13.mod"
        );
        assert_eq!(validate_relative(".").unwrap(), "");
        assert_eq!(validate_relative("./Override/").unwrap(), "Override");
        assert!(validate_relative("../Override").is_err());
        assert!(validate_relative("Override/../../x").is_err());
        assert!(validate_relative("/etc").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert_eq!(validate_file_name("creature.utc").unwrap(), "creature.utc");
        assert_eq!(validate_file_name(" k_act.nss ").unwrap(), "k_act.nss");
        assert!(validate_file_name("../../escaped.tga").is_err());
        assert!(validate_file_name("Override/creature.utc").is_err());
        assert!(validate_file_name("..\\dialog.tlk").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn test_find_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join("Dialog.TLK"), b"").unwrap();

        assert_eq!(
            find_case_insensitive(&root, "dialog.tlk").unwrap(),
            root.join("Dialog.TLK")
        );
        assert!(find_case_insensitive(&root, "missing.tlk").is_none());
        assert!(find_case_insensitive(&root.join("nope"), "dialog.tlk").is_none());
    }

    #[test]
    fn test_resolve_relative_keeps_unknown_components() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::create_dir(root.join("Modules")).unwrap();

        assert_eq!(
            resolve_relative(&root, Utf8Path::new("modules/danm13.mod")),
            root.join("Modules").join("danm13.mod")
        );
        assert_eq!(
            resolve_relative(&root, Utf8Path::new("Override")),
            root.join("Override")
        );
    }
}
