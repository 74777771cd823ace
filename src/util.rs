use std::io::Write;
use std::path::Path;

/// Write `content` to `path` atomically: temp file in the same directory, then rename.
pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let tmp_path = parent.join(format!(".{}.tmp", file_name));

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Capitalize the first character: "email" → "Email".
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        atomic_write_str(&path, "one").unwrap();
        atomic_write_str(&path, "two").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        assert!(!dir.path().join("nested").join(".out.txt.tmp").exists());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("crm"), "Crm");
        assert_eq!(capitalize("calendar"), "Calendar");
        assert_eq!(capitalize(""), "");
    }
}
