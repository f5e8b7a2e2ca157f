//! Checks that `tests/unit` mirrors `src` file for file

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const SRC_DIR: &str = "src";
    const UNIT_DIR: &str = "tests/unit";

    // Crate roots and module declarations have no behavior of their own
    fn is_structural(relative: &str) -> bool {
        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        matches!(file_name, "main.rs" | "lib.rs" | "mod.rs")
    }

    fn mirrored_trees() -> (BTreeSet<String>, BTreeSet<String>) {
        let src = collect_relative_paths(Path::new(SRC_DIR)).expect("src directory is readable");
        let unit = collect_relative_paths(Path::new(UNIT_DIR)).unwrap_or_default();
        (src, unit)
    }

    #[test]
    fn test_every_src_file_has_unit_tests() {
        let (src, unit) = mirrored_trees();
        let missing: Vec<String> = src
            .iter()
            .filter(|path| !is_structural(path) && !unit.contains(*path))
            .map(|path| format!("  - src/{path} -> {UNIT_DIR}/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source files without unit test counterparts:\n{}",
            missing.join("\n")
        );
    }

    #[test]
    fn test_every_unit_test_has_src_counterpart() {
        let (src, unit) = mirrored_trees();
        let orphaned: Vec<String> = unit
            .iter()
            .filter(|path| !is_structural(path) && !src.contains(*path))
            .map(|path| format!("  - {UNIT_DIR}/{path} -> src/{path} (missing)"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test files without a source counterpart:\n{}",
            orphaned.join("\n")
        );
    }

    #[test]
    fn test_every_test_file_contains_tests() {
        let mut files = Vec::new();
        collect_rust_files(Path::new("tests"), &mut files).expect("tests directory is readable");

        let empty: Vec<String> = files
            .iter()
            .filter(|path| {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                !matches!(name, "main.rs" | "mod.rs")
            })
            .filter(|path| {
                fs::read_to_string(path).is_ok_and(|content| !content.contains("#[test]"))
            })
            .map(|path| format!("  - {}", path.display()))
            .collect();

        assert!(
            empty.is_empty(),
            "Test files without any #[test] function:\n{}",
            empty.join("\n")
        );
    }

    // Directories and `.rs` files below `base`, relative to it with `/` separators
    fn collect_relative_paths(base: &Path) -> io::Result<BTreeSet<String>> {
        let mut entries = Vec::new();
        walk(base, &mut entries)?;

        Ok(entries
            .iter()
            .filter_map(|path| path.strip_prefix(base).ok())
            .map(|relative| relative.to_string_lossy().replace('\\', "/"))
            .collect())
    }

    fn collect_rust_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
        let mut entries = Vec::new();
        walk(dir, &mut entries)?;
        files.extend(entries.into_iter().filter(|path| path.is_file()));
        Ok(())
    }

    fn walk(dir: &Path, entries: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                entries.push(path.clone());
                walk(&path, entries)?;
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                entries.push(path);
            }
        }
        Ok(())
    }
}
