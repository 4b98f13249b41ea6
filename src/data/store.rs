//! CSV persistence for harvested tables.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::info;

use super::{query::ResourceKind, table::Table};

/// `<dir>/<kind>_<suffix>.csv`, or `<dir>/<kind>.csv` without a suffix.
pub fn output_path(dir: &Path, kind: ResourceKind, suffix: &str) -> PathBuf {
    let name = if suffix.is_empty() {
        format!("{kind}.csv")
    } else {
        format!("{kind}_{suffix}.csv")
    };
    dir.join(name)
}

/// Write `table` to its output path, creating `dir` first and replacing any
/// file already there.
pub fn save_table(table: &Table, dir: &Path, kind: ResourceKind, suffix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = output_path(dir, kind, suffix);
    let file = File::create(&path).with_context(|| format!("create {path:?}"))?;
    table
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), rows = table.len(), %kind, "saved csv");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_kind_and_suffix() {
        let dir = Path::new("out");
        assert_eq!(
            output_path(dir, ResourceKind::Submission, "covid"),
            PathBuf::from("out/submission_covid.csv")
        );
        assert_eq!(
            output_path(dir, ResourceKind::Comment, ""),
            PathBuf::from("out/comment.csv")
        );
    }

    #[test]
    fn save_creates_nested_directories_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b");
        let columns = vec!["body".to_string()];

        let first = save_table(&Table::empty(&columns), &dir, ResourceKind::Comment, "x").unwrap();
        assert!(first.exists());
        let second = save_table(&Table::empty(&columns), &dir, ResourceKind::Comment, "x").unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(second).unwrap(), ",body\n");
    }
}
