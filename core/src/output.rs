use std::fs;
use std::path::Path;

use cleanip_common::error::Result;

use crate::selection::Selection;

const SEPARATOR: &str = ",";

/// Joins the chosen addresses into one comma-separated line, ordered by group key.
pub fn format_selection(selection: &Selection) -> String {
    selection
        .values()
        .map(|addr| addr.as_str())
        .collect::<Vec<&str>>()
        .join(SEPARATOR)
}

/// Replaces the contents of `path` with the formatted selection.
pub fn write_selection(path: &Path, selection: &Selection) -> Result<()> {
    fs::write(path, format_selection(selection))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanip_common::network::subnet::SubnetKey;

    fn selection(pairs: &[(&str, &str)]) -> Selection {
        pairs
            .iter()
            .map(|(key, addr)| (SubnetKey::new(*key), addr.parse().unwrap()))
            .collect()
    }

    #[test]
    fn joins_with_commas() {
        let picked = selection(&[("192", "192.168.1.1"), ("10", "10.0.0.1")]);
        assert_eq!(format_selection(&picked), "10.0.0.1,192.168.1.1");
    }

    #[test]
    fn empty_selection_is_an_empty_line() {
        assert_eq!(format_selection(&Selection::new()), "");
    }

    #[test]
    fn overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        fs::write(&path, "stale,content,here").unwrap();

        write_selection(&path, &selection(&[("1", "1.1.1.1")])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1.1.1.1");
    }
}
