//! Enumeration of hiddev device nodes

use std::fs;
use std::path::PathBuf;

use tracing::debug;

/// Directories the kernel places hiddev nodes in, depending on udev rules
pub const HIDDEV_DIRS: [&str; 2] = ["/dev/usb", "/dev"];

/// All `hiddevN` nodes present, sorted by node number
///
/// Nodes are not opened; any of them may belong to a non-Oak device.
pub fn candidate_nodes() -> Vec<PathBuf> {
    let mut nodes: Vec<(u32, PathBuf)> = HIDDEV_DIRS
        .iter()
        .filter_map(|dir| fs::read_dir(dir).ok())
        .flat_map(|entries| entries.filter_map(Result::ok))
        .filter_map(|entry| {
            let name = entry.file_name();
            let number = node_number(name.to_str()?)?;
            Some((number, entry.path()))
        })
        .collect();
    nodes.sort();
    nodes.dedup_by(|a, b| a.1 == b.1);
    debug!("Found {} hiddev nodes", nodes.len());
    nodes.into_iter().map(|(_, path)| path).collect()
}

/// `N` of a `hiddevN` file name
fn node_number(file_name: &str) -> Option<u32> {
    file_name.strip_prefix("hiddev")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_number() {
        assert_eq!(node_number("hiddev0"), Some(0));
        assert_eq!(node_number("hiddev12"), Some(12));
        assert_eq!(node_number("hidraw0"), None);
        assert_eq!(node_number("hiddev"), None);
        assert_eq!(node_number("hiddevX"), None);
    }

    #[test]
    fn test_candidates_are_hiddev_nodes() {
        for path in candidate_nodes() {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("hiddev"), "{name}");
        }
    }
}
