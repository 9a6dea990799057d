//! Scripted demonstrations that snapshot the tree as DOT files.
//!
//! The grid demo searches a 15-node tree of even keys 2..=30 for each key
//! 1..=31 (or for one chosen key).  By default every probe starts from
//! the same nearly-perfect tree; in cumulative mode the tree starts as a
//! descending-insert chain and each probe sees the previous probes'
//! splaying.  The sequential demo builds a 1..=n chain and shows how a
//! few lookups pull its height down.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::tree::SplayTree;
use crate::types::{DriverError, GRID_KEYS, GRID_PROBE_MAX, SEQUENTIAL_SCHEDULE};

/// How the grid demo's starting tree is built and whether it is rebuilt
/// between probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridMode {
    /// Insert [`GRID_KEYS`] leaves-first; rebuild before every probe.
    Fresh,
    /// Insert 30, 28, ..., 2; never rebuild.
    Cumulative,
}

/// Outcome of one grid probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Probe {
    pub key: i64,
    pub found: bool,
    /// Root key after the search.
    pub root: i64,
    pub dot: PathBuf,
}

/// Outcome of one lookup of the sequential demo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequentialStep {
    pub key: i64,
    pub height: usize,
    pub dot: PathBuf,
}

fn grid_tree(mode: GridMode) -> Result<SplayTree<i64, ()>, DriverError> {
    let mut tree = SplayTree::new();
    match mode {
        GridMode::Fresh => {
            for &k in GRID_KEYS.iter() {
                tree.insert(k, ())?;
            }
        }
        GridMode::Cumulative => {
            for k in (1..=GRID_PROBE_MAX / 2).rev().map(|j| 2 * j) {
                tree.insert(k, ())?;
            }
        }
    }
    tree.health_check()?;
    Ok(tree)
}

/// Search `tree` for `key`, save the result and check it for sanity.
fn probe(tree: &mut SplayTree<i64, ()>, key: i64, dot: PathBuf) -> Result<Probe, DriverError> {
    let hit = tree.find(&key).map(|(k, _)| *k);
    tree.save_dot(&dot)?;
    tree.health_check()?;

    if let Some(k) = hit {
        if k != key {
            return Err(DriverError::Unexpected(format!(
                "searched for key {} but found {}",
                key, k
            )));
        }
    }
    let root = match tree.root() {
        Some((k, _)) => *k,
        None => return Err(DriverError::Unexpected("grid tree is empty".to_string())),
    };
    debug!(key, found = hit.is_some(), root, "probed");
    Ok(Probe {
        key,
        found: hit.is_some(),
        root,
        dot,
    })
}

/// Build the grid tree, save it as `grid.dot`, then search for `key`
/// and save the splayed tree as `probe.dot`.
pub fn grid_single(out_dir: &Path, mode: GridMode, key: i64) -> Result<Probe, DriverError> {
    let mut tree = grid_tree(mode)?;
    tree.save_dot(out_dir.join("grid.dot"))?;
    probe(&mut tree, key, out_dir.join("probe.dot"))
}

/// Probe every key from 1 through [`GRID_PROBE_MAX`].  Each probe is saved
/// as `probe_1NN.dot`.  Even keys must be found and odd keys must not.
pub fn grid_sweep(out_dir: &Path, mode: GridMode) -> Result<Vec<Probe>, DriverError> {
    let mut tree = grid_tree(mode)?;
    tree.save_dot(out_dir.join("grid.dot"))?;

    let mut probes = Vec::with_capacity(GRID_PROBE_MAX as usize);
    for key in 1..=GRID_PROBE_MAX {
        let dot = out_dir.join(format!("probe_{}.dot", key + 100));
        let p = probe(&mut tree, key, dot)?;
        let even = key % 2 == 0;
        if p.found != even {
            return Err(DriverError::Unexpected(if even {
                format!("failed to find key {}", key)
            } else {
                format!("found nonexistent key {}", key)
            }));
        }
        probes.push(p);
        if mode == GridMode::Fresh {
            tree = grid_tree(mode)?;
        }
    }
    info!(probes = probes.len(), ?mode, "grid sweep done");
    Ok(probes)
}

/// Insert 1..=`count`, save `sequential_a.dot`, then look up each key of
/// [`SEQUENTIAL_SCHEDULE`] in turn, saving `sequential_b.dot` onward.
/// Every lookup must succeed and the size must not change.
pub fn sequential(out_dir: &Path, count: i64) -> Result<Vec<SequentialStep>, DriverError> {
    let mut tree = SplayTree::new();
    for k in 1..=count {
        tree.insert(k, ())?;
    }
    let expected = tree.len();
    tree.save_dot(out_dir.join("sequential_a.dot"))?;

    let mut steps = Vec::with_capacity(SEQUENTIAL_SCHEDULE.len());
    for (i, &key) in SEQUENTIAL_SCHEDULE.iter().enumerate() {
        if !tree.contains(&key) {
            return Err(DriverError::Unexpected(format!("sought key {}, not found", key)));
        }
        if tree.len() != expected {
            return Err(DriverError::Unexpected(format!(
                "size changed from {} to {} during lookup of {}",
                expected,
                tree.len(),
                key
            )));
        }
        let dot = out_dir.join(format!("sequential_{}.dot", (b'b' + i as u8) as char));
        tree.save_dot(&dot)?;
        let height = tree.height();
        debug!(key, height, "sequential lookup");
        steps.push(SequentialStep { key, height, dot });
    }
    tree.health_check()?;
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_grid_is_nearly_perfect() {
        let tree = grid_tree(GridMode::Fresh).unwrap();
        assert_eq!(
            tree.sketch(),
            "(16 (8 (4 2 6) (12 10 14)) (24 (20 18 22) (26 . (28 . 30))))"
        );
        assert_eq!(tree.height(), 5);
    }

    #[test]
    fn cumulative_grid_starts_as_a_chain() {
        let tree = grid_tree(GridMode::Cumulative).unwrap();
        assert_eq!(tree.len(), 15);
        assert_eq!(tree.height(), 15);
        assert_eq!(tree.root().map(|(k, _)| *k), Some(2));
    }
}
