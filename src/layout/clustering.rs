//! Proximity clustering of candidate blocks.
//!
//! Blocks are nodes of an undirected graph, joined when their rectangles lie
//! within the configured horizontal and vertical gaps of each other. Each
//! connected component becomes one merged block covering all its members.

use std::collections::VecDeque;

use crate::geometry::Rect;

/// Group blocks into connected components of the proximity graph.
///
/// Components are returned in order of their lowest member index, and the
/// members of each component in breadth-first visiting order.
///
/// # Examples
///
/// ```
/// use question_extractor::geometry::Rect;
/// use question_extractor::layout::clustering::cluster_blocks;
///
/// let blocks = vec![
///     Rect::new(0, 0, 100, 40),
///     Rect::new(0, 500, 100, 540),
///     Rect::new(0, 60, 100, 100),
/// ];
/// assert_eq!(cluster_blocks(&blocks, 150, 45), vec![vec![0, 2], vec![1]]);
/// ```
pub fn cluster_blocks(blocks: &[Rect], h_gap: u32, v_gap: u32) -> Vec<Vec<usize>> {
    if blocks.is_empty() {
        return vec![];
    }

    let n = blocks.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if blocks[i].is_near(&blocks[j], h_gap, v_gap) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let mut visited = vec![false; n];
    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);

        let mut cluster = Vec::new();
        while let Some(current) = queue.pop_front() {
            cluster.push(current);
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        clusters.push(cluster);
    }

    clusters
}

/// Merge blocks into one bounding box per proximity cluster.
///
/// Each output box is the coordinate-wise min/max union of its cluster's
/// members, so it contains every block that contributed to it. A union can
/// reach a block none of its members were near, so clustering repeats on the
/// merged boxes until the count stops shrinking. No two output boxes are near
/// each other, and merging the output again returns it unchanged.
///
/// # Examples
///
/// ```
/// use question_extractor::geometry::Rect;
/// use question_extractor::layout::clustering::merge_blocks;
///
/// let merged = merge_blocks(&[Rect::new(50, 50, 200, 100), Rect::new(210, 55, 360, 105)], 150, 45);
/// assert_eq!(merged, vec![Rect::new(50, 50, 360, 105)]);
/// ```
pub fn merge_blocks(blocks: &[Rect], h_gap: u32, v_gap: u32) -> Vec<Rect> {
    let mut merged = merge_once(blocks, h_gap, v_gap);
    let mut passes = 1;
    loop {
        let next = merge_once(&merged, h_gap, v_gap);
        if next.len() == merged.len() {
            break;
        }
        merged = next;
        passes += 1;
    }
    if passes > 1 {
        log::trace!("Merging settled after {} passes", passes);
    }
    merged
}

/// One clustering pass: union the members of each connected component.
fn merge_once(blocks: &[Rect], h_gap: u32, v_gap: u32) -> Vec<Rect> {
    cluster_blocks(blocks, h_gap, v_gap)
        .into_iter()
        .map(|members| {
            members[1..]
                .iter()
                .fold(blocks[members[0]], |acc, &i| acc.union(&blocks[i]))
        })
        .collect()
}
