//! Property-based tests for block merging
//!
//! Tests invariants:
//! - Every input block is contained in some merged block
//! - Merging an already merged set changes nothing
//! - Merged blocks are pairwise farther apart than the gap thresholds
//! - Column ordering and size filtering hold for any block set

use proptest::prelude::*;
use question_extractor::geometry::Rect;
use question_extractor::layout::merge_blocks;
use question_extractor::QuestionExtractor;

// ============================================================================
// Strategies
// ============================================================================

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (0u32..2000, 0u32..3000, 1u32..400, 1u32..200)
        .prop_map(|(x, y, w, h)| Rect::from_xywh(x, y, w, h))
}

fn blocks_strategy() -> impl Strategy<Value = Vec<Rect>> {
    prop::collection::vec(rect_strategy(), 0..24)
}

fn gaps_strategy() -> impl Strategy<Value = (u32, u32)> {
    (0u32..200, 0u32..80)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn merged_blocks_contain_inputs(blocks in blocks_strategy(), (h, v) in gaps_strategy()) {
        let merged = merge_blocks(&blocks, h, v);
        for block in &blocks {
            prop_assert!(merged.iter().any(|m| m.contains(block)));
        }
    }

    #[test]
    fn merge_never_grows_count(blocks in blocks_strategy(), (h, v) in gaps_strategy()) {
        let merged = merge_blocks(&blocks, h, v);
        prop_assert!(merged.len() <= blocks.len());
    }

    #[test]
    fn merge_is_idempotent(blocks in blocks_strategy(), (h, v) in gaps_strategy()) {
        let once = merge_blocks(&blocks, h, v);
        let twice = merge_blocks(&once, h, v);
        prop_assert_eq!(&twice, &once);
    }

    #[test]
    fn merged_blocks_are_separated(blocks in blocks_strategy(), (h, v) in gaps_strategy()) {
        let merged = merge_blocks(&blocks, h, v);
        for (i, a) in merged.iter().enumerate() {
            for b in &merged[i + 1..] {
                prop_assert!(!a.is_near(b, h, v));
            }
        }
    }

    #[test]
    fn merge_is_deterministic(blocks in blocks_strategy(), (h, v) in gaps_strategy()) {
        prop_assert_eq!(merge_blocks(&blocks, h, v), merge_blocks(&blocks, h, v));
    }

    #[test]
    fn column_blocks_sorted_and_filtered(blocks in blocks_strategy()) {
        let extractor = QuestionExtractor::default();
        let config = extractor.config().clone();
        let column = extractor.column_blocks(&blocks);

        for pair in column.windows(2) {
            prop_assert!(pair[0].y1 <= pair[1].y1);
        }
        for block in &column {
            prop_assert!(block.width() >= config.min_width);
            prop_assert!(block.height() >= config.min_height);
        }
    }
}
