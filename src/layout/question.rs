//! Output types of page segmentation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::raster::png_data_url;

/// Column of a two-column page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left column
    Left,
    /// Right column
    Right,
}

impl Side {
    /// Lowercase name used in question ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the identifier of the `rank`-th question (1-based) on one side of a
/// page.
///
/// # Examples
///
/// ```
/// use question_extractor::layout::{question_id, Side};
///
/// assert_eq!(question_id(3, Side::Right, 2), "p3_right_q2");
/// ```
pub fn question_id(page: u32, side: Side, rank: usize) -> String {
    format!("p{}_{}_q{}", page, side, rank)
}

/// One cropped question region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier `p{page}_{side}_q{rank}`
    pub id: String,
    /// Page number the question was found on (1-based)
    pub page: u32,
    /// Column the question belongs to
    pub side: Side,
    /// Position within the column, top to bottom (1-based)
    pub rank: usize,
    /// Padded crop box, clamped to the page
    #[serde(rename = "box")]
    pub bbox: Rect,
    /// Merged block before padding
    pub source_bbox: Rect,
    /// PNG-encoded crop
    #[serde(skip)]
    pub image_data: Vec<u8>,
}

impl Question {
    /// Crop as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&self) -> String {
        png_data_url(&self.image_data)
    }

    /// File name used when exporting the crop.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            id: question_id(1, Side::Left, 1),
            page: 1,
            side: Side::Left,
            rank: 1,
            bbox: Rect::new(40, 40, 410, 160),
            source_bbox: Rect::new(50, 50, 400, 150),
            image_data: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Left.to_string(), "left");
        assert_eq!(Side::Right.as_str(), "right");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(sample().file_name(), "p1_left_q1.png");
    }

    #[test]
    fn test_serializes_without_image_bytes() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], "p1_left_q1");
        assert_eq!(json["side"], "left");
        assert_eq!(json["box"]["x2"], 410);
        assert!(json.get("image_data").is_none());
    }

    #[test]
    fn test_data_url() {
        assert!(sample().to_data_url().starts_with("data:image/png;base64,"));
    }
}
