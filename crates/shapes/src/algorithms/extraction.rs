use std::collections::VecDeque;

use crate::{
    traits::ComponentExtractor,
    types::{BinaryMask, Blob},
};

/// The 8 neighbor offsets, excluding `(0, 0)`
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Breadth-first flood fill over 8-connected foreground pixels.
#[derive(Debug, Clone, Default)]
pub struct FloodFillExtractor;

impl ComponentExtractor for FloodFillExtractor {
    fn extract_components(&self, mask: &BinaryMask) -> Vec<Blob> {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let data = mask.data();

        let mut visited = vec![false; width * height];
        let mut queue = VecDeque::new();
        let mut blobs = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                if data[idx] != 1 || visited[idx] {
                    continue;
                }

                visited[idx] = true;
                queue.push_back((x as i64, y as i64));
                let mut pixels = Vec::new();

                while let Some((cx, cy)) = queue.pop_front() {
                    pixels.push((cx as u32, cy as u32));

                    for (dx, dy) in NEIGHBOR_OFFSETS {
                        let (nx, ny) = (cx + dx, cy + dy);
                        if !mask.is_foreground(nx, ny) {
                            continue;
                        }
                        let nidx = ny as usize * width + nx as usize;
                        if !visited[nidx] {
                            visited[nidx] = true;
                            queue.push_back((nx, ny));
                        }
                    }
                }

                blobs.push(Blob::new(mask.width(), mask.height(), pixels));
            }
        }

        blobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::{drawing::{draw_filled_circle_mut, draw_filled_rect_mut}, rect::Rect};
    use crate::{algorithms::FixedThresholdBinarizer, traits::Binarizer};

    fn mask_from_rows(rows: &[&str]) -> BinaryMask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        BinaryMask::from_fn(width, height, 0, |x, y| rows[y as usize].as_bytes()[x as usize] == b'#')
    }

    #[test]
    fn test_diagonal_neighbors_join_one_blob() {
        let mask = mask_from_rows(&[
            "#....",
            ".#...",
            "..#..",
            "....#",
        ]);
        let blobs = FloodFillExtractor.extract_components(&mask);
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].len(), 3);
        assert_eq!(blobs[1].pixels(), &[(4, 3)]);
    }

    #[test]
    fn test_blobs_ordered_by_first_pixel() {
        let mask = mask_from_rows(&[
            "....##",
            "##..##",
            "##....",
            "...#..",
        ]);
        let blobs = FloodFillExtractor.extract_components(&mask);
        let starts: Vec<_> = blobs.iter().map(|b| b.start_pixel().unwrap()).collect();
        assert_eq!(starts, vec![(4, 0), (0, 1), (3, 3)]);
        // (3, 3) sits two columns away from the left blob
        assert_eq!(blobs[1].len(), 4);
        assert_eq!(blobs[2].len(), 1);
    }

    #[test]
    fn test_partition_of_foreground() {
        let mut image = GrayImage::from_pixel(120, 90, Luma([255u8]));
        draw_filled_rect_mut(&mut image, Rect::at(5, 5).of_size(30, 20), Luma([0u8]));
        draw_filled_circle_mut(&mut image, (80, 40), 18, Luma([0u8]));
        draw_filled_rect_mut(&mut image, Rect::at(10, 60).of_size(4, 4), Luma([0u8]));
        // Touches the first rectangle only at a corner
        draw_filled_rect_mut(&mut image, Rect::at(35, 25).of_size(6, 6), Luma([0u8]));

        let mask = FixedThresholdBinarizer::default().binarize(&image).unwrap();
        let blobs = FloodFillExtractor.extract_components(&mask);
        assert_eq!(blobs.len(), 3);

        let total: usize = blobs.iter().map(Blob::len).sum();
        assert_eq!(total, mask.foreground_count());

        let mut seen = std::collections::HashSet::new();
        for blob in &blobs {
            for &p in blob.pixels() {
                assert!(seen.insert(p), "pixel {p:?} appears in two blobs");
                assert!(mask.is_foreground(p.0 as i64, p.1 as i64));
            }
        }
    }

    #[test]
    fn test_empty_mask_has_no_blobs() {
        let mask = BinaryMask::from_fn(10, 10, 0, |_, _| false);
        assert!(FloodFillExtractor.extract_components(&mask).is_empty());
    }
}
