//! Anti-aliased fixture rendering for pipeline tests.
//!
//! Shapes are drawn dark (0) on white (255). Each pixel is supersampled on a
//! regular grid and shaded by the covered fraction, so edge pixels get
//! intermediate intensities the way a real rasterizer produces them.

use std::f64::consts::PI;

use image::{Rgba, RgbaImage};

const SAMPLES: u32 = 4;

/// Render the region selected by `inside` with `SAMPLES x SAMPLES` supersampling
pub fn render<F>(width: u32, height: u32, inside: F) -> RgbaImage
where
    F: Fn(f64, f64) -> bool,
{
    let step = 1.0 / SAMPLES as f64;
    RgbaImage::from_fn(width, height, |x, y| {
        let mut hits = 0u32;
        for j in 0..SAMPLES {
            for i in 0..SAMPLES {
                let sx = x as f64 + (i as f64 + 0.5) * step;
                let sy = y as f64 + (j as f64 + 0.5) * step;
                if inside(sx, sy) {
                    hits += 1;
                }
            }
        }
        let coverage = hits as f64 / (SAMPLES * SAMPLES) as f64;
        let gray = (255.0 * (1.0 - coverage)).round() as u8;
        Rgba([gray, gray, gray, 255])
    })
}

pub fn render_disk(width: u32, height: u32, cx: f64, cy: f64, radius: f64) -> RgbaImage {
    render(width, height, |x, y| {
        (x - cx).powi(2) + (y - cy).powi(2) <= radius * radius
    })
}

/// Axis-aligned rectangle covering `[x0, x1) x [y0, y1)`
pub fn render_rect(width: u32, height: u32, x0: f64, y0: f64, x1: f64, y1: f64) -> RgbaImage {
    render(width, height, |x, y| x >= x0 && x < x1 && y >= y0 && y < y1)
}

pub fn render_polygon(width: u32, height: u32, vertices: &[(f64, f64)]) -> RgbaImage {
    render(width, height, |x, y| point_in_polygon(x, y, vertices))
}

/// Even-odd rule
pub fn point_in_polygon(x: f64, y: f64, vertices: &[(f64, f64)]) -> bool {
    let n = vertices.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Five-pointed star with one tip pointing up, outer and inner vertices alternating
pub fn star_vertices(cx: f64, cy: f64, outer: f64, inner: f64) -> Vec<(f64, f64)> {
    (0..10)
        .map(|k| {
            let angle = -PI / 2.0 + k as f64 * PI / 5.0;
            let r = if k % 2 == 0 { outer } else { inner };
            (cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect()
}

/// Overlay the dark pixels of `top` onto `base`
pub fn overlay(base: &mut RgbaImage, top: &RgbaImage) {
    for (x, y, pixel) in top.enumerate_pixels() {
        let under = base.get_pixel_mut(x, y);
        if pixel[0] < under[0] {
            *under = *pixel;
        }
    }
}
