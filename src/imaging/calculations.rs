//! Pure calculation functions for image dimensions and pixel statistics.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the analysis dimensions for a source image.
///
/// Images whose longer edge fits within `max_edge` are returned unchanged.
/// Larger images are scaled proportionally so the longer edge equals
/// `max_edge`; the shorter edge never rounds down to zero.
///
/// # Examples
/// ```
/// # use civic_eye::imaging::calculate_clamped_dimensions;
/// // 4000x3000 landscape clamped to 2048 → 2048x1536
/// assert_eq!(calculate_clamped_dimensions((4000, 3000), 2048), (2048, 1536));
///
/// // Already small enough: untouched
/// assert_eq!(calculate_clamped_dimensions((800, 600), 2048), (800, 600));
/// ```
pub fn calculate_clamped_dimensions(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let longer_edge = src_w.max(src_h);

    if longer_edge <= max_edge || longer_edge == 0 {
        return source;
    }

    let ratio = max_edge as f64 / longer_edge as f64;
    if src_w >= src_h {
        // Landscape or square
        let h = ((src_h as f64 * ratio).round() as u32).max(1);
        (max_edge, h)
    } else {
        // Portrait
        let w = ((src_w as f64 * ratio).round() as u32).max(1);
        (w, max_edge)
    }
}

/// Half-open pixel range `[start, end)` of the `index`-th of `parts` equal
/// divisions of `length`.
///
/// Divisions tile the axis exactly: the end of one is the start of the next
/// and the last ends at `length`.
pub fn region_bounds(length: u32, parts: u32, index: u32) -> (u32, u32) {
    let parts = parts.max(1) as u64;
    let length = length as u64;
    let index = index as u64;
    let start = length * index / parts;
    let end = length * (index + 1) / parts;
    (start as u32, end as u32)
}

/// Nearest-rank percentile of a 256-bin histogram of 8-bit values.
///
/// `p` is a fraction in `[0, 1]`. An empty histogram yields 0.
pub fn percentile_from_histogram(histogram: &[u64; 256], p: f64) -> u8 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let rank = ((p.clamp(0.0, 1.0) * total as f64).ceil() as u64).max(1);
    let mut seen = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen >= rank {
            return value as u8;
        }
    }
    255
}

/// Median of a slice, averaging the two middle values for even lengths.
/// An empty slice yields 0.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Smallest angle between two directions, in degrees (0–180).
pub fn angular_distance_deg(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    if diff > 180.0 { 360.0 - diff } else { diff }
}
