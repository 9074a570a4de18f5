//! Boundary edge search
//!
//! Given a UV on or near the transparent/opaque boundary, locate the nearest
//! opaque pixel with an expanding Chebyshev ring search and return a UV pulled
//! back toward the transparent side by a fixed pixel offset.
//!
//! Two implementations produce identical results:
//! - [`RingSearch`] walks rings `1..search_radius` around the start pixel.
//! - [`DistanceFieldSearch`] precomputes the Chebyshev distance from every
//!   pixel to the nearest opaque pixel once per image, then scans only the
//!   ring at that distance. Starts outside the image fall back to the ring
//!   search.
//!
//! Starts farther than `search_radius` from the image, and non-finite UVs,
//! never hit and are returned unchanged.

use crate::sampler::AlphaSampler;
use alphacrop_core::{Pixel, Uv};
use ndarray::Array2;
use tracing::debug;

/// Default number of rings examined around a start pixel
pub const DEFAULT_SEARCH_RADIUS: usize = 100;

/// Largest accepted search radius; finders clamp to it
pub const MAX_SEARCH_RADIUS: usize = 10_000;

/// Default pull-back from the found pixel toward the transparent side, in pixels
pub const DEFAULT_EDGE_OFFSET: i64 = 10;

/// Parameters shared by the edge finders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSearchParams {
    /// Pixels with alpha above this are opaque
    pub threshold: f32,
    /// Rings `1..search_radius` are examined
    pub search_radius: usize,
    /// Distance the result is moved back along the sign of the offset
    pub offset_px: i64,
}

impl EdgeSearchParams {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            search_radius: DEFAULT_SEARCH_RADIUS,
            offset_px: DEFAULT_EDGE_OFFSET,
        }
    }

    pub fn with_search_radius(mut self, search_radius: usize) -> Self {
        self.search_radius = search_radius;
        self
    }

    pub fn with_offset(mut self, offset_px: i64) -> Self {
        self.offset_px = offset_px;
        self
    }
}

/// Relocates a UV onto the estimated alpha edge
pub trait EdgeFinder {
    /// Adjusted UV for `uv`. Returns `uv` unchanged if it already maps to an
    /// opaque pixel or no opaque pixel lies within the search radius.
    fn find_edge(&self, uv: Uv) -> Uv;
}

/// Scan the square ring at Chebyshev distance `radius` around `start` and
/// return the `(dx, dy)` of the opaque pixel with the smallest `dx² + dy²`.
///
/// Rows are visited in increasing `dy`, each row in increasing `dx`; ties keep
/// the first pixel visited.
fn scan_ring(
    sampler: &AlphaSampler<'_>,
    start: Pixel,
    radius: i64,
    threshold: f32,
) -> Option<(i64, i64)> {
    let mut best: Option<((i64, i64), i64)> = None;
    let mut consider = |dx: i64, dy: i64| {
        if !sampler.is_opaque(start.x + dx, start.y + dy, threshold) {
            return;
        }
        let dist = dx * dx + dy * dy;
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some(((dx, dy), dist));
        }
    };

    for dy in -radius..=radius {
        if dy.abs() == radius {
            for dx in -radius..=radius {
                consider(dx, dy);
            }
        } else {
            consider(-radius, dy);
            consider(radius, dy);
        }
    }

    best.map(|(offset, _)| offset)
}

/// Found pixel moved `offset_px` back toward the start along each axis sign
fn pull_back(start: Pixel, (dx, dy): (i64, i64), offset_px: i64) -> Pixel {
    let axis = |s: i64, d: i64| s.saturating_add(d).saturating_sub(offset_px.saturating_mul(d.signum()));
    Pixel::new(axis(start.x, dx), axis(start.y, dy))
}

/// Map `uv` through a pixel-space search, keeping it when the search has no
/// answer or the UV is not finite.
fn resolve_uv<F>(sampler: &AlphaSampler<'_>, uv: Uv, find: F) -> Uv
where
    F: FnOnce(Pixel) -> Option<Pixel>,
{
    if !uv.x.is_finite() || !uv.y.is_finite() {
        return uv;
    }
    match find(sampler.pixel_of(&uv)) {
        Some(p) => p.to_uv(sampler.width(), sampler.height()),
        None => uv,
    }
}

/// Direct expanding ring search, O(search_radius²) per query
#[derive(Debug, Clone, Copy)]
pub struct RingSearch<'a> {
    sampler: AlphaSampler<'a>,
    params: EdgeSearchParams,
}

impl<'a> RingSearch<'a> {
    /// `params.search_radius` is clamped to [`MAX_SEARCH_RADIUS`].
    pub fn new(sampler: AlphaSampler<'a>, mut params: EdgeSearchParams) -> Self {
        params.search_radius = params.search_radius.min(MAX_SEARCH_RADIUS);
        Self { sampler, params }
    }

    /// Whether some ring `1..search_radius` around `start` touches the image
    fn in_reach(&self, start: Pixel) -> bool {
        let r = self.params.search_radius as i64;
        let (w, h) = (self.sampler.width() as i64, self.sampler.height() as i64);
        !self.sampler.is_empty()
            && start.x > -r
            && start.y > -r
            && start.x < w + r - 1
            && start.y < h + r - 1
    }

    /// Pixel-space form of [`EdgeFinder::find_edge`]. `None` means "leave the
    /// input unchanged".
    pub fn find_edge_pixel(&self, start: Pixel) -> Option<Pixel> {
        if !self.in_reach(start)
            || self.sampler.is_opaque(start.x, start.y, self.params.threshold)
        {
            return None;
        }
        (1..self.params.search_radius as i64).find_map(|radius| {
            scan_ring(&self.sampler, start, radius, self.params.threshold)
                .map(|offset| pull_back(start, offset, self.params.offset_px))
        })
    }
}

impl EdgeFinder for RingSearch<'_> {
    fn find_edge(&self, uv: Uv) -> Uv {
        resolve_uv(&self.sampler, uv, |p| self.find_edge_pixel(p))
    }
}

/// Edge search backed by a precomputed Chebyshev distance field.
///
/// The field covers the image plus a one-pixel border, so UVs on the upper
/// plane edges (`u = 1` or `v = 1`) still resolve through it. Starts outside
/// that area are handed to a [`RingSearch`]. Distances are stored saturated
/// at `search_radius`.
#[derive(Debug, Clone)]
pub struct DistanceFieldSearch<'a> {
    ring: RingSearch<'a>,
    field: Array2<u16>,
}

impl<'a> DistanceFieldSearch<'a> {
    /// Border around the image covered by the field
    const PAD: i64 = 1;

    /// Build the distance field for `sampler`'s image.
    ///
    /// `params.search_radius` is clamped to [`MAX_SEARCH_RADIUS`].
    pub fn new(sampler: AlphaSampler<'a>, params: EdgeSearchParams) -> Self {
        let ring = RingSearch::new(sampler, params);
        let cap = ring.params.search_radius as u16;
        let field = chebyshev_field(&sampler, ring.params.threshold, Self::PAD, cap);
        debug!(
            "Built {}x{} distance field for {}x{} image",
            field.ncols(),
            field.nrows(),
            sampler.width(),
            sampler.height()
        );
        Self { ring, field }
    }

    /// Chebyshev distance from `p` to the nearest opaque pixel, saturated at
    /// `search_radius`. `None` for pixels outside the field.
    pub fn distance(&self, p: Pixel) -> Option<usize> {
        let col = usize::try_from(p.x.checked_add(Self::PAD)?).ok()?;
        let row = usize::try_from(p.y.checked_add(Self::PAD)?).ok()?;
        self.field.get((row, col)).map(|&d| d as usize)
    }

    /// Pixel-space form of [`EdgeFinder::find_edge`]
    pub fn find_edge_pixel(&self, start: Pixel) -> Option<Pixel> {
        let params = &self.ring.params;
        match self.distance(start) {
            None => self.ring.find_edge_pixel(start),
            Some(0) => None,
            Some(radius) if radius >= params.search_radius => None,
            Some(radius) => scan_ring(&self.ring.sampler, start, radius as i64, params.threshold)
                .map(|offset| pull_back(start, offset, params.offset_px)),
        }
    }
}

impl EdgeFinder for DistanceFieldSearch<'_> {
    fn find_edge(&self, uv: Uv) -> Uv {
        resolve_uv(&self.ring.sampler, uv, |p| self.find_edge_pixel(p))
    }
}

/// Two-pass chessboard distance transform of the opaque mask over the image
/// padded by `pad` pixels, saturated at `cap`.
fn chebyshev_field(sampler: &AlphaSampler<'_>, threshold: f32, pad: i64, cap: u16) -> Array2<u16> {
    let cols = sampler.width() + 2 * pad as usize;
    let rows = sampler.height() + 2 * pad as usize;
    let mut field = Array2::from_shape_fn((rows, cols), |(r, c)| {
        if sampler.is_opaque(c as i64 - pad, r as i64 - pad, threshold) {
            0
        } else {
            cap
        }
    });

    let step = |d: u16| d.saturating_add(1).min(cap);

    // Forward pass: left, upper-left, up, upper-right
    for r in 0..rows {
        for c in 0..cols {
            let mut d = field[[r, c]];
            if c > 0 {
                d = d.min(step(field[[r, c - 1]]));
            }
            if r > 0 {
                d = d.min(step(field[[r - 1, c]]));
                if c > 0 {
                    d = d.min(step(field[[r - 1, c - 1]]));
                }
                if c + 1 < cols {
                    d = d.min(step(field[[r - 1, c + 1]]));
                }
            }
            field[[r, c]] = d;
        }
    }

    // Backward pass: right, lower-right, down, lower-left
    for r in (0..rows).rev() {
        for c in (0..cols).rev() {
            let mut d = field[[r, c]];
            if c + 1 < cols {
                d = d.min(step(field[[r, c + 1]]));
            }
            if r + 1 < rows {
                d = d.min(step(field[[r + 1, c]]));
                if c + 1 < cols {
                    d = d.min(step(field[[r + 1, c + 1]]));
                }
                if c > 0 {
                    d = d.min(step(field[[r + 1, c - 1]]));
                }
            }
            field[[r, c]] = d;
        }
    }

    field
}
