//! Pipeline stages for turning a scanned page into glyphs.
//!
//! Each submodule implements exactly one transformation step and never
//! mutates its input raster, so every stage is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ geometry ──▶ crop ──▶ trim ──▶ transparency
//! (decode)  (mm → px)    (cell)   (ink)    (alpha)
//!                  └──────────── page ────────────┘
//! ```
//!
//! 1. [`input`]        — decode a PNG or JPEG scan from a path or bytes
//! 2. [`geometry`]     — derive pixel rectangles from the millimetre layout
//! 3. [`crop`]         — copy one cell out of the page, clipped to its bounds
//! 4. [`trim`]         — shrink the cell to its ink bounding box
//! 5. [`transparency`] — three-zone background removal
//! 6. [`page`]         — walk the grid and bind each cell to a character

pub mod crop;
pub mod geometry;
pub mod input;
pub mod page;
pub mod transparency;
pub mod trim;
