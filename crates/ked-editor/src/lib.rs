//! # ked-editor: Editor core for ked
//!
//! This crate contains the document model and everything that reads it:
//!
//! - **[`row`]**: one line with its render and highlight caches
//! - **[`document`]**: the ordered rows, dirty tracking, load and save
//! - **[`syntax`]** / **[`highlight`]**: language profiles and the per-row
//!   highlighter with block-comment continuation
//! - **[`cursor`]**: raw-coordinate cursor with wrapping motions
//! - **[`search`]**: circular substring scan and the find overlay
//! - **[`view`]**: viewport scrolling and full-frame composition
//! - **[`options`]**: editor settings and the `kedrc` parser
//! - **[`storage`]**: the file store behind load and save
//! - **[`status`]**: the timed status message

pub mod cursor;
pub mod document;
pub mod highlight;
pub mod options;
pub mod row;
pub mod search;
pub mod status;
pub mod storage;
pub mod syntax;
pub mod view;
