//! Captured message shapes: the persisted record plus its two
//! presentation forms.

pub mod columns;
pub mod detail;
pub mod record;
pub mod summary;
