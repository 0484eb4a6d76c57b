//! Render pipeline definitions.
//!
//! - `basic` is the unlit colour × texture pipeline every mesh node is drawn with

pub mod basic;
