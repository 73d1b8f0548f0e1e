//! Unit tests for the annotation file format.
//!
//! These tests cover export shape, import validation and file round-trips.

mod annotation_file_tests;
