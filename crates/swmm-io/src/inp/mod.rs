//! Reading and writing the sectioned input text.
//!
//! Import runs lexer → section store → resolver (row layouts, joins,
//! geometry). Export runs row layouts → composite regrouping → writer.

pub mod composite;
pub mod geometry;
pub mod layouts;
pub mod lexer;
pub mod quality;
pub mod records;
pub mod resolve;
pub mod store;
pub mod writer;
