pub mod discover;
pub mod error;
pub mod gcov;
pub mod history;
pub mod html;
pub mod model;
pub mod report;
pub mod tree;
