pub mod report;

pub mod helpers;
