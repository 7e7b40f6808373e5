pub mod options;
pub mod panels;
pub mod plot;
pub mod preview;
