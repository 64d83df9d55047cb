pub mod chart;
pub mod controls;
pub mod legend;
pub mod prompt;
pub mod settings;
pub mod text_input;
