pub mod diff;
pub mod rules;
pub mod run;
