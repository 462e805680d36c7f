pub mod align;
pub mod correlation;
pub mod pipeline;
pub mod resample;
pub mod returns;
pub mod session;
