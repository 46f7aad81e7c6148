pub mod frequency_axis;

pub use frequency_axis::{format_hz, frequency_at, tick_positions, FrequencyAxis};
