pub mod control_bar;
pub mod spectrogram_view;
pub mod stats_panel;

pub use spectrogram_view::SpectrogramView;
