pub mod format_series;
