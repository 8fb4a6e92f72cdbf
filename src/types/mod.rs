pub mod temperature_series;
