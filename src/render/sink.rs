use crate::render::error::RenderError;
use crate::render::layout::StripeChart;

/// Receives a laid-out chart and emits it somewhere: a file, a buffer, a test recorder.
pub trait StripeSink {
    fn render(&mut self, chart: &StripeChart) -> Result<(), RenderError>;
}

/// Keeps every chart it receives. Handy for inspecting a layout without drawing it.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub charts: Vec<StripeChart>,
}

impl StripeSink for RecordingSink {
    fn render(&mut self, chart: &StripeChart) -> Result<(), RenderError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(title: &str) -> StripeChart {
        StripeChart {
            title: title.to_string(),
            x_range: (2000.0, 2001.0),
            y_range: (0.0, 1.0),
            size: (10, 10),
            stripes: Vec::new(),
            labels: Vec::new(),
        }
    }

    #[test]
    fn test_recording_sink_behind_trait_object() -> Result<(), RenderError> {
        let mut recorder = RecordingSink::default();
        {
            let sink: &mut dyn StripeSink = &mut recorder;
            sink.render(&chart("a"))?;
            sink.render(&chart("b"))?;
        }
        let titles: Vec<&str> = recorder.charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
        Ok(())
    }
}
