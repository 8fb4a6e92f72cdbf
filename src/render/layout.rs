//! Positions every stripe and label of the chart in data coordinates (x = year).

use crate::color::mapper::ColorMapper;
use crate::color::rgb::Rgb;
use crate::config::scenario::ScenarioTargets;
use crate::config::stripes_config::StripesConfig;
use crate::projection::ramp::SECOND_ANCHOR_YEAR;
use crate::projection::synthesizer::Projection;

const FIRST_LABEL_YEAR: i32 = 1850;
const YEAR_LABEL_Y: f64 = -0.01;
const BOTTOM_PADDING: f64 = 0.1;
const RIGHT_PADDING_YEARS: f64 = 20.0;
const SCENARIO_LABEL_GAP_YEARS: f64 = 5.0;
const EXPLANATION_INSET_YEARS: f64 = 10.0;

/// One colored rectangle, anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stripe {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

/// Which point of the text box sits on the label position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopCenter,
    CenterLeft,
    CenterRight,
}

/// Text at a data position. `\n` separates lines, stacked around the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
    pub color: Rgb,
    pub size: u32,
}

/// Everything a sink needs to draw the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeChart {
    pub title: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub size: (u32, u32),
    pub stripes: Vec<Stripe>,
    pub labels: Vec<Label>,
}

/// Lays out historical stripes and stacked scenario rows. Historical stripes
/// never rise above the top of the scenario stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeLayout {
    pub title: String,
    pub historical_height: f64,
    pub row_height: f64,
    pub show_labels: bool,
    pub size: (u32, u32),
}

impl StripeLayout {
    pub fn from_config(config: &StripesConfig) -> Self {
        Self {
            title: config.title.clone(),
            historical_height: config.historical_height,
            row_height: config.scenario_row_height,
            show_labels: config.show_labels,
            size: config.image_size,
        }
    }

    /// Scenario rows are stacked from `y = 0` upwards in projection order.
    /// `targets` supplies the explanation text drawn over each row.
    pub fn build(
        &self,
        projection: &Projection,
        mapper: &ColorMapper,
        targets: &ScenarioTargets,
    ) -> StripeChart {
        let mut stripes = Vec::with_capacity(
            projection.historical.len() + projection.scenarios.len() * projection.years.len(),
        );
        let stack_height = projection.scenarios.len() as f64 * self.row_height;
        let history_height = if projection.scenarios.is_empty() {
            self.historical_height
        } else {
            self.historical_height.min(stack_height)
        };

        for (year, value) in projection
            .historical
            .years
            .iter()
            .zip(projection.historical.values.iter())
        {
            stripes.push(Stripe {
                x: *year as f64,
                y: 0.0,
                width: 1.0,
                height: history_height,
                color: mapper.map(*value),
            });
        }

        let mut labels = Vec::new();
        let last_projected_year = projection.years.last().copied();
        let mut row_y = 0.0;
        for scenario in &projection.scenarios {
            for (year, value) in scenario.points() {
                stripes.push(Stripe {
                    x: year as f64,
                    y: row_y,
                    width: 1.0,
                    height: self.row_height,
                    color: mapper.map(value),
                });
            }

            if self.show_labels {
                let center = row_y + self.row_height / 2.0;
                if let Some(last_year) = last_projected_year {
                    labels.push(Label {
                        text: scenario.name.clone(),
                        x: last_year as f64 + SCENARIO_LABEL_GAP_YEARS,
                        y: center,
                        anchor: Anchor::CenterLeft,
                        color: Rgb::BLACK,
                        size: 11,
                    });
                }
                if let Some(description) = targets
                    .get(&scenario.name)
                    .and_then(|t| t.description.as_ref())
                {
                    labels.push(Label {
                        text: description.clone(),
                        x: SECOND_ANCHOR_YEAR as f64 - EXPLANATION_INSET_YEARS,
                        y: center,
                        anchor: Anchor::CenterRight,
                        color: Rgb::WHITE,
                        size: 10,
                    });
                }
            }
            row_y += self.row_height;
        }

        let first_year = projection
            .historical
            .first_year()
            .or(projection.years.first().copied())
            .unwrap_or(FIRST_LABEL_YEAR);
        let end_year = last_projected_year
            .unwrap_or(SECOND_ANCHOR_YEAR)
            .max(SECOND_ANCHOR_YEAR);
        let x_range = (
            first_year.min(FIRST_LABEL_YEAR) as f64,
            end_year as f64 + RIGHT_PADDING_YEARS,
        );

        let top = if !projection.scenarios.is_empty() {
            stack_height
        } else if projection.historical.is_empty() {
            0.0
        } else {
            history_height
        };
        let bottom = if self.show_labels {
            YEAR_LABEL_Y - BOTTOM_PADDING
        } else {
            0.0
        };

        if self.show_labels {
            let mut year_label = |text: String, year: i32| {
                labels.push(Label {
                    text,
                    x: year as f64,
                    y: YEAR_LABEL_Y,
                    anchor: Anchor::TopCenter,
                    color: Rgb::BLACK,
                    size: 12,
                });
            };
            year_label(FIRST_LABEL_YEAR.to_string(), FIRST_LABEL_YEAR);
            if let Some(now) = projection.last_historical_year() {
                year_label("Now".to_string(), now);
            }
            let final_year = last_projected_year.unwrap_or(SECOND_ANCHOR_YEAR);
            year_label(final_year.to_string(), final_year);
        }

        StripeChart {
            title: self.title.clone(),
            x_range,
            y_range: (bottom, top.max(bottom + f64::EPSILON)),
            size: self.size,
            stripes,
            labels,
        }
    }
}
