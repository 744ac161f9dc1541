use crate::config::GeneratorConfig;
use chrono::NaiveDateTime;

pub struct DateTimeGenerator {
    config: GeneratorConfig,
}

impl DateTimeGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Timestamps at midnight for every date of the series.
    pub fn generate_datetime_series(&self) -> Vec<NaiveDateTime> {
        self.config
            .dates()
            .map(|date| date.and_time(chrono::NaiveTime::MIN))
            .collect()
    }
}
