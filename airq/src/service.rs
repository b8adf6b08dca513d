use crate::extract::Extractors;
use crate::fetch::PageFetcher;
use crate::page::PageView;
use crate::report::{Measurements, Report};

/// Fetches the page and turns it into a [`Report`]. Never fails: a fetch
/// error becomes [`Report::Unavailable`], a missing field stays `None`.
pub struct AirQualityService<F> {
    fetcher: F,
    extractors: Extractors,
}

impl<F: PageFetcher> AirQualityService<F> {
    pub fn new(fetcher: F) -> AirQualityService<F> {
        AirQualityService {
            fetcher,
            extractors: Extractors::new(),
        }
    }

    pub async fn report(&self) -> Report {
        match self.fetcher.fetch().await {
            Ok(html) => Report::Available(self.extract(&html)),
            Err(e) => {
                log::error!("IQAir fetch failed: {}", e);
                Report::Unavailable
            },
        }
    }

    pub fn extract(&self, html: &str) -> Measurements {
        let page = PageView::parse(html);
        let reading = self.extractors.aqi.run(&page);
        Measurements {
            aqi: reading.aqi,
            level: reading.level,
            pm25: self.extractors.pm25.run(&page),
            pm10: self.extractors.pm10.run(&page),
            o3: self.extractors.o3.run(&page),
            no2: self.extractors.no2.run(&page),
            temperature_c: self.extractors.temperature.run(&page),
            humidity_pct: self.extractors.humidity.run(&page),
        }
    }
}
