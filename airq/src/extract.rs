use crate::page::{ClassQuery, PageView};
use crate::units::{normalize_decimal, to_celsius};
use regex::Regex;

/// A value that later extraction stages may only complete, never overwrite.
pub trait Fill: Default {
    fn fill(&mut self, other: Self);
    fn is_complete(&self) -> bool;
}

impl<T> Fill for Option<T> {
    fn fill(&mut self, other: Self) {
        if self.is_none() {
            *self = other;
        }
    }

    fn is_complete(&self) -> bool {
        self.is_some()
    }
}

/// AQI and level are searched for together because the page prints them
/// side by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AqiReading {
    pub aqi: Option<u32>,
    pub level: Option<String>,
}

impl Fill for AqiReading {
    fn fill(&mut self, other: Self) {
        self.aqi.fill(other.aqi);
        self.level.fill(other.level);
    }

    fn is_complete(&self) -> bool {
        self.aqi.is_some() && self.level.is_some()
    }
}

/// One way of finding a value in a page.
pub trait Strategy<T>: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, page: &PageView) -> T;
}

/// Ordered strategies for one field. The first stage always wins for what it
/// finds; later stages only fill the gaps.
pub struct Extractor<T> {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy<T>>>,
}

impl<T: Fill> Extractor<T> {
    pub fn new(field: &'static str) -> Extractor<T> {
        Extractor {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: impl Strategy<T> + 'static) -> Extractor<T> {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn run(&self, page: &PageView) -> T {
        let mut value = T::default();
        for strategy in &self.strategies {
            if value.is_complete() {
                break;
            }
            value.fill(strategy.extract(page));
            if value.is_complete() {
                log::debug!("{} found by {} stage", self.field, strategy.name());
            }
        }
        value
    }
}

/// The six levels the page uses, mildest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Good => "Хорошо",
            Level::Moderate => "Умеренно",
            Level::UnhealthyForSensitive => "Нездорово для чувствительных групп",
            Level::Unhealthy => "Нездорово",
            Level::VeryUnhealthy => "Очень нездорово",
            Level::Hazardous => "Опасно",
        }
    }

    /// A pattern matching a truncated form of the label.
    fn stem(&self) -> &'static str {
        match self {
            Level::Good => r"хорош",
            Level::Moderate => r"умерен",
            Level::UnhealthyForSensitive => r"нездоров\w*\s+для\s+чувств",
            Level::Unhealthy => r"нездоров",
            Level::VeryUnhealthy => r"очень\s+нездоров",
            Level::Hazardous => r"опасн",
        }
    }

    /// Longer phrases first, so that "Очень нездорово" is not read as "Нездорово".
    fn by_specificity() -> [Level; 6] {
        [
            Level::UnhealthyForSensitive,
            Level::VeryUnhealthy,
            Level::Unhealthy,
            Level::Moderate,
            Level::Good,
            Level::Hazardous,
        ]
    }
}

/// A 1-3 digit number standing on its own: not part of a word, a longer
/// number or a decimal such as `PM2.5`.
const SHORT_NUMBER: &str = r"(?:^|[^\w.,])(\d{1,3})";
const SHORT_NUMBER_END: &str = r"(?:$|[^\w.,])";

fn build(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid built-in pattern {}: {}", pattern, e),
    }
}

pub const AQI_VALUE: ClassQuery = ClassQuery::new("p", "aqi-value__value");
pub const AQI_STATUS: ClassQuery = ClassQuery::new("span", "aqi-status__text");

/// Reads the dedicated AQI and status elements.
pub struct TagStrategy {
    value: ClassQuery,
    status: ClassQuery,
}

impl TagStrategy {
    pub fn new() -> TagStrategy {
        TagStrategy {
            value: AQI_VALUE,
            status: AQI_STATUS,
        }
    }
}

impl Strategy<AqiReading> for TagStrategy {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn extract(&self, page: &PageView) -> AqiReading {
        let aqi = page
            .tag_text(&self.value)
            .and_then(|text| text.replace(',', "").trim().parse::<u32>().ok());
        let level = page.tag_text(&self.status).filter(|text| !text.is_empty());
        AqiReading { aqi, level }
    }
}

/// Finds "<number> <level>" in the flattened text.
pub struct PhraseStrategy {
    re: Regex,
}

impl PhraseStrategy {
    pub fn new() -> PhraseStrategy {
        let levels: Vec<String> = Level::by_specificity()
            .iter()
            .map(|level| regex::escape(level.label()))
            .collect();
        let pattern = format!(r"(?i){}\s*({})", SHORT_NUMBER, levels.join("|"));
        PhraseStrategy { re: build(&pattern) }
    }
}

impl Strategy<AqiReading> for PhraseStrategy {
    fn name(&self) -> &'static str {
        "phrase"
    }

    fn extract(&self, page: &PageView) -> AqiReading {
        match self.re.captures(page.text()) {
            Some(caps) => AqiReading {
                aqi: caps[1].parse().ok(),
                level: Some(caps[2].to_string()),
            },
            None => AqiReading::default(),
        }
    }
}

/// Searches a fixed number of characters after an anchor label.
pub struct WindowStrategy {
    anchor: &'static str,
    window: usize,
    number: Regex,
    stems: Regex,
    levels: Vec<Level>,
}

impl WindowStrategy {
    pub const ANCHOR: &'static str = "Индекс качества воздуха";
    pub const WINDOW: usize = 400;

    pub fn new(anchor: &'static str, window: usize) -> WindowStrategy {
        let levels = Level::by_specificity().to_vec();
        let stems: Vec<String> = levels.iter().map(|level| format!("({})", level.stem())).collect();
        WindowStrategy {
            anchor,
            window,
            number: build(&format!("{}{}", SHORT_NUMBER, SHORT_NUMBER_END)),
            stems: build(&format!("(?i){}", stems.join("|"))),
            levels,
        }
    }

    fn window<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = text.find(self.anchor)? + self.anchor.len();
        let rest = &text[start..];
        let end = rest
            .char_indices()
            .nth(self.window)
            .map(|(i, _)| i)
            .unwrap_or_else(|| rest.len());
        Some(&rest[..end])
    }
}

impl Strategy<AqiReading> for WindowStrategy {
    fn name(&self) -> &'static str {
        "window"
    }

    fn extract(&self, page: &PageView) -> AqiReading {
        let window = match self.window(page.text()) {
            Some(window) => window,
            None => return AqiReading::default(),
        };
        let aqi = self
            .number
            .captures(window)
            .and_then(|caps| caps[1].parse().ok());
        let level = self.stems.captures(window).and_then(|caps| {
            self.levels
                .iter()
                .enumerate()
                .find(|(i, _)| caps.get(i + 1).is_some())
                .map(|(_, level)| level.label().to_string())
        });
        AqiReading { aqi, level }
    }
}

/// A decimal found by a text pattern whose first group is the number.
pub struct PatternStrategy {
    name: &'static str,
    re: Regex,
}

impl PatternStrategy {
    fn new(name: &'static str, pattern: &str) -> PatternStrategy {
        PatternStrategy { name, re: build(pattern) }
    }

    /// Label, up to ten non-digits, the number, then micrograms per cubic meter.
    fn pollutant(name: &'static str, label: &str) -> PatternStrategy {
        let pattern = format!(r"{}\D{{0,10}}?(\d+(?:[.,]\d+)?)\s*(?:[µμu]g/m|мкг/м)", label);
        PatternStrategy::new(name, &pattern)
    }

    fn number<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.re.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str())
    }
}

impl Strategy<Option<f64>> for PatternStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, page: &PageView) -> Option<f64> {
        self.number(page.text()).and_then(normalize_decimal)
    }
}

/// Reads "<number>°" as Fahrenheit.
///
/// The page does not reliably say which scale it uses; at the time of
/// writing it served Fahrenheit. If that changes this silently mis-converts.
pub struct FahrenheitStrategy {
    inner: PatternStrategy,
}

impl FahrenheitStrategy {
    pub fn new() -> FahrenheitStrategy {
        FahrenheitStrategy {
            inner: PatternStrategy::new("degrees", r"(-?\d+(?:[.,]\d+)?)\s*°"),
        }
    }
}

impl Strategy<Option<f64>> for FahrenheitStrategy {
    fn name(&self) -> &'static str {
        self.inner.name
    }

    fn extract(&self, page: &PageView) -> Option<f64> {
        self.inner.number(page.text()).and_then(to_celsius).map(|c| c as f64)
    }
}

/// Every field extractor of a report, with its patterns compiled once.
pub struct Extractors {
    pub aqi: Extractor<AqiReading>,
    pub pm25: Extractor<Option<f64>>,
    pub pm10: Extractor<Option<f64>>,
    pub o3: Extractor<Option<f64>>,
    pub no2: Extractor<Option<f64>>,
    pub temperature: Extractor<Option<f64>>,
    pub humidity: Extractor<Option<f64>>,
}

impl Extractors {
    pub fn new() -> Extractors {
        Extractors {
            aqi: Extractor::new("aqi")
                .then(TagStrategy::new())
                .then(PhraseStrategy::new())
                .then(WindowStrategy::new(WindowStrategy::ANCHOR, WindowStrategy::WINDOW)),
            pm25: Extractor::new("pm25").then(PatternStrategy::pollutant("label", r"PM2[.,]5")),
            pm10: Extractor::new("pm10").then(PatternStrategy::pollutant("label", r"PM10")),
            o3: Extractor::new("o3").then(PatternStrategy::pollutant("label", r"\bO[3₃]")),
            no2: Extractor::new("no2").then(PatternStrategy::pollutant("label", r"\bNO[2₂]")),
            temperature: Extractor::new("temperature").then(FahrenheitStrategy::new()),
            humidity: Extractor::new("humidity")
                .then(PatternStrategy::new("percent", r"(\d+(?:[.,]\d+)?)\s*%")),
        }
    }
}

impl Default for Extractors {
    fn default() -> Extractors {
        Extractors::new()
    }
}
