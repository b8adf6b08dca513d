use std::fmt;

const TITLE: &str = "<b>Качество воздуха в Ташкенте (IQAir)</b>";
const FOOTER: &str = "Источник: iqair.com (реал-тайм)\n#воздух_ташкент";
const UPDATED: &str = "обновлено недавно";
const APOLOGY: &str = "Не удалось загрузить данные с IQAir. Попробуйте позже.";

const NOT_AVAILABLE: &str = "N/A";
const LEVEL_NOT_AVAILABLE: &str = "Не удалось получить данные";

/// Everything read from one page. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    pub aqi: Option<u32>,
    pub level: Option<String>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
}

/// Result of one extraction call.
///
/// A failed fetch carries no measurements at all; a fetched page always
/// yields `Available`, however little was found on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Unavailable,
    Available(Measurements),
}

fn or_na<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

impl Report {
    pub fn fetch_failed(&self) -> bool {
        matches!(self, Report::Unavailable)
    }

    pub fn measurements(&self) -> Option<&Measurements> {
        match self {
            Report::Available(m) => Some(m),
            Report::Unavailable => None,
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = match self {
            Report::Unavailable => return write!(f, "{}\n\n{}\n\n{}", TITLE, APOLOGY, FOOTER),
            Report::Available(m) => m,
        };

        writeln!(f, "{}", TITLE)?;
        writeln!(f)?;
        writeln!(
            f,
            "<b>AQI: {}</b> — {}",
            or_na(&m.aqi),
            m.level.as_deref().unwrap_or(LEVEL_NOT_AVAILABLE)
        )?;
        writeln!(f, "Обновлено: {}", UPDATED)?;
        writeln!(f)?;
        writeln!(f, "🌫 PM2.5: <b>{} мкг/м³</b>", or_na(&m.pm25))?;
        writeln!(f, "🌀 PM10:  <b>{} мкг/м³</b>", or_na(&m.pm10))?;
        writeln!(f, "☁️ Озон:  <b>{} мкг/м³</b>", or_na(&m.o3))?;
        writeln!(f, "🚗 NO₂:   <b>{} мкг/м³</b>", or_na(&m.no2))?;
        writeln!(f, "🌡️ Температура: <b>{} °C</b>", or_na(&m.temperature_c))?;
        writeln!(f, "💧 Влажность: <b>{} %</b>", or_na(&m.humidity_pct))?;
        writeln!(f)?;
        write!(f, "{}", FOOTER)
    }
}
