//! Line classification: session trailers, discardable noise, content.

use super::date::{DateResolver, ResolvedDate};
use super::driver::DriverDetector;
use crate::config::Config;
use crate::error::EngineError;
use chrono::{NaiveDateTime, Weekday};

/// What a trailer line declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerInfo {
    /// Distinct drivers named on the line, leftmost first.
    pub drivers: Vec<String>,
    pub date: Option<ResolvedDate>,
    pub weekday_conflict: Option<Weekday>,
}

impl TrailerInfo {
    pub fn driver(&self) -> Option<&str> {
        self.drivers.first().map(String::as_str)
    }
}

/// Decides whether a message body declares session context (driver/date)
/// or is discardable noise. Everything else is block content.
#[derive(Debug, Clone)]
pub struct TrailerClassifier {
    drivers: DriverDetector,
    dates: DateResolver,
    max_chars: usize,
    closing_phrases: Vec<String>,
    system_notices: Vec<String>,
    greetings: Vec<String>,
    min_content_chars: usize,
}

impl TrailerClassifier {
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        Ok(Self {
            drivers: DriverDetector::new(&config.drivers)?,
            dates: DateResolver::new(&config.weekdays)?,
            max_chars: config.trailer_max_chars,
            closing_phrases: lowercase_all(&config.closing_phrases),
            system_notices: lowercase_all(&config.system_notices),
            greetings: lowercase_all(&config.greetings),
            min_content_chars: config.min_content_chars,
        })
    }

    pub fn drivers(&self) -> &DriverDetector {
        &self.drivers
    }

    pub fn dates(&self) -> &DateResolver {
        &self.dates
    }

    /// A body is a trailer when it names a driver, uses a closing phrase,
    /// or is short and holds a weekday name or a date literal.
    ///
    /// Short delivery notes that mention a courier in passing are
    /// classified as trailers too; the review queue absorbs those.
    pub fn is_trailer(&self, body: &str) -> bool {
        if self.drivers.detect(body).is_some() {
            return true;
        }

        let lower = body.to_lowercase();
        if self.closing_phrases.iter().any(|p| lower.contains(p.as_str())) {
            return true;
        }

        body.chars().count() < self.max_chars
            && (self.dates.weekday_in(body).is_some() || self.dates.has_date_literal(body))
    }

    /// System notices, pure greetings and near-empty messages.
    pub fn is_ignorable(&self, body: &str) -> bool {
        let lower = body.to_lowercase();
        if self.system_notices.iter().any(|n| lower.contains(n.as_str())) {
            return true;
        }

        let visible = body.chars().filter(|c| !c.is_whitespace()).count();
        if visible < self.min_content_chars {
            return true;
        }

        let mut words = lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|w| !w.is_empty())
            .peekable();
        words.peek().is_some() && words.all(|w| self.greetings.iter().any(|g| g == w))
    }

    /// Extract the driver/date a trailer body declares.
    pub fn read(&self, body: &str, reference: Option<NaiveDateTime>) -> TrailerInfo {
        let drivers = self
            .drivers
            .detect_all(body)
            .into_iter()
            .map(str::to_string)
            .collect();
        let date = self.dates.resolve(body, reference);
        let weekday_conflict = date
            .as_ref()
            .and_then(|d| self.dates.conflicting_weekday(body, d));
        TrailerInfo {
            drivers,
            date,
            weekday_conflict,
        }
    }
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn classifier() -> TrailerClassifier {
        TrailerClassifier::new(&Config::default()).unwrap()
    }

    fn reference() -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
    }

    #[test]
    fn test_driver_line_is_trailer() {
        assert!(classifier().is_trailer("Essas foram da Rodrigo, quinta"));
        assert!(classifier().is_trailer("KAROL"));
    }

    #[test]
    fn test_long_driver_line_is_still_trailer() {
        assert!(classifier().is_trailer(
            "Rafa leva essas aqui amanhã cedo junto com o restante do pessoal"
        ));
    }

    #[test]
    fn test_closing_phrase_is_trailer() {
        assert!(classifier().is_trailer("Essas foram da"));
        assert!(classifier().is_trailer("these were all delivered by the new guy"));
    }

    #[test]
    fn test_short_weekday_is_trailer() {
        assert!(classifier().is_trailer("quinta"));
        assert!(classifier().is_trailer("31/12"));
    }

    #[test]
    fn test_long_line_with_date_is_not_trailer() {
        let line = "Rua das Flores 123, apto 31/12, entregar pela manhã sem falta";
        assert!(!classifier().is_trailer(line));
        let line = "Entregar na quinta junto com o pedido anterior do cliente";
        assert!(!classifier().is_trailer(line));
    }

    #[test]
    fn test_content_is_not_trailer() {
        assert!(!classifier().is_trailer("2x Produto A"));
        assert!(!classifier().is_trailer("Francisco pediu 3 unidades"));
    }

    #[test]
    fn test_ignorable_system_notice() {
        assert!(classifier().is_ignorable("<Media omitted>"));
        assert!(classifier().is_ignorable("sticker omitted"));
    }

    #[test]
    fn test_ignorable_greetings() {
        assert!(classifier().is_ignorable("Salve!"));
        assert!(classifier().is_ignorable("ok 👍"));
        assert!(classifier().is_ignorable("Bom dia"));
    }

    #[test]
    fn test_ignorable_near_empty() {
        assert!(classifier().is_ignorable(""));
        assert!(classifier().is_ignorable("  a "));
    }

    #[test]
    fn test_content_not_ignorable() {
        assert!(!classifier().is_ignorable("2x Produto A"));
        assert!(!classifier().is_ignorable("ok, 2x Produto A"));
        assert!(!classifier().is_ignorable("Rua do Bookstore 12"));
    }

    #[test]
    fn test_read_trailer() {
        let info = classifier().read("Essas foram da Rodrigo, quinta", reference());
        assert_eq!(info.driver(), Some("RODRIGO"));
        assert_eq!(info.date.map(|d| d.formatted()).as_deref(), Some("01/01/2026"));
        assert_eq!(info.weekday_conflict, None);
    }

    #[test]
    fn test_read_trailer_multiple_drivers() {
        let info = classifier().read("Rafa e Karol", reference());
        assert_eq!(info.drivers, vec!["RAFA".to_string(), "KAROL".to_string()]);
        assert_eq!(info.date, None);
    }

    #[test]
    fn test_read_trailer_weekday_conflict() {
        let info = classifier().read("Karol quinta 31/12", reference());
        assert_eq!(info.date.map(|d| d.formatted()).as_deref(), Some("31/12/2025"));
        assert_eq!(info.weekday_conflict, Some(Weekday::Thu));
    }
}
