//! Human-readable rendering of indicator values: `1.23 million`, `45,600`, `N/A`.

use num_format::{Locale, ToFormattedString};

/// Marker shown wherever a value is missing.
pub const NO_DATA: &str = "N/A";

/// Large-number words, starting at one million.
const POWERS: [(f64, &str); 10] = [
    (1.0e6, "million"),
    (1.0e9, "billion"),
    (1.0e12, "trillion"),
    (1.0e15, "quadrillion"),
    (1.0e18, "quintillion"),
    (1.0e21, "sextillion"),
    (1.0e24, "septillion"),
    (1.0e27, "octillion"),
    (1.0e30, "nonillion"),
    (1.0e33, "decillion"),
];

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Formats values for hover text, tables and bar labels.
#[derive(Debug, Clone, Copy)]
pub struct NumberFormat {
    locale: &'static Locale,
    decimal: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::for_locale("en")
    }
}

impl NumberFormat {
    pub fn for_locale(tag: &str) -> Self {
        let (locale, decimal) = map_locale(tag);
        Self { locale, decimal }
    }

    /// Format an optional value; `None` and non-finite values become [`NO_DATA`].
    pub fn format_opt(&self, v: Option<f64>) -> String {
        match v {
            Some(x) => self.format(x),
            None => NO_DATA.to_string(),
        }
    }

    /// Below one million: grouped digits (two decimals if fractional).
    /// From one million up: two decimals and a scale word.
    pub fn format(&self, v: f64) -> String {
        if !v.is_finite() {
            return NO_DATA.to_string();
        }
        let sign = if v < 0.0 { "-" } else { "" };
        let a = v.abs();

        // Compare after rounding: 999_999.996 is shown as "1.00 million".
        if (a * 100.0).round() / 100.0 < POWERS[0].0 {
            return format!("{sign}{}", self.grouped(a));
        }

        for (i, &(power, word)) in POWERS.iter().enumerate() {
            let next = POWERS.get(i + 1).map(|&(p, _)| p);
            if next.is_some_and(|p| a >= p) {
                continue;
            }
            let chopped = a / power;
            // 999.999 million rounds to "1000.00 million"; promote it to the next word.
            if let Some(next_power) = next
                && format!("{chopped:.2}") == "1000.00"
            {
                let word = POWERS[i + 1].1;
                return format!("{sign}{} {word}", self.decimals(a / next_power));
            }
            return format!("{sign}{} {word}", self.decimals(chopped));
        }
        unreachable!("the last power has no successor")
    }

    /// `{:.2}` with the locale's decimal separator.
    fn decimals(&self, v: f64) -> String {
        let s = format!("{v:.2}");
        if self.decimal == '.' {
            s
        } else {
            s.replace('.', &self.decimal.to_string())
        }
    }

    fn grouped(&self, a: f64) -> String {
        let rounded = (a * 100.0).round() / 100.0;
        let whole = rounded.trunc() as i64;
        let frac = ((rounded - rounded.trunc()) * 100.0).round() as i64;
        let int_part = whole.to_formatted_string(self.locale);
        if frac == 0 {
            int_part
        } else {
            format!("{int_part}{}{frac:02}", self.decimal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_values_get_scale_words() {
        let f = NumberFormat::default();
        assert_eq!(f.format(1_234_567.0), "1.23 million");
        assert_eq!(f.format(2.5e12), "2.50 trillion");
        assert_eq!(f.format(-3.1e9), "-3.10 billion");
        assert_eq!(f.format(999_999_999.0), "1.00 billion");
    }

    #[test]
    fn rounding_up_to_a_million_switches_to_words() {
        let f = NumberFormat::default();
        assert_eq!(f.format(999_999.996), "1.00 million");
        assert_eq!(f.format(999_999.99), "999,999.99");
    }

    #[test]
    fn small_values_are_grouped() {
        let f = NumberFormat::default();
        assert_eq!(f.format(45_600.0), "45,600");
        assert_eq!(f.format(2.5), "2.50");
        assert_eq!(f.format(0.0), "0");
        assert_eq!(f.format(-1.0), "-1");
    }

    #[test]
    fn german_locale_uses_comma_decimal() {
        let f = NumberFormat::for_locale("de");
        assert_eq!(f.format(1_234_567.0), "1,23 million");
        assert_eq!(f.format(45_600.5), "45.600,50");
    }

    #[test]
    fn missing_values_render_marker() {
        let f = NumberFormat::default();
        assert_eq!(f.format_opt(None), NO_DATA);
        assert_eq!(f.format(f64::NAN), NO_DATA);
    }
}
