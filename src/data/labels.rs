//! Calendar Label Tables
//! Fixed lookup tables for weekend flags, month names and weekday names.

use serde::{Deserialize, Serialize};

/// Two-valued weekend category derived from the stored 0/1 flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeekendFlag {
    Weekday,
    Weekend,
}

impl WeekendFlag {
    /// Map the raw stored flag. Anything outside {0, 1} has no category.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(WeekendFlag::Weekday),
            1 => Some(WeekendFlag::Weekend),
            _ => None,
        }
    }

    pub fn is_weekend(self) -> bool {
        self == WeekendFlag::Weekend
    }
}

/// Supported label languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

/// Immutable month/weekday/weekend label set owned by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarLabels {
    /// January first
    pub months: [&'static str; 12],
    /// Monday first
    pub weekdays: [&'static str; 7],
    /// [weekday label, weekend label]
    pub weekend: [&'static str; 2],
}

impl CalendarLabels {
    pub const PT_BR: CalendarLabels = CalendarLabels {
        months: [
            "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
        ],
        weekdays: ["Seg", "Ter", "Qua", "Qui", "Sex", "Sáb", "Dom"],
        weekend: ["Dia útil", "Fim de semana"],
    };

    pub const EN: CalendarLabels = CalendarLabels {
        months: [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ],
        weekdays: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        weekend: ["Weekday", "Weekend"],
    };

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::PtBr => Self::PT_BR,
            Locale::En => Self::EN,
        }
    }

    /// Label for a 1-based month number.
    pub fn month(&self, month: u32) -> Option<&'static str> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        self.months.get(idx).copied()
    }

    /// Label for a 0-based weekday counted from Monday.
    pub fn weekday(&self, days_from_monday: u32) -> Option<&'static str> {
        self.weekdays.get(days_from_monday as usize).copied()
    }

    pub fn weekend_label(&self, flag: WeekendFlag) -> &'static str {
        match flag {
            WeekendFlag::Weekday => self.weekend[0],
            WeekendFlag::Weekend => self.weekend[1],
        }
    }

    /// Calendar position of a month label, used for chart ordering.
    pub fn month_index(&self, label: &str) -> Option<usize> {
        self.months.iter().position(|m| *m == label)
    }

    pub fn weekday_index(&self, label: &str) -> Option<usize> {
        self.weekdays.iter().position(|d| *d == label)
    }
}

impl Default for CalendarLabels {
    fn default() -> Self {
        Self::PT_BR
    }
}
