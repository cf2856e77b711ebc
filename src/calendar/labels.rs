use rust_i18n::t;

/// Localised month name for a zero-based month index
pub fn month_name(month0: u32, locale: &str) -> String {
    let name = match month0 {
        0 => t!("calendar.month.january", locale = locale),
        1 => t!("calendar.month.february", locale = locale),
        2 => t!("calendar.month.march", locale = locale),
        3 => t!("calendar.month.april", locale = locale),
        4 => t!("calendar.month.may", locale = locale),
        5 => t!("calendar.month.june", locale = locale),
        6 => t!("calendar.month.july", locale = locale),
        7 => t!("calendar.month.august", locale = locale),
        8 => t!("calendar.month.september", locale = locale),
        9 => t!("calendar.month.october", locale = locale),
        10 => t!("calendar.month.november", locale = locale),
        _ => t!("calendar.month.december", locale = locale),
    };
    name.to_string()
}

/// Short weekday headers, Sunday first
pub fn weekday_headers(locale: &str) -> [String; 7] {
    [
        t!("calendar.weekday.sun", locale = locale).to_string(),
        t!("calendar.weekday.mon", locale = locale).to_string(),
        t!("calendar.weekday.tue", locale = locale).to_string(),
        t!("calendar.weekday.wed", locale = locale).to_string(),
        t!("calendar.weekday.thu", locale = locale).to_string(),
        t!("calendar.weekday.fri", locale = locale).to_string(),
        t!("calendar.weekday.sat", locale = locale).to_string(),
    ]
}

/// Static strings of the agenda page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaLabels {
    pub title: String,
    pub new_event: String,
    pub previous: String,
    pub next: String,
}

impl AgendaLabels {
    pub fn for_locale(locale: &str) -> Self {
        Self {
            title: t!("calendar.title", locale = locale).to_string(),
            new_event: t!("calendar.new_event", locale = locale).to_string(),
            previous: t!("calendar.previous", locale = locale).to_string(),
            next: t!("calendar.next", locale = locale).to_string(),
        }
    }
}
