use super::{CallTool, ToolContext, ToolDescriptor, ToolParameters, ToolReply};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Local, Timelike};
use serde_json::Value;

const WEEKDAYS: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

const MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Renders `mardi 4 août 2026 à 14 h 32`. Also the SMS timestamp format.
pub fn french_date_time<T: Datelike + Timelike>(now: &T) -> String {
    format!(
        "{} {} {} {} à {} h {:02}",
        WEEKDAYS[now.weekday().num_days_from_monday() as usize],
        now.day(),
        MONTHS[now.month0() as usize],
        now.year(),
        now.hour(),
        now.minute()
    )
}

pub fn french_sentence<T: Datelike + Timelike>(now: &T) -> String {
    format!(
        "Nous sommes {} {} {} {}, et il est {} h {:02}.",
        WEEKDAYS[now.weekday().num_days_from_monday() as usize],
        now.day(),
        MONTHS[now.month0() as usize],
        now.year(),
        now.hour(),
        now.minute()
    )
}

pub struct CurrentDatetime;

#[async_trait]
impl CallTool for CurrentDatetime {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "current_datetime".to_string(),
            description: "Donne la date et l'heure actuelles.".to_string(),
            parameters: ToolParameters::object(),
        }
    }

    async fn invoke(&self, _ctx: &ToolContext, _args: Value) -> Result<ToolReply> {
        Ok(ToolReply::say(french_sentence(&Local::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn renders_french_date_and_time() {
        let when = NaiveDate::from_ymd_opt(2026, 8, 4)
            .unwrap()
            .and_hms_opt(14, 32, 0)
            .unwrap();

        assert_eq!(french_date_time(&when), "mardi 4 août 2026 à 14 h 32");
        assert_eq!(
            french_sentence(&when),
            "Nous sommes mardi 4 août 2026, et il est 14 h 32."
        );
    }

    #[test]
    fn pads_minutes_to_two_digits() {
        let when = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();

        assert_eq!(french_date_time(&when), "jeudi 1 janvier 2026 à 9 h 05");
    }
}
