/// Render value used when a caller number cannot be normalized.
pub const UNKNOWN_NUMBER: &str = "inconnu";

const DIGIT_WORDS: [&str; 10] = [
    "zéro", "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf",
];

/// Pause marker inserted between dictation groups so the voice pipeline
/// breathes between area code, exchange and subscriber number.
const GROUP_PAUSE: &str = "... ";

/// A caller's phone number in the three forms the agent needs: raw digits,
/// a display rendering, and a digit-by-digit spoken rendering.
///
/// `formatted` and `spoken` are only ever a real number when the source
/// normalizes to exactly 10 digits; everything else degrades to the
/// [`UNKNOWN_NUMBER`] sentinel. Unparseable input never produces an error.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    /// Exactly 10 digits when the number is known.
    pub digits: Option<String>,
    /// `(AAA) EEE-SSSS`, or the unknown sentinel.
    pub formatted: String,
    /// French digit words grouped 3-3-4, or the unknown sentinel.
    pub spoken: String,
}

impl CallerIdentity {
    pub fn unknown() -> Self {
        Self {
            digits: None,
            formatted: UNKNOWN_NUMBER.to_string(),
            spoken: UNKNOWN_NUMBER.to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.digits.is_some()
    }

    /// Derive the caller identity once at call start, from the SIP
    /// participant identity when one is present, else from the room name.
    pub fn from_call(participant_identity: Option<&str>, room: &str) -> Self {
        let source = participant_identity
            .map(extract_uri_user)
            .or_else(|| number_from_room(room));

        match source {
            Some(source) => Self::from_source(&source),
            None => Self::unknown(),
        }
    }

    fn from_source(source: &str) -> Self {
        let digits = match normalize_digits(source) {
            Some(digits) => digits,
            None => return Self::unknown(),
        };
        Self {
            formatted: format_ten_digits(&digits),
            spoken: spoken_ten_digits(&digits),
            digits: Some(digits),
        }
    }

    /// E.164 form usable as an SMS destination.
    pub fn e164(&self) -> Option<String> {
        self.digits.as_ref().map(|d| format!("+1{}", d))
    }
}

/// `user:pass@host` shapes keep the user portion: everything before `@`,
/// and after the first `:` when one is present.
fn extract_uri_user(identity: &str) -> String {
    let user = identity.split('@').next().unwrap_or(identity);
    match user.rsplit_once(':') {
        Some((_, rest)) => rest.to_string(),
        None => user.to_string(),
    }
}

/// Fallback extraction from `<prefix>_<+E164>_<random>` room names: the
/// second underscore segment, when it is a `+` followed by digits only.
fn number_from_room(room: &str) -> Option<String> {
    let mut parts = room.split('_');
    let _ = parts.next()?;
    let candidate = parts.next()?;
    let rest = candidate.strip_prefix('+')?;
    if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Strip non-digits, drop the leading country-code `1` from 11-digit
/// numbers, and accept only an exact 10-digit result.
pub fn normalize_digits(source: &str) -> Option<String> {
    let mut digits: String = source.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }
    if digits.len() == 10 { Some(digits) } else { None }
}

fn format_ten_digits(digits: &str) -> String {
    format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
}

fn spoken_ten_digits(digits: &str) -> String {
    [&digits[0..3], &digits[3..6], &digits[6..10]]
        .iter()
        .map(|group| spoken_group(group))
        .collect::<Vec<_>>()
        .join(GROUP_PAUSE)
}

fn spoken_group(group: &str) -> String {
    group
        .chars()
        .map(|c| DIGIT_WORDS[(c as u8 - b'0') as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best-effort rendering for a caller-supplied callback number: formatted
/// when it normalizes to 10 digits, otherwise passed through trimmed.
pub fn format_callback(number: &str) -> String {
    match normalize_digits(number) {
        Some(digits) => format_ten_digits(&digits),
        None => number.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_number_formats_and_speaks() {
        let identity = CallerIdentity::from_call(Some("+15149474976"), "telnek-abc");
        assert_eq!(identity.digits.as_deref(), Some("5149474976"));
        assert_eq!(identity.formatted, "(514) 947-4976");
        assert_eq!(
            identity.spoken,
            "cinq un quatre... neuf quatre sept... quatre neuf sept six"
        );
    }

    #[test]
    fn leading_country_code_is_dropped() {
        let with_code = CallerIdentity::from_call(Some("15149474976"), "r");
        let without_code = CallerIdentity::from_call(Some("5149474976"), "r");
        assert_eq!(with_code, without_code);
        assert_eq!(with_code.formatted, "(514) 947-4976");
    }

    #[test]
    fn sip_identity_user_portion_is_extracted() {
        let identity = CallerIdentity::from_call(Some("sip_+15551234567@carrier.example"), "r");
        assert_eq!(identity.digits.as_deref(), Some("5551234567"));
        assert_eq!(identity.formatted, "(555) 123-4567");
    }

    #[test]
    fn uri_user_pass_shape_takes_portion_after_colon() {
        let identity = CallerIdentity::from_call(Some("sip:+15149474976@pstn.example"), "r");
        assert_eq!(identity.formatted, "(514) 947-4976");
    }

    #[test]
    fn room_name_fallback_extracts_embedded_number() {
        let identity = CallerIdentity::from_call(None, "call_+15149474976_a8f2");
        assert_eq!(identity.formatted, "(514) 947-4976");
        assert_eq!(identity.e164().as_deref(), Some("+15149474976"));
    }

    #[test]
    fn room_name_without_embedded_number_is_unknown() {
        for room in ["telnek-abc123", "call_notanumber_x", "call_+15x49474976_a", ""] {
            let identity = CallerIdentity::from_call(None, room);
            assert!(!identity.is_known());
            assert_eq!(identity.formatted, UNKNOWN_NUMBER);
            assert_eq!(identity.spoken, UNKNOWN_NUMBER);
        }
    }

    #[test]
    fn short_and_long_numbers_degrade_to_sentinel() {
        for source in ["514947", "514947497612", "25149474976", ""] {
            let identity = CallerIdentity::from_call(Some(source), "r");
            assert_eq!(identity.formatted, UNKNOWN_NUMBER);
            assert_eq!(identity.spoken, UNKNOWN_NUMBER);
            assert!(identity.digits.is_none());
        }
    }

    #[test]
    fn callback_formatting_degrades_to_passthrough() {
        assert_eq!(format_callback("514-947-4976"), "(514) 947-4976");
        assert_eq!(format_callback("1 514 947 4976"), "(514) 947-4976");
        assert_eq!(format_callback(" poste 42 "), "poste 42");
    }
}
