//! Verdict lines look like `Тренд% ЛОНГ`, `Разворот% 64250.5`, `Позиция% ДА`.
//! Spaces are ignored and a trailing `%` is tolerated.

use serde::{Deserialize, Serialize};

const TREND_TOKEN: &str = "Тренд%";
const TURN_TOKEN: &str = "Разворот%";
const POSITION_TOKEN: &str = "Позиция%";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Long,
    Short,
    Sideways,
}

impl PositionSide {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ЛОНГ" => Some(PositionSide::Long),
            "ШОРТ" => Some(PositionSide::Short),
            "БОКОВОЙ" => Some(PositionSide::Sideways),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionPermission {
    Yes,
    No,
    Doubtful,
}

impl PositionPermission {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ДА" => Some(PositionPermission::Yes),
            "НЕТ" => Some(PositionPermission::No),
            "СОМНИТЕЛЬНО" => Some(PositionPermission::Doubtful),
            _ => None,
        }
    }
}

/// Parsed verdict. Fields the text did not mention (or mentioned with an unknown value) are `None`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TradeResult {
    pub side: Option<PositionSide>,
    pub can_open_position: Option<PositionPermission>,
    pub turn_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnparseableResult {
    /// None of the three verdict lines was recognised
    NoRecognisedFields,
    /// The reversal line was present but its value is not a number
    MalformedTurnValue(String),
}

impl std::fmt::Display for UnparseableResult {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UnparseableResult::NoRecognisedFields => write!(
                f,
                "no {}, {} or {} line with a recognised value",
                TREND_TOKEN, TURN_TOKEN, POSITION_TOKEN
            ),
            UnparseableResult::MalformedTurnValue(raw) => {
                write!(f, "{} value {:?} is not a number", TURN_TOKEN, raw)
            }
        }
    }
}

impl std::error::Error for UnparseableResult {}

fn value_after<'a>(line: &'a str, token: &str) -> &'a str {
    let rest = match line.find(token) {
        Some(pos) => &line[pos + token.len()..],
        None => line,
    };
    rest.trim_end_matches('%')
}

/// Extract the verdict from free text. The first matching token on a line wins; later lines
/// overwrite earlier ones.
pub fn parse_trade_result(text: &str) -> Result<TradeResult, UnparseableResult> {
    let mut side = None;
    let mut can_open_position = None;
    let mut turn_raw: Option<String> = None;

    for line in text.lines() {
        let line: String = line.chars().filter(|c| *c != ' ').collect();
        if line.contains(TREND_TOKEN) {
            if let Some(parsed) = PositionSide::from_token(value_after(&line, TREND_TOKEN)) {
                side = Some(parsed);
            }
        } else if line.contains(TURN_TOKEN) {
            let value = value_after(&line, TURN_TOKEN);
            turn_raw = (!value.is_empty()).then(|| value.to_string());
        } else if line.contains(POSITION_TOKEN) {
            if let Some(parsed) = PositionPermission::from_token(value_after(&line, POSITION_TOKEN))
            {
                can_open_position = Some(parsed);
            }
        }
    }

    let turn_value = match turn_raw {
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => return Err(UnparseableResult::MalformedTurnValue(raw)),
        },
        None => None,
    };

    if side.is_none() && can_open_position.is_none() && turn_value.is_none() {
        return Err(UnparseableResult::NoRecognisedFields);
    }

    Ok(TradeResult {
        side,
        can_open_position,
        turn_value,
    })
}
